use serde::{Deserialize, Serialize};

pub mod store;

pub use store::ConversationStore;

pub const WELCOME_MESSAGE: &str =
    "**Welcome!** 👋\nI am your AI assistant. How can I help you today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message unit of the conversation. Fields are private so a turn
/// cannot change after it is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn welcome() -> Self {
        Self::assistant(WELCOME_MESSAGE)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayEntry {
    pub query: String,
    pub response: String,
}

impl ReplayEntry {
    /// Sidebar button label; `index` is zero-based.
    pub fn label(&self, index: usize) -> String {
        format!("Q{}: {}", index + 1, self.query)
    }

    pub fn summary(&self) -> String {
        format!("**Q:** {}\n\n**A:** {}", self.query, self.response)
    }
}
