use crate::completion::ChatModel;
use crate::session::{Role, Turn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestMessage {
    pub role: Role,
    pub content: String,
}

impl RequestMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Turn> for RequestMessage {
    fn from(turn: &Turn) -> Self {
        Self::new(turn.role(), turn.content())
    }
}

/// Payload for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: ChatModel,
    pub messages: Vec<RequestMessage>,
}

/// System prompt first, then the whole transcript in order, then the new
/// user message. Nothing is truncated: every turn resends the full history.
pub fn build_request(
    model: ChatModel,
    system_prompt: &str,
    transcript: &[Turn],
    user_message: &str,
) -> CompletionRequest {
    let mut messages = Vec::with_capacity(transcript.len() + 2);
    messages.push(RequestMessage::new(Role::System, system_prompt));
    messages.extend(transcript.iter().map(RequestMessage::from));
    messages.push(RequestMessage::new(Role::User, user_message));

    CompletionRequest { model, messages }
}
