//! Hosted chat-completion API
//!
//! The controller only sees [`CompletionService`]; the Groq client is one
//! implementation of it.

mod error;
mod groq;
mod request;

pub use error::CompletionError;
pub use groq::{GroqClient, DEFAULT_BASE_URL};
pub use request::{build_request, CompletionRequest, RequestMessage};

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// The closed set of models offered in the model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatModel {
    #[default]
    Llama3_8b,
    Llama3_70b,
    MistralSaba24b,
    Gemma2_9b,
}

impl ChatModel {
    pub const ALL: [ChatModel; 4] = [
        ChatModel::Llama3_8b,
        ChatModel::Llama3_70b,
        ChatModel::MistralSaba24b,
        ChatModel::Gemma2_9b,
    ];

    /// Identifier sent in the `model` field of the request.
    pub fn api_name(self) -> &'static str {
        match self {
            ChatModel::Llama3_8b => "Llama3-8b-8192",
            ChatModel::Llama3_70b => "Llama3-70b-8192",
            ChatModel::MistralSaba24b => "mistral-saba-24b",
            ChatModel::Gemma2_9b => "gemma2-9b-it",
        }
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

impl FromStr for ChatModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.api_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|m| m.api_name()).collect();
                format!("unknown model '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Maps an ordered message list to the text of the first reply.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Logging wrapper for completion services
pub struct LoggingService {
    inner: Arc<dyn CompletionService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn CompletionService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CompletionService for LoggingService {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let start = Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(text) => {
                tracing::info!(
                    model = %request.model,
                    messages = request.messages.len(),
                    duration_ms = %duration.as_millis(),
                    response_chars = text.chars().count(),
                    "completion request finished"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %request.model,
                    messages = request.messages.len(),
                    duration_ms = %duration.as_millis(),
                    error = %e,
                    "completion request failed"
                );
            }
        }

        result
    }
}
