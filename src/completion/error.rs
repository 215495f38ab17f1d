//! Completion error type

use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt::Display;
use thiserror::Error;

/// Failure of the external completion call. Network, status and parse
/// failures all land here; callers only ever read the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompletionError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new("unauthenticated: no API key configured (set groq_api_key or GROQ_API_KEY)")
    }

    pub fn network(err: impl Display) -> Self {
        Self::new(format!("request failed: {err}"))
    }

    /// Prefers the `error.message` field of an OpenAI-style error body and
    /// falls back to the raw body text.
    pub fn api(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<ApiErrorBody>(body)
            .map(|parsed| parsed.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        if detail.is_empty() {
            Self::new(format!("API error ({status})"))
        } else {
            Self::new(format!("API error ({status}): {detail}"))
        }
    }

    pub fn malformed(err: impl Display) -> Self {
        Self::new(format!("malformed response: {err}"))
    }
}
