//! HTTP integration error type and formatting helpers.

use crate::domain::ErrorKind;
use std::error::Error as StdError;
use thiserror::Error;

/// Result type for outbound HTTP calls.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by the review and contact clients.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Maps the error onto the submission failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::Config(_) => ErrorKind::NetworkError,
            Self::Status { .. } | Self::Decode(_) => ErrorKind::UnexpectedResponse,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(format_error_chain(&error))
        } else {
            Self::Transport(format_error_chain(&error))
        }
    }
}

/// Joins an error and its sources into one line, skipping repeated messages.
pub fn format_error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut current = Some(error);
    let mut parts = Vec::new();

    while let Some(err) = current {
        let text = err.to_string();
        if !text.is_empty() && parts.last() != Some(&text) {
            parts.push(text);
        }
        current = err.source();
    }

    if parts.is_empty() {
        "unknown error".to_owned()
    } else {
        parts.join(": ")
    }
}

/// Shortens a response body for logs and error messages.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_owned();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
