use std::time::Duration;

use thiserror::Error;

/// Classified failure reason for an upstream call.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse failure taxonomy used when deciding how a failure degrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Unreachable host, timeout or non-success status
    Transport,
    /// The body arrived but could not be decoded
    Payload,
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FeedError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            404 => FeedError::NotFound(truncated),
            429 => FeedError::RateLimited,
            500..=599 => FeedError::ServerError(truncated),
            _ => FeedError::UnexpectedStatus(format!("{}: {}", status, truncated)),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FeedError::Network(e) if e.is_decode() => FailureKind::Payload,
            FeedError::InvalidResponse(_) => FailureKind::Payload,
            _ => FailureKind::Transport,
        }
    }
}
