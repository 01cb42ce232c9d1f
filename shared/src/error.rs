use serde::{Serialize, Deserialize};
use std::fmt;

/// Stable, machine-checkable reason carried in every error body.
#[derive(Debug, Clone, Copy, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    #[error("Poll not found")]
    PollNotFound,
    #[error("Invalid option")]
    InvalidOption,
    #[error("You have already voted on this poll")]
    DuplicateVote,
    #[error("Invalid ID format")]
    InvalidId,
    #[error("Validation failed")]
    ValidationFailed,
    #[error("Not authorized")]
    Unauthorized,
    #[error("Resource not found")]
    NotFound,
    #[error("Internal server error")]
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: ErrorCode,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = serde_json::to_value(self.error)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        write!(f, "{}: {}", reason, self.message)
    }
}

impl std::error::Error for ErrorResponse {}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: code,
            message: message.into(),
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.to_string())
    }
}

impl From<ErrorCode> for ErrorResponse {
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code)
    }
}
