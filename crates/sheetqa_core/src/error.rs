use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape used across the pipeline and exposed over
/// the request boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

/// JSON body returned for failed requests: `{ error, detail? }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// HTTP status for the request boundary. Missing input is the caller's
    /// fault; upstream-call failures map to 502; anything else is 500.
    pub fn http_status(&self) -> u16 {
        if self.code == "QA_MISSING_QUESTION" {
            return 400;
        }
        if self.code.ends_with("_FAILED") || self.code.ends_with("_UNREACHABLE") {
            return 502;
        }
        500
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.message.clone(),
            detail: self.details.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
