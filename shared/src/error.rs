//! Error types for the Bench Tracker Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while proxying a request to Notion.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more required environment variables are not set
    #[error("Missing environment variables: {}", missing.join(", "))]
    Config { missing: Vec<String> },

    /// Request payload failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// No operation is registered for the requested action
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// HTTP method is not handled by this endpoint
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Notion answered with an error body
    #[error("Notion API error ({status} {code}): {message}")]
    Upstream {
        status: u16,
        code: String,
        message: String,
    },

    /// Transport failure talking to Notion
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::UnknownAction(_) => 400,
            Error::MethodNotAllowed(_) => 405,
            _ => 500,
        }
    }

    /// Upstream error code, passed through to the caller.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Upstream { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
