//! Operations behind each proxy action.
//!
//! Each operation validates its input, talks to Notion through
//! [`shared::NotionApi`] and returns the envelope to send back.

pub mod listing;
pub mod milestones;
pub mod parts;
pub mod projects;
pub mod schema;
pub mod todos;
pub mod workflows;

use serde::Serialize;
use serde_json::Value;
use shared::{ApiResponse, Result};

/// Successful answer of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Result<Self> {
        Self::with_status(200, message, data)
    }

    pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Result<Self> {
        Self::with_status(201, message, data)
    }

    fn with_status<T: Serialize>(status: u16, message: impl Into<String>, data: T) -> Result<Self> {
        Ok(Self {
            status,
            body: serde_json::to_value(ApiResponse::success(message, data))?,
        })
    }

    /// The `data` member of the envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}
