//! Shared library for the Bench Tracker Lambda functions.
//!
//! This crate provides configuration, error handling, HTTP helpers and the
//! Notion client used by every handler.

pub mod config;
pub mod error;
pub mod http;
pub mod notion;
pub mod patch;
pub mod secrets;

pub use config::{Config, Setting};
pub use error::{Error, Result};
pub use http::ApiResponse;
pub use notion::{NotionApi, NotionClient, Page, PropertyMap, PropertyReader, PropertyWriter};
pub use patch::Patch;
pub use secrets::{get_secret, parse_notion_token, resolve_notion_token};
