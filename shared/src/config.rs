//! Configuration management for Lambda functions.

use std::env;

use crate::{Error, Result};

const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_NOTION_API_BASE: &str = "https://api.notion.com/v1";
const DEFAULT_PROJECT_STATUS: &str = "On The Bench";

/// A configuration value an operation may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Token,
    Projects,
    Milestones,
    Parts,
    Workflows,
    Inbox,
}

impl Setting {
    /// Environment variable backing this setting.
    pub fn env_var(self) -> &'static str {
        match self {
            Setting::Token => "NOTION_TOKEN",
            Setting::Projects => "NOTION_DATABASE_ID",
            Setting::Milestones => "NOTION_MILESTONES_DATABASE_ID",
            Setting::Parts => "NOTION_PARTS_DATABASE_ID",
            Setting::Workflows => "NOTION_WORKFLOWS_DATABASE_ID",
            Setting::Inbox => "NOTION_INBOX_DATABASE_ID",
        }
    }
}

/// Application configuration loaded from environment variables.
///
/// Nothing here is mandatory at cold start. Each operation declares the
/// settings it needs and [`Config::require`] reports the gaps.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Notion integration token
    pub notion_token: Option<String>,
    /// ARN of a secret holding the integration token
    pub notion_token_secret_arn: Option<String>,
    /// Value of the `Notion-Version` header
    pub notion_version: String,
    /// Base URL of the Notion REST API
    pub notion_api_base: String,
    /// Projects (work orders) database
    pub projects_database_id: Option<String>,
    /// Milestones database
    pub milestones_database_id: Option<String>,
    /// Parts database
    pub parts_database_id: Option<String>,
    /// Workflow templates database
    pub workflows_database_id: Option<String>,
    /// Inbox notes database
    pub inbox_database_id: Option<String>,
    /// Status used by the listing when the caller gives none
    pub default_project_status: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            notion_token: var(Setting::Token.env_var()),
            notion_token_secret_arn: var("NOTION_TOKEN_SECRET_ARN"),
            notion_version: var("NOTION_VERSION")
                .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
            notion_api_base: var("NOTION_API_BASE")
                .unwrap_or_else(|| DEFAULT_NOTION_API_BASE.to_string()),
            projects_database_id: var(Setting::Projects.env_var()),
            milestones_database_id: var(Setting::Milestones.env_var()),
            parts_database_id: var(Setting::Parts.env_var()),
            workflows_database_id: var(Setting::Workflows.env_var()),
            inbox_database_id: var(Setting::Inbox.env_var()),
            default_project_status: var("DEFAULT_PROJECT_STATUS")
                .unwrap_or_else(|| DEFAULT_PROJECT_STATUS.to_string()),
        }
    }

    fn value(&self, setting: Setting) -> Option<&str> {
        match setting {
            Setting::Token => self.notion_token.as_deref(),
            Setting::Projects => self.projects_database_id.as_deref(),
            Setting::Milestones => self.milestones_database_id.as_deref(),
            Setting::Parts => self.parts_database_id.as_deref(),
            Setting::Workflows => self.workflows_database_id.as_deref(),
            Setting::Inbox => self.inbox_database_id.as_deref(),
        }
    }

    /// Check that every listed setting is present, naming all that are not.
    pub fn require(&self, settings: &[Setting]) -> Result<()> {
        let missing: Vec<String> = settings
            .iter()
            .filter(|s| self.value(**s).is_none())
            .map(|s| s.env_var().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config { missing })
        }
    }

    /// Database id for a setting, or a configuration error.
    pub fn database(&self, setting: Setting) -> Result<&str> {
        self.value(setting).ok_or_else(|| Error::Config {
            missing: vec![setting.env_var().to_string()],
        })
    }

    /// Database id for a setting that may legitimately be absent.
    pub fn optional_database(&self, setting: Setting) -> Option<&str> {
        self.value(setting)
    }
}
