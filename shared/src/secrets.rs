//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::{Config, Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Notion credentials stored as a JSON secret.
#[derive(Debug, Deserialize)]
pub struct NotionCredentials {
    #[serde(alias = "NOTION_TOKEN", alias = "notion_token")]
    pub token: String,
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Extract the integration token from a secret string.
///
/// Accepts either a JSON object with a `token` key or the bare token.
pub fn parse_notion_token(secret_string: &str) -> Result<String> {
    let trimmed = secret_string.trim();
    if trimmed.starts_with('{') {
        let creds: NotionCredentials = serde_json::from_str(trimmed)
            .map_err(|e| Error::Aws(format!("Failed to parse Notion credentials: {}", e)))?;
        return Ok(creds.token);
    }
    if trimmed.is_empty() {
        return Err(Error::Aws("Notion token secret is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Fill in the integration token from Secrets Manager when only an ARN is configured.
pub async fn resolve_notion_token(config: &mut Config) -> Result<()> {
    if config.notion_token.is_some() {
        return Ok(());
    }
    let Some(secret_arn) = config.notion_token_secret_arn.clone() else {
        return Ok(());
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = SecretsClient::new(&aws_config);
    let secret_string = get_secret(&client, &secret_arn).await?;
    config.notion_token = Some(parse_notion_token(&secret_string)?);
    Ok(())
}
