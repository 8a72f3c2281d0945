//! HTTPS client for the Notion REST API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::{DatabaseQuery, NotionApi, Page, PropertyMap, QueryPage};
use crate::{Config, Error, Result};

/// Error object Notion returns on non-2xx responses.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Notion API client authenticated with an integration token.
pub struct NotionClient {
    http_client: Client,
    base_url: String,
    token: String,
    version: String,
}

impl NotionClient {
    pub fn new(
        http_client: Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            version: version.into(),
        }
    }

    /// Build a client from configuration.
    ///
    /// A missing token yields a client with an empty credential; callers
    /// check [`Config::require`] before issuing requests.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Client::new(),
            &config.notion_api_base,
            config.notion_token.clone().unwrap_or_default(),
            &config.notion_version,
        )
    }

    fn url(&self, collection: &str, id: &str, suffix: Option<&str>) -> String {
        let mut url = format!("{}/{}/{}", self.base_url, collection, urlencoding::encode(id));
        if let Some(suffix) = suffix {
            url.push('/');
            url.push_str(suffix);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = upstream_error(status.as_u16(), &text);
            warn!(status = status.as_u16(), error = %err, "Notion request failed");
            return Err(err);
        }

        Ok(response.json::<T>().await?)
    }
}

/// Translate a failed Notion response into an [`Error::Upstream`].
fn upstream_error(status: u16, body: &str) -> Error {
    let parsed: Option<UpstreamErrorBody> = serde_json::from_str(body).ok();
    let (code, message) = match parsed {
        Some(body) => (body.code, body.message),
        None => (None, None),
    };

    Error::Upstream {
        status,
        code: code.unwrap_or_else(|| "http_error".to_string()),
        message: message.unwrap_or_else(|| {
            if body.is_empty() {
                format!("HTTP {}", status)
            } else {
                body.to_string()
            }
        }),
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn query_database(&self, database_id: &str, query: &DatabaseQuery) -> Result<QueryPage> {
        let url = self.url("databases", database_id, Some("query"));
        self.send(self.http_client.post(url).json(query)).await
    }

    async fn retrieve_database(&self, database_id: &str) -> Result<Value> {
        let url = self.url("databases", database_id, None);
        self.send(self.http_client.get(url)).await
    }

    async fn create_page(&self, database_id: &str, properties: PropertyMap) -> Result<Page> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        let url = format!("{}/pages", self.base_url);
        self.send(self.http_client.post(url).json(&body)).await
    }

    async fn update_page(&self, page_id: &str, properties: PropertyMap) -> Result<Page> {
        let url = self.url("pages", page_id, None);
        let body = json!({ "properties": properties });
        self.send(self.http_client.patch(url).json(&body)).await
    }

    async fn archive_page(&self, page_id: &str) -> Result<Page> {
        let url = self.url("pages", page_id, None);
        let body = json!({ "archived": true });
        self.send(self.http_client.patch(url).json(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> NotionClient {
        NotionClient::new(Client::new(), "https://api.notion.com/v1/", "ntn_test", "2022-06-28")
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(
            client.url("databases", "abc123", Some("query")),
            "https://api.notion.com/v1/databases/abc123/query"
        );
        assert_eq!(
            client.url("pages", "a/b", None),
            "https://api.notion.com/v1/pages/a%2Fb"
        );
    }

    #[test]
    fn test_upstream_error_from_notion_body() {
        let body = r#"{"object":"error","status":400,"code":"validation_error","message":"Due is expected to be date."}"#;
        match upstream_error(400, body) {
            Error::Upstream { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code, "validation_error");
                assert_eq!(message, "Due is expected to be date.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upstream_error_from_opaque_body() {
        match upstream_error(502, "Bad Gateway") {
            Error::Upstream { code, message, .. } => {
                assert_eq!(code, "http_error");
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_config_uses_configured_base() {
        let config = Config {
            notion_token: Some("ntn_x".into()),
            notion_api_base: "http://localhost:9999/v1".into(),
            notion_version: "2022-06-28".into(),
            ..Config::default()
        };
        let client = NotionClient::from_config(&config);
        assert_eq!(
            client.url("pages", "p1", None),
            "http://localhost:9999/v1/pages/p1"
        );
    }
}
