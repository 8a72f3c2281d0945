//! Notion API access.
//!
//! [`NotionApi`] is the seam every operation talks through. [`NotionClient`]
//! implements it over HTTPS; tests substitute an in-memory implementation.

mod client;
mod properties;

pub use client::NotionClient;
pub use properties::{PropertyMap, PropertyReader, PropertyWriter, RICH_TEXT_SEGMENT_LIMIT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Largest page size the query endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A database row as returned by Notion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    pub fn props(&self) -> PropertyReader<'_> {
        PropertyReader::new(&self.properties)
    }
}

/// One page of a database query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Body of a database query request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatabaseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Operations this proxy performs against Notion.
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Query one page of a database.
    async fn query_database(&self, database_id: &str, query: &DatabaseQuery) -> Result<QueryPage>;

    /// Retrieve a database object, including its property schema.
    async fn retrieve_database(&self, database_id: &str) -> Result<Value>;

    /// Create a page in a database.
    async fn create_page(&self, database_id: &str, properties: PropertyMap) -> Result<Page>;

    /// Update properties of an existing page.
    async fn update_page(&self, page_id: &str, properties: PropertyMap) -> Result<Page>;

    /// Archive (soft-delete) a page.
    async fn archive_page(&self, page_id: &str) -> Result<Page>;
}

/// Query a database to exhaustion, following cursors until Notion reports no more pages.
///
/// Any failing page aborts the whole query, as does a page claiming more
/// results without a cursor.
pub async fn query_all<A>(
    api: &A,
    database_id: &str,
    filter: Option<Value>,
    sorts: Vec<Value>,
) -> Result<Vec<Page>>
where
    A: NotionApi + ?Sized,
{
    let mut query = DatabaseQuery {
        filter,
        sorts,
        start_cursor: None,
        page_size: Some(MAX_PAGE_SIZE),
    };
    let mut pages = Vec::new();

    loop {
        let batch = api.query_database(database_id, &query).await?;
        pages.extend(batch.results);

        match (batch.has_more, batch.next_cursor) {
            (true, Some(cursor)) => query.start_cursor = Some(cursor),
            (true, None) => {
                return Err(Error::Upstream {
                    status: 502,
                    code: "missing_cursor".to_string(),
                    message: format!("query of {} reported more results without a cursor", database_id),
                })
            }
            (false, _) => break,
        }
    }

    Ok(pages)
}

/// Canonical form of a Notion id, so hyphenated and simple ids compare equal.
pub fn normalize_id(id: &str) -> String {
    id.chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
