//! In-memory Notion used by the operation and dispatch tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use shared::notion::{normalize_id, DatabaseQuery, QueryPage};
use shared::{Config, Error, NotionApi, Page, PropertyMap, PropertyWriter, Result};

/// A request the fake received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query {
        database: String,
        cursor: Option<String>,
    },
    Retrieve {
        database: String,
    },
    Create {
        database: String,
        properties: PropertyMap,
    },
    Update {
        page: String,
        properties: PropertyMap,
    },
    Archive {
        page: String,
    },
}

#[derive(Default)]
struct State {
    pages: Vec<(String, Page)>,
    schemas: HashMap<String, Value>,
    calls: Vec<Call>,
    failing_queries: HashSet<String>,
    failing_writes: bool,
    next_id: u32,
}

pub struct FakeNotion {
    page_size: usize,
    state: Mutex<State>,
}

const CREATED_TIME: &str = "2024-06-14T12:00:00.000Z";

fn injected_failure() -> Error {
    Error::Upstream {
        status: 500,
        code: "internal_server_error".to_string(),
        message: "injected failure".to_string(),
    }
}

fn not_found(id: &str) -> Error {
    Error::Upstream {
        status: 404,
        code: "object_not_found".to_string(),
        message: format!("Could not find {}", id),
    }
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::with_page_size(100)
    }

    /// Serve query results in pages of `page_size`, with the next index as cursor.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            state: Mutex::new(State {
                next_id: 9000,
                ..State::default()
            }),
        }
    }

    pub fn seed(&self, database: &str, page: Page) {
        self.state.lock().unwrap().pages.push((database.to_string(), page));
    }

    pub fn seed_schema(&self, database: &str, schema: Value) {
        self.state
            .lock()
            .unwrap()
            .schemas
            .insert(database.to_string(), schema);
    }

    pub fn fail_queries_on(&self, database: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_queries
            .insert(database.to_string());
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().failing_writes = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }
}

fn matches_filter(filter: &Value, page: &Page) -> bool {
    if let Some(any) = filter.get("or").and_then(Value::as_array) {
        return any.iter().any(|f| matches_filter(f, page));
    }
    if let Some(all) = filter.get("and").and_then(Value::as_array) {
        return all.iter().all(|f| matches_filter(f, page));
    }

    let property = filter["property"].as_str().unwrap_or_default();
    let props = page.props();
    if let Some(expected) = filter.pointer("/status/equals").and_then(Value::as_str) {
        return props.status(property).as_deref() == Some(expected);
    }
    if let Some(id) = filter.pointer("/relation/contains").and_then(Value::as_str) {
        let id = normalize_id(id);
        return props
            .relation_ids(property)
            .iter()
            .any(|related| normalize_id(related) == id);
    }
    if let Some(expected) = filter.pointer("/checkbox/equals").and_then(Value::as_bool) {
        return props.checkbox(property).unwrap_or(false) == expected;
    }
    true
}

fn sort_pages(pages: &mut [Page], sort: &Value) {
    let descending = sort["direction"] == "descending";
    if sort["timestamp"] == "created_time" {
        pages.sort_by(|a, b| a.created_time.cmp(&b.created_time));
    } else if let Some(property) = sort["property"].as_str() {
        pages.sort_by_key(|p| p.props().title(property));
    }
    if descending {
        pages.reverse();
    }
}

#[async_trait]
impl NotionApi for FakeNotion {
    async fn query_database(&self, database_id: &str, query: &DatabaseQuery) -> Result<QueryPage> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Query {
            database: database_id.to_string(),
            cursor: query.start_cursor.clone(),
        });
        if state.failing_queries.contains(database_id) {
            return Err(injected_failure());
        }

        let mut pages: Vec<Page> = state
            .pages
            .iter()
            .filter(|(db, page)| db == database_id && !page.archived)
            .map(|(_, page)| page.clone())
            .filter(|page| query.filter.as_ref().map_or(true, |f| matches_filter(f, page)))
            .collect();
        if let Some(sort) = query.sorts.first() {
            sort_pages(&mut pages, sort);
        }

        let size = query
            .page_size
            .map_or(self.page_size, |n| (n as usize).min(self.page_size));
        let start: usize = query
            .start_cursor
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);
        let end = (start + size).min(pages.len());
        let has_more = end < pages.len();

        Ok(QueryPage {
            results: pages[start.min(end)..end].to_vec(),
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }

    async fn retrieve_database(&self, database_id: &str) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Retrieve {
            database: database_id.to_string(),
        });
        state
            .schemas
            .get(database_id)
            .cloned()
            .ok_or_else(|| not_found(database_id))
    }

    async fn create_page(&self, database_id: &str, properties: PropertyMap) -> Result<Page> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            database: database_id.to_string(),
            properties: properties.clone(),
        });
        if state.failing_writes {
            return Err(injected_failure());
        }

        state.next_id += 1;
        let page = Page {
            id: page_id(state.next_id),
            created_time: Some(CREATED_TIME.to_string()),
            archived: false,
            properties,
        };
        state.pages.push((database_id.to_string(), page.clone()));
        Ok(page)
    }

    async fn update_page(&self, page_id: &str, properties: PropertyMap) -> Result<Page> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update {
            page: page_id.to_string(),
            properties: properties.clone(),
        });
        if state.failing_writes {
            return Err(injected_failure());
        }

        let key = normalize_id(page_id);
        let (_, page) = state
            .pages
            .iter_mut()
            .find(|(_, page)| normalize_id(&page.id) == key)
            .ok_or_else(|| not_found(page_id))?;
        page.properties.extend(properties);
        Ok(page.clone())
    }

    async fn archive_page(&self, page_id: &str) -> Result<Page> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Archive {
            page: page_id.to_string(),
        });
        if state.failing_writes {
            return Err(injected_failure());
        }

        let key = normalize_id(page_id);
        let (_, page) = state
            .pages
            .iter_mut()
            .find(|(_, page)| normalize_id(&page.id) == key)
            .ok_or_else(|| not_found(page_id))?;
        page.archived = true;
        Ok(page.clone())
    }
}

/// Deterministic page id for fixtures.
pub fn page_id(n: u32) -> String {
    format!("00000000-0000-4000-8000-{:012}", n)
}

/// Configuration with every database set.
pub fn config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "NOTION_TOKEN" => "secret_test",
            "NOTION_DATABASE_ID" => "projects-db",
            "NOTION_MILESTONES_DATABASE_ID" => "milestones-db",
            "NOTION_PARTS_DATABASE_ID" => "parts-db",
            "NOTION_WORKFLOWS_DATABASE_ID" => "workflows-db",
            "NOTION_INBOX_DATABASE_ID" => "inbox-db",
            _ => return None,
        };
        Some(value.to_string())
    })
}

fn fixture(n: u32, w: PropertyWriter) -> Page {
    Page {
        id: page_id(n),
        created_time: Some(CREATED_TIME.to_string()),
        archived: false,
        properties: w.build(),
    }
}

pub fn project_page(n: u32, name: &str, status: &str) -> Page {
    let mut w = PropertyWriter::new();
    w.title("Name", name).status("Status", status);
    fixture(n, w)
}

pub fn milestone_page(n: u32, project: u32, name: &str, order: u32) -> Page {
    let project_id = page_id(project);
    let mut w = PropertyWriter::new();
    w.title("Name", name)
        .relation("Project", &[project_id.as_str()])
        .number("Order", Some(f64::from(order)));
    fixture(n, w)
}

pub fn part_page(n: u32, project: u32, name: &str, order: u32) -> Page {
    milestone_page(n, project, name, order)
}

pub fn workflow_page(n: u32, name: &str, data: &str) -> Page {
    let mut w = PropertyWriter::new();
    w.title("Name", name).rich_text("Data", data);
    fixture(n, w)
}

pub fn todo_page(n: u32, text: &str, done: bool, created_time: &str) -> Page {
    let mut w = PropertyWriter::new();
    w.title("Name", text).checkbox("Done", done);
    Page {
        created_time: Some(created_time.to_string()),
        ..fixture(n, w)
    }
}
