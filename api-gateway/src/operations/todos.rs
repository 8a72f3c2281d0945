//! Inbox notes exposed as a todo list.

use serde_json::json;
use shared::notion::query_all;
use shared::{Config, NotionApi, Result, Setting};
use tracing::info;

use super::Reply;
use crate::models::fields::parse_page_id;
use crate::models::todo::props;
use crate::models::{Todo, TodoFields};

/// `includeDone` is on unless explicitly turned off.
pub fn include_done(param: Option<&str>) -> bool {
    !matches!(
        param.map(|p| p.trim().to_ascii_lowercase()).as_deref(),
        Some("false" | "0" | "no")
    )
}

/// All inbox notes, newest first.
pub async fn list_todos<A>(api: &A, config: &Config, include_done: bool) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let database_id = config.database(Setting::Inbox)?;
    let filter = (!include_done).then(|| json!({ "property": props::DONE, "checkbox": { "equals": false } }));
    let sorts = vec![json!({ "timestamp": "created_time", "direction": "descending" })];

    let pages = query_all(api, database_id, filter, sorts).await?;
    let todos: Vec<Todo> = pages.iter().map(Todo::from_page).collect();

    Reply::ok(format!("Loaded {} todos", todos.len()), todos)
}

pub async fn create_todo<A>(api: &A, config: &Config, input: TodoFields) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let properties = input.to_new_properties()?;
    let database_id = config.database(Setting::Inbox)?;

    let page = api.create_page(database_id, properties).await?;
    info!(todo_id = %page.id, "Created inbox note");

    Reply::created("Note added", Todo::from_page(&page))
}

pub async fn update_todo<A>(api: &A, input: TodoFields) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let page_id = parse_page_id(input.id.as_deref(), "id")?;
    let properties = input.to_update_properties()?;

    let page = api.update_page(&page_id, properties).await?;
    info!(todo_id = %page_id, "Updated inbox note");

    Reply::ok("Note updated", Todo::from_page(&page))
}
