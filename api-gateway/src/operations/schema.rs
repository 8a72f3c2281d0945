//! Debug view of a database's property schema.

use serde::Serialize;
use serde_json::{Map, Value};
use shared::{Config, Error, NotionApi, Result, Setting};

use super::Reply;

#[derive(Debug, Serialize)]
pub struct DatabaseSchema {
    pub id: String,
    pub title: String,
    /// Property name to Notion property type.
    pub properties: Map<String, Value>,
}

/// Setting named by the `database` query parameter.
pub fn database_setting(param: Option<&str>) -> Result<Setting> {
    match param.map(str::trim).unwrap_or("projects") {
        "" | "projects" => Ok(Setting::Projects),
        "milestones" => Ok(Setting::Milestones),
        "parts" => Ok(Setting::Parts),
        "workflows" => Ok(Setting::Workflows),
        "todos" | "inbox" => Ok(Setting::Inbox),
        other => Err(Error::validation(format!("Unknown database: {}", other))),
    }
}

fn describe(database: &Value) -> DatabaseSchema {
    let title = database["title"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["plain_text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default();
    let properties = database["properties"]
        .as_object()
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| (name.clone(), prop["type"].clone()))
                .collect()
        })
        .unwrap_or_default();

    DatabaseSchema {
        id: database["id"].as_str().unwrap_or_default().to_string(),
        title,
        properties,
    }
}

pub async fn describe_database<A>(api: &A, config: &Config, setting: Setting) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let database_id = config.database(setting)?;
    let database = api.retrieve_database(database_id).await?;
    let schema = describe(&database);

    Reply::ok(format!("Schema of {}", setting.env_var()), schema)
}
