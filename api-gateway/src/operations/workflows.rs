//! Workflow templates.

use serde_json::json;
use shared::notion::query_all;
use shared::{Config, NotionApi, Result, Setting};
use tracing::info;

use super::Reply;
use crate::models::fields::parse_page_id;
use crate::models::{Workflow, WorkflowFields};

pub async fn list_workflows<A>(api: &A, config: &Config) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let database_id = config.database(Setting::Workflows)?;
    let sorts = vec![json!({ "property": "Name", "direction": "ascending" })];

    let pages = query_all(api, database_id, None, sorts).await?;
    let workflows: Vec<Workflow> = pages.iter().map(Workflow::from_page).collect();

    Reply::ok(format!("Loaded {} workflows", workflows.len()), workflows)
}

pub async fn create_workflow<A>(api: &A, config: &Config, input: WorkflowFields) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let properties = input.to_new_properties()?;
    let database_id = config.database(Setting::Workflows)?;

    let page = api.create_page(database_id, properties).await?;
    info!(workflow_id = %page.id, "Created workflow");

    Reply::created("Workflow created", Workflow::from_page(&page))
}

pub async fn update_workflow<A>(api: &A, input: WorkflowFields) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let page_id = parse_page_id(input.id.as_deref(), "id")?;
    let properties = input.to_update_properties()?;

    let page = api.update_page(&page_id, properties).await?;
    info!(workflow_id = %page_id, "Updated workflow");

    Reply::ok("Workflow updated", Workflow::from_page(&page))
}

/// Archive a workflow template. Notion keeps archived pages restorable.
pub async fn delete_workflow<A>(api: &A, id: Option<&str>) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let page_id = parse_page_id(id, "id")?;

    api.archive_page(&page_id).await?;
    info!(workflow_id = %page_id, "Archived workflow");

    Reply::ok("Workflow deleted", json!({ "id": page_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{config, page_id, workflow_page, Call, FakeNotion};

    #[tokio::test]
    async fn test_list_maps_templates() {
        let api = FakeNotion::new();
        api.seed("workflows-db", workflow_page(30, "Acoustic setup", "[{\"name\":\"Clean\"}]"));
        api.seed("workflows-db", workflow_page(31, "Broken", "[{"));

        let reply = list_workflows(&api, &config()).await.unwrap();
        let workflows = reply.data().as_array().unwrap();
        assert_eq!(workflows.len(), 2);
        assert_eq!(workflows[0]["data"], "[{\"name\":\"Clean\"}]");
        assert_eq!(workflows[1]["data"], "[]");
    }

    #[tokio::test]
    async fn test_create_with_malformed_data_makes_no_calls() {
        let api = FakeNotion::new();
        let input: WorkflowFields =
            serde_json::from_value(json!({ "name": "Refret", "data": "[{\"name\":" })).unwrap();

        let err = create_workflow(&api, &config(), input).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_accepts_inline_json() {
        let api = FakeNotion::new();
        let input: WorkflowFields = serde_json::from_value(json!({
            "name": "Refret",
            "data": [{ "name": "Pull frets", "estimatedHours": 2 }]
        }))
        .unwrap();

        let reply = create_workflow(&api, &config(), input).await.unwrap();
        assert_eq!(reply.status, 201);
        let stored: serde_json::Value =
            serde_json::from_str(reply.data()["data"].as_str().unwrap()).unwrap();
        assert_eq!(stored[0]["name"], "Pull frets");
    }

    #[tokio::test]
    async fn test_delete_archives_page() {
        let api = FakeNotion::new();
        api.seed("workflows-db", workflow_page(30, "Setup", "[]"));

        let reply = delete_workflow(&api, Some(&page_id(30))).await.unwrap();
        assert_eq!(reply.data()["id"], page_id(30));
        assert!(matches!(&api.calls()[0], Call::Archive { page } if *page == page_id(30)));
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let api = FakeNotion::new();
        let err = delete_workflow(&api, None).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(api.calls().is_empty());
    }
}
