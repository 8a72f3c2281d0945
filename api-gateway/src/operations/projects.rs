//! Work order create and update.

use chrono::NaiveDate;
use shared::{Config, NotionApi, Result, Setting};
use tracing::info;

use super::Reply;
use crate::models::fields::parse_page_id;
use crate::models::{NewProject, Project, ProjectPatch};

pub async fn create_project<A>(api: &A, config: &Config, input: NewProject) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let properties = input.to_properties()?;
    let database_id = config.database(Setting::Projects)?;

    let page = api.create_page(database_id, properties).await?;
    let project = Project::from_page(&page);
    info!(project_id = %project.id, name = %project.name, "Created project");

    Reply::created("Project created", project)
}

/// Apply a tri-state patch to one work order. `today` drives the paid-date stamp.
pub async fn update_project<A>(api: &A, input: ProjectPatch, today: NaiveDate) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let page_id = parse_page_id(input.id.as_deref(), "id")?;
    let properties = input.to_properties(today)?;

    let page = api.update_page(&page_id, properties).await?;
    info!(project_id = %page_id, "Updated project");

    Reply::ok("Project updated", Project::from_page(&page))
}
