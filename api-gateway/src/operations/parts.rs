//! Parts list saves for a work order.

use serde::{Deserialize, Serialize};
use shared::notion::query_all;
use shared::{Config, NotionApi, Result, Setting};
use tracing::info;

use super::Reply;
use crate::models::fields::parse_page_id;
use crate::models::{project_filter, Part, PartFields};
use crate::reconcile;

/// Body of `saveParts`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartBatch {
    pub project_id: Option<String>,
    pub parts: Vec<PartFields>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsSaved {
    pub created: usize,
    pub updated: usize,
    pub archived: usize,
    pub parts: Vec<Part>,
}

/// Replace a work order's parts list with the supplied one.
pub async fn save_parts<A>(api: &A, config: &Config, input: PartBatch) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let project_id = parse_page_id(input.project_id.as_deref(), "projectId")?;
    for part in &input.parts {
        part.require_name()?;
    }
    let database_id = config.database(Setting::Parts)?;

    let existing = query_all(api, database_id, Some(project_filter(&project_id)), Vec::new()).await?;
    let mutations = reconcile::plan(
        &existing,
        &input.parts,
        |p, order| p.to_new_properties(&project_id, order),
        |p, order| p.to_resequenced_properties(order),
    )?;
    let outcome = reconcile::apply(api, database_id, mutations).await?;

    let mut parts: Vec<Part> = outcome.pages().map(Part::from_page).collect();
    parts.sort_by_key(|p| p.order);
    info!(
        project_id = %project_id,
        created = outcome.created.len(),
        updated = outcome.updated.len(),
        archived = outcome.archived,
        "Saved parts"
    );

    Reply::ok(
        "Parts saved",
        PartsSaved {
            created: outcome.created.len(),
            updated: outcome.updated.len(),
            archived: outcome.archived,
            parts,
        },
    )
}
