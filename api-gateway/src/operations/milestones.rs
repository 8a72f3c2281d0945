//! Milestone writes: batch create, progress saves, set saves and single updates.

use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::notion::query_all;
use shared::{Config, Error, NotionApi, Patch, PropertyMap, PropertyWriter, Result, Setting};
use tracing::info;

use super::Reply;
use crate::models::fields::{parse_page_id, patch_number, required_text};
use crate::models::milestone::props;
use crate::models::project::write_status_change;
use crate::models::{project_filter, Milestone, MilestoneFields, Project};
use crate::reconcile::{self, Outcome};

/// Body of `createMilestones` and `saveMilestones`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MilestoneBatch {
    pub project_id: Option<String>,
    pub milestones: Vec<MilestoneFields>,
}

/// One entry of a `saveProgress` body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub id: Option<String>,
    pub status: Patch<String>,
    pub actual_hours: Patch<Value>,
}

/// Body of `saveProgress`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressBatch {
    pub updates: Vec<ProgressUpdate>,
    pub project_id: Option<String>,
    pub project_status: Patch<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSaved {
    pub updated: usize,
    pub milestones: Vec<Milestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonesSaved {
    pub created: usize,
    pub updated: usize,
    pub archived: usize,
    pub milestones: Vec<Milestone>,
}

fn sorted_milestones<'a>(pages: impl Iterator<Item = &'a shared::Page>) -> Vec<Milestone> {
    let mut milestones: Vec<Milestone> = pages.map(Milestone::from_page).collect();
    milestones.sort_by_key(|m| m.order);
    milestones
}

/// Create every milestone of a new work order, numbered in list order.
pub async fn create_milestones<A>(api: &A, config: &Config, input: MilestoneBatch) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let project_id = parse_page_id(input.project_id.as_deref(), "projectId")?;
    if input.milestones.is_empty() {
        return Err(Error::validation("milestones must not be empty"));
    }
    let properties = input
        .milestones
        .iter()
        .zip(1u32..)
        .map(|(m, order)| m.to_new_properties(&project_id, order))
        .collect::<Result<Vec<_>>>()?;
    let database_id = config.database(Setting::Milestones)?;

    let pages = try_join_all(
        properties
            .into_iter()
            .map(|props| api.create_page(database_id, props)),
    )
    .await?;
    info!(project_id = %project_id, count = pages.len(), "Created milestones");

    let milestones = sorted_milestones(pages.iter());
    Reply::created(format!("Created {} milestones", milestones.len()), milestones)
}

fn progress_properties(update: &ProgressUpdate) -> Result<(String, PropertyMap)> {
    let page_id = parse_page_id(update.id.as_deref(), "id")?;
    let mut w = PropertyWriter::new();
    match &update.status {
        Patch::Missing => {}
        Patch::Null => return Err(Error::validation("milestone status cannot be cleared")),
        Patch::Value(status) => {
            w.status(props::STATUS, &required_text(Some(status.as_str()), "status")?);
        }
    }
    patch_number(&mut w, props::ACTUAL_HOURS, &update.actual_hours);
    if w.is_empty() {
        return Err(Error::validation(format!("No fields to update for {}", page_id)));
    }
    Ok((page_id, w.build()))
}

/// Save status and hours of several milestones, optionally moving the work
/// order's status in the same batch.
pub async fn save_progress<A>(api: &A, input: ProgressBatch, today: NaiveDate) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let mut writes = input
        .updates
        .iter()
        .map(progress_properties)
        .collect::<Result<Vec<_>>>()?;
    let milestone_count = writes.len();

    if !input.project_status.is_missing() {
        let project_id = parse_page_id(input.project_id.as_deref(), "projectId")?;
        let mut w = PropertyWriter::new();
        write_status_change(&mut w, &input.project_status, &Patch::Missing, today)?;
        writes.push((project_id, w.build()));
    }
    if writes.is_empty() {
        return Err(Error::validation("updates must not be empty"));
    }

    let mut pages = try_join_all(
        writes
            .into_iter()
            .map(|(page_id, props)| async move { api.update_page(&page_id, props).await }),
    )
    .await?;

    let project = (pages.len() > milestone_count)
        .then(|| pages.pop())
        .flatten()
        .map(|page| Project::from_page(&page));
    info!(
        milestones = milestone_count,
        project_updated = project.is_some(),
        "Saved progress"
    );

    Reply::ok(
        format!("Updated {} milestones", milestone_count),
        ProgressSaved {
            updated: milestone_count,
            milestones: sorted_milestones(pages.iter()),
            project,
        },
    )
}

/// Replace a work order's milestones with the supplied list.
pub async fn save_milestones<A>(api: &A, config: &Config, input: MilestoneBatch) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let project_id = parse_page_id(input.project_id.as_deref(), "projectId")?;
    for milestone in &input.milestones {
        milestone.require_name()?;
    }
    let database_id = config.database(Setting::Milestones)?;

    let existing = query_all(api, database_id, Some(project_filter(&project_id)), Vec::new()).await?;
    let mutations = reconcile::plan(
        &existing,
        &input.milestones,
        |m, order| m.to_new_properties(&project_id, order),
        |m, order| m.to_resequenced_properties(order),
    )?;
    let outcome: Outcome = reconcile::apply(api, database_id, mutations).await?;

    info!(
        project_id = %project_id,
        created = outcome.created.len(),
        updated = outcome.updated.len(),
        archived = outcome.archived,
        "Saved milestones"
    );

    Reply::ok(
        "Milestones saved",
        MilestonesSaved {
            created: outcome.created.len(),
            updated: outcome.updated.len(),
            archived: outcome.archived,
            milestones: sorted_milestones(outcome.pages()),
        },
    )
}

pub async fn update_milestone<A>(api: &A, input: MilestoneFields) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let page_id = parse_page_id(input.id.as_deref(), "id")?;
    let properties = input.to_update_properties()?;

    let page = api.update_page(&page_id, properties).await?;
    info!(milestone_id = %page_id, "Updated milestone");

    Reply::ok("Milestone updated", Milestone::from_page(&page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{config, milestone_page, page_id, project_page, Call, FakeNotion};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    fn batch(value: Value) -> MilestoneBatch {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_milestones_numbers_in_list_order() {
        let api = FakeNotion::new();
        let input = batch(json!({
            "projectId": page_id(1),
            "milestones": [{ "name": "Clean" }, { "name": "Restring", "estimatedHours": 0.5 }]
        }));

        let reply = create_milestones(&api, &config(), input).await.unwrap();

        assert_eq!(reply.status, 201);
        let milestones = reply.data().as_array().unwrap();
        assert_eq!(milestones[0]["name"], "Clean");
        assert_eq!(milestones[0]["order"], 1);
        assert_eq!(milestones[1]["order"], 2);
        assert_eq!(milestones[1]["estimatedHours"], 0.5);
        assert_eq!(milestones[1]["projectId"], page_id(1));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_create_milestones_with_unnamed_entry_makes_no_calls() {
        let api = FakeNotion::new();
        let input = batch(json!({
            "projectId": page_id(1),
            "milestones": [{ "name": "Clean" }, { "estimatedHours": 2 }]
        }));

        let err = create_milestones(&api, &config(), input).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_progress_updates_project_in_same_batch() {
        let api = FakeNotion::new();
        api.seed("projects-db", project_page(1, "Tele", "On The Bench"));
        api.seed("milestones-db", milestone_page(10, 1, "Clean", 1));
        api.seed("milestones-db", milestone_page(11, 1, "Restring", 2));
        let input: ProgressBatch = serde_json::from_value(json!({
            "updates": [
                { "id": page_id(10), "status": "Done", "actualHours": 1.5 },
                { "id": page_id(11), "actualHours": "0.25" }
            ],
            "projectId": page_id(1),
            "projectStatus": "Paid"
        }))
        .unwrap();

        let reply = save_progress(&api, input, today()).await.unwrap();

        assert_eq!(reply.data()["updated"], 2);
        assert_eq!(reply.data()["milestones"][0]["status"], "Done");
        assert_eq!(reply.data()["milestones"][1]["actualHours"], 0.25);
        assert_eq!(reply.data()["project"]["status"], "Paid");
        assert_eq!(reply.data()["project"]["paidDate"], "2024-06-14");
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_save_progress_rejects_bad_entry_without_calls() {
        let api = FakeNotion::new();
        let input: ProgressBatch = serde_json::from_value(json!({
            "updates": [{ "id": page_id(10), "status": "Done" }, { "id": page_id(11) }]
        }))
        .unwrap();

        let err = save_progress(&api, input, today()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_milestones_reconciles_set() {
        let api = FakeNotion::new();
        api.seed("milestones-db", milestone_page(10, 1, "A", 1));
        api.seed("milestones-db", milestone_page(11, 1, "B", 2));
        api.seed("milestones-db", milestone_page(12, 1, "C", 3));
        api.seed("milestones-db", milestone_page(20, 2, "Other job", 1));
        let input = batch(json!({
            "projectId": page_id(1),
            "milestones": [{ "id": page_id(11), "name": "B'" }, { "name": "D" }]
        }));

        let reply = save_milestones(&api, &config(), input).await.unwrap();

        assert_eq!(reply.data()["created"], 1);
        assert_eq!(reply.data()["updated"], 1);
        assert_eq!(reply.data()["archived"], 2);
        let names: Vec<&str> = reply.data()["milestones"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["B'", "D"]);

        let calls = api.calls();
        let count = |f: fn(&Call) -> bool| calls.iter().filter(|c| f(c)).count();
        assert_eq!(count(|c| matches!(c, Call::Query { .. })), 1);
        assert_eq!(count(|c| matches!(c, Call::Create { .. })), 1);
        assert_eq!(count(|c| matches!(c, Call::Update { .. })), 1);
        assert_eq!(count(|c| matches!(c, Call::Archive { .. })), 2);
        assert!(calls
            .iter()
            .any(|c| matches!(c, Call::Update { page, .. } if *page == page_id(11))));
        assert!(calls
            .iter()
            .any(|c| matches!(c, Call::Archive { page } if *page == page_id(10))));
        assert!(calls
            .iter()
            .any(|c| matches!(c, Call::Archive { page } if *page == page_id(12))));
    }

    #[tokio::test]
    async fn test_save_milestones_requires_names_before_any_call() {
        let api = FakeNotion::new();
        let input = batch(json!({
            "projectId": page_id(1),
            "milestones": [{ "id": page_id(11) }]
        }));

        let err = save_milestones(&api, &config(), input).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_milestones_fails_when_a_write_fails() {
        let api = FakeNotion::new();
        api.seed("milestones-db", milestone_page(10, 1, "A", 1));
        api.fail_writes();
        let input = batch(json!({
            "projectId": page_id(1),
            "milestones": [{ "name": "D" }]
        }));

        let err = save_milestones(&api, &config(), input).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_update_milestone_null_clears() {
        let api = FakeNotion::new();
        let mut page = milestone_page(10, 1, "Clean", 1);
        page.properties
            .insert("Fixed Price".to_string(), json!({ "number": 40 }));
        api.seed("milestones-db", page);
        let input: MilestoneFields =
            serde_json::from_value(json!({ "id": page_id(10), "fixedPrice": null })).unwrap();

        let reply = update_milestone(&api, input).await.unwrap();
        assert_eq!(reply.data()["fixedPrice"], Value::Null);
        assert_eq!(reply.data()["name"], "Clean");
    }
}
