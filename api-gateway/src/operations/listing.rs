//! Default GET: the board of open work orders with their milestones and parts.

use serde::Serialize;
use shared::notion::query_all;
use shared::{Config, NotionApi, Result, Setting};
use tracing::{info, warn};

use super::Reply;
use crate::models::project::status_filter;
use crate::models::{Milestone, Part, Project};

/// Value of the `status` parameter that disables the status filter.
pub const ALL_STATUSES: &str = "all";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkBoard {
    pub projects: Vec<Project>,
    pub milestones: Vec<Milestone>,
    pub parts: Vec<Part>,
}

/// Statuses selected by the `status` parameter (comma-separated).
///
/// Empty when every status is wanted.
pub fn requested_statuses(param: Option<&str>, default_status: &str) -> Vec<String> {
    let param = param.map(str::trim).filter(|p| !p.is_empty());
    match param {
        None => vec![default_status.to_string()],
        Some(p) if p.eq_ignore_ascii_case(ALL_STATUSES) => Vec::new(),
        Some(p) => p
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    }
}

/// Fetch projects, milestones and parts concurrently, each to the last page.
///
/// Parts are optional: a missing database or a failed query yields no parts.
pub async fn list_work<A>(api: &A, config: &Config, status_param: Option<&str>) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let projects_db = config.database(Setting::Projects)?;
    let milestones_db = config.database(Setting::Milestones)?;
    let parts_db = config.optional_database(Setting::Parts);

    let statuses = requested_statuses(status_param, &config.default_project_status);
    let filter = status_filter(&statuses);

    let primary = async {
        tokio::try_join!(
            query_all(api, projects_db, filter, Vec::new()),
            query_all(api, milestones_db, None, Vec::new()),
        )
    };
    let parts = async {
        let Some(parts_db) = parts_db else {
            warn!("NOTION_PARTS_DATABASE_ID not set, listing without parts");
            return Vec::new();
        };
        match query_all(api, parts_db, None, Vec::new()).await {
            Ok(pages) => pages,
            Err(e) => {
                warn!(error = %e, "Failed to load parts, listing without them");
                Vec::new()
            }
        }
    };

    let (primary, part_pages) = tokio::join!(primary, parts);
    let (project_pages, milestone_pages) = primary?;

    let projects: Vec<Project> = project_pages.iter().map(Project::from_page).collect();
    let mut milestones: Vec<Milestone> = milestone_pages.iter().map(Milestone::from_page).collect();
    milestones.sort_by_key(|m| m.order);
    let mut parts: Vec<Part> = part_pages.iter().map(Part::from_page).collect();
    parts.sort_by_key(|p| p.order);

    info!(
        projects = projects.len(),
        milestones = milestones.len(),
        parts = parts.len(),
        statuses = ?statuses,
        "Loaded work board"
    );

    Reply::ok(
        format!("Loaded {} projects", projects.len()),
        WorkBoard {
            projects,
            milestones,
            parts,
        },
    )
}
