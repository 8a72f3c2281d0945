//! Flat application records and their mapping to Notion pages.

pub mod fields;
pub mod milestone;
pub mod part;
pub mod project;
pub mod rating;
pub mod todo;
pub mod workflow;

pub use milestone::{Milestone, MilestoneFields};
pub use part::{Part, PartFields};
pub use project::{NewProject, Project, ProjectPatch};
pub use rating::{parse_rating, RatingScale, DEFAULT_RATING};
pub use todo::{Todo, TodoFields};
pub use workflow::{Workflow, WorkflowFields};

use serde_json::{json, Value};

/// Filter selecting children (milestones, parts) related to one project.
pub fn project_filter(project_id: &str) -> Value {
    json!({
        "property": "Project",
        "relation": { "contains": project_id }
    })
}
