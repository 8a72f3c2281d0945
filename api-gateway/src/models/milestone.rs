//! Milestones belonging to a work order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{Error, Page, Patch, PropertyMap, PropertyWriter, Result};

use super::fields::{patch_checkbox, patch_number, patch_text, patch_title, required_text};
use crate::reconcile::Desired;

/// Property names in the Milestones database.
pub mod props {
    pub const NAME: &str = "Name";
    pub const PROJECT: &str = "Project";
    pub const ORDER: &str = "Order";
    pub const STATUS: &str = "Status";
    pub const ESTIMATED_HOURS: &str = "Estimated Hours";
    pub const ACTUAL_HOURS: &str = "Actual Hours";
    pub const FIXED_PRICE: &str = "Fixed Price";
    pub const URGENT: &str = "Urgent";
    pub const INCLUDE_IN_ESTIMATE: &str = "Include In Estimate";
    pub const WORKFLOW_GROUP: &str = "Workflow Group";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub project_id: Option<String>,
    pub name: String,
    pub order: u32,
    pub status: String,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub fixed_price: Option<f64>,
    pub urgent: bool,
    pub include_in_estimate: bool,
    pub workflow_group: Option<String>,
}

impl Milestone {
    pub fn from_page(page: &Page) -> Self {
        let p = page.props();
        Self {
            id: page.id.clone(),
            project_id: p.first_relation(props::PROJECT),
            name: p.title(props::NAME).unwrap_or_else(|| "Untitled".to_string()),
            order: p
                .number(props::ORDER)
                .map(|n| n.max(0.0).round() as u32)
                .unwrap_or(1),
            status: p
                .status(props::STATUS)
                .unwrap_or_else(|| "Not Started".to_string()),
            estimated_hours: p.number(props::ESTIMATED_HOURS).unwrap_or(1.0),
            actual_hours: p.number(props::ACTUAL_HOURS).unwrap_or(0.0),
            fixed_price: p.number(props::FIXED_PRICE),
            urgent: p.checkbox(props::URGENT).unwrap_or(false),
            include_in_estimate: p.checkbox(props::INCLUDE_IN_ESTIMATE).unwrap_or(true),
            workflow_group: p.rich_text(props::WORKFLOW_GROUP),
        }
    }
}

/// A milestone as sent by the app, used for creates, updates and set saves.
///
/// Fields follow [`Patch`] rules: omitted keys are left alone, `null` clears.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MilestoneFields {
    pub id: Option<String>,
    pub name: Patch<String>,
    pub order: Patch<Value>,
    pub status: Patch<String>,
    pub estimated_hours: Patch<Value>,
    pub actual_hours: Patch<Value>,
    pub fixed_price: Patch<Value>,
    pub urgent: Patch<bool>,
    pub include_in_estimate: Patch<bool>,
    pub workflow_group: Patch<String>,
}

impl Desired for MilestoneFields {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl MilestoneFields {
    /// A new or re-saved milestone must carry a name.
    pub fn require_name(&self) -> Result<()> {
        match &self.name {
            Patch::Value(name) => required_text(Some(name.as_str()), "milestone name").map(|_| ()),
            _ => Err(Error::validation("milestone name is required")),
        }
    }

    fn write_fields(&self, w: &mut PropertyWriter) -> Result<()> {
        patch_title(w, props::NAME, &self.name, "milestone name")?;
        match &self.status {
            Patch::Missing => {}
            Patch::Null => return Err(Error::validation("milestone status cannot be cleared")),
            Patch::Value(status) => {
                w.status(props::STATUS, &required_text(Some(status.as_str()), "milestone status")?);
            }
        }
        patch_number(w, props::ESTIMATED_HOURS, &self.estimated_hours);
        patch_number(w, props::ACTUAL_HOURS, &self.actual_hours);
        patch_number(w, props::FIXED_PRICE, &self.fixed_price);
        patch_checkbox(w, props::URGENT, &self.urgent);
        patch_checkbox(w, props::INCLUDE_IN_ESTIMATE, &self.include_in_estimate);
        patch_text(w, props::WORKFLOW_GROUP, &self.workflow_group);
        Ok(())
    }

    /// Properties for a new milestone page under `project_id` at position `order`.
    pub fn to_new_properties(&self, project_id: &str, order: u32) -> Result<PropertyMap> {
        self.require_name()?;
        let mut w = PropertyWriter::new();
        self.write_fields(&mut w)?;
        w.relation(props::PROJECT, &[project_id])
            .number(props::ORDER, Some(f64::from(order)));
        Ok(w.build())
    }

    /// Properties for an existing milestone kept at position `order`.
    pub fn to_resequenced_properties(&self, order: u32) -> Result<PropertyMap> {
        let mut w = PropertyWriter::new();
        self.write_fields(&mut w)?;
        w.number(props::ORDER, Some(f64::from(order)));
        Ok(w.build())
    }

    /// Properties for a single-milestone update.
    pub fn to_update_properties(&self) -> Result<PropertyMap> {
        let mut w = PropertyWriter::new();
        self.write_fields(&mut w)?;
        patch_number(&mut w, props::ORDER, &self.order);
        if w.is_empty() {
            return Err(Error::validation("No fields to update"));
        }
        Ok(w.build())
    }
}
