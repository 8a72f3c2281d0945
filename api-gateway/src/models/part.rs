//! Parts ordered for a work order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{Error, Page, Patch, PropertyMap, PropertyWriter, Result};

use super::fields::{patch_number, patch_title, required_text};
use crate::reconcile::Desired;

/// Property names in the Parts database.
pub mod props {
    pub const NAME: &str = "Name";
    pub const PROJECT: &str = "Project";
    pub const QUANTITY: &str = "Quantity";
    pub const UNIT_PRICE: &str = "Unit Price";
    pub const ORDER: &str = "Order";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: String,
    pub project_id: Option<String>,
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub order: u32,
}

impl Part {
    pub fn from_page(page: &Page) -> Self {
        let p = page.props();
        Self {
            id: page.id.clone(),
            project_id: p.first_relation(props::PROJECT),
            name: p.title(props::NAME).unwrap_or_else(|| "Untitled".to_string()),
            quantity: p.number(props::QUANTITY).unwrap_or(1.0),
            unit_price: p.number(props::UNIT_PRICE).unwrap_or(0.0),
            order: p
                .number(props::ORDER)
                .map(|n| n.max(0.0).round() as u32)
                .unwrap_or(1),
        }
    }
}

/// A part line as sent by the app.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartFields {
    pub id: Option<String>,
    pub name: Patch<String>,
    pub quantity: Patch<Value>,
    pub unit_price: Patch<Value>,
}

impl Desired for PartFields {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl PartFields {
    pub fn require_name(&self) -> Result<()> {
        match &self.name {
            Patch::Value(name) => required_text(Some(name.as_str()), "part name").map(|_| ()),
            _ => Err(Error::validation("part name is required")),
        }
    }

    fn write_fields(&self, w: &mut PropertyWriter) -> Result<()> {
        patch_title(w, props::NAME, &self.name, "part name")?;
        patch_number(w, props::QUANTITY, &self.quantity);
        patch_number(w, props::UNIT_PRICE, &self.unit_price);
        Ok(())
    }

    pub fn to_new_properties(&self, project_id: &str, order: u32) -> Result<PropertyMap> {
        self.require_name()?;
        let mut w = PropertyWriter::new();
        self.write_fields(&mut w)?;
        w.relation(props::PROJECT, &[project_id])
            .number(props::ORDER, Some(f64::from(order)));
        Ok(w.build())
    }

    pub fn to_resequenced_properties(&self, order: u32) -> Result<PropertyMap> {
        let mut w = PropertyWriter::new();
        self.write_fields(&mut w)?;
        w.number(props::ORDER, Some(f64::from(order)));
        Ok(w.build())
    }
}
