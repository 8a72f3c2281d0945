//! Inbox notes shown as the todo list.

use serde::{Deserialize, Serialize};
use shared::{Error, Page, Patch, PropertyMap, PropertyWriter, Result};

use super::fields::{patch_checkbox, patch_select, patch_title, required_text};

pub mod props {
    pub const NAME: &str = "Name";
    pub const DONE: &str = "Done";
    pub const LIST: &str = "List";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub list: Option<String>,
    pub created_at: Option<String>,
}

impl Todo {
    pub fn from_page(page: &Page) -> Self {
        let p = page.props();
        Self {
            id: page.id.clone(),
            text: p.title(props::NAME).unwrap_or_default(),
            done: p.checkbox(props::DONE).unwrap_or(false),
            list: p.select(props::LIST),
            created_at: page.created_time.clone(),
        }
    }
}

/// Body of `createTodo` / `updateTodo`. The inbox endpoint sends `note` for the text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TodoFields {
    pub id: Option<String>,
    #[serde(alias = "note")]
    pub text: Patch<String>,
    pub done: Patch<bool>,
    pub list: Patch<String>,
}

impl TodoFields {
    pub fn validate_new(&self) -> Result<()> {
        match &self.text {
            Patch::Value(text) => required_text(Some(text.as_str()), "text").map(|_| ()),
            _ => Err(Error::validation("text is required")),
        }
    }

    pub fn to_new_properties(&self) -> Result<PropertyMap> {
        self.validate_new()?;
        let mut w = PropertyWriter::new();
        patch_title(&mut w, props::NAME, &self.text, "text")?;
        patch_checkbox(&mut w, props::DONE, &self.done);
        if let Patch::Value(_) = &self.list {
            patch_select(&mut w, props::LIST, &self.list);
        }
        Ok(w.build())
    }

    pub fn to_update_properties(&self) -> Result<PropertyMap> {
        let mut w = PropertyWriter::new();
        patch_title(&mut w, props::NAME, &self.text, "text")?;
        patch_checkbox(&mut w, props::DONE, &self.done);
        patch_select(&mut w, props::LIST, &self.list);
        if w.is_empty() {
            return Err(Error::validation("No fields to update"));
        }
        Ok(w.build())
    }
}
