//! Workflow templates: named, JSON-encoded lists of milestone templates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{Error, Page, Patch, PropertyMap, PropertyWriter, Result};

use super::fields::{patch_title, required_text};

/// Stored when a template has no usable data.
pub const EMPTY_DATA: &str = "[]";

pub mod props {
    pub const NAME: &str = "Name";
    pub const DATA: &str = "Data";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    /// JSON text, always parseable.
    pub data: String,
}

impl Workflow {
    pub fn from_page(page: &Page) -> Self {
        let p = page.props();
        let data = p
            .rich_text(props::DATA)
            .filter(|text| serde_json::from_str::<Value>(text).is_ok())
            .unwrap_or_else(|| EMPTY_DATA.to_string());

        Self {
            id: page.id.clone(),
            name: p.title(props::NAME).unwrap_or_else(|| "Untitled".to_string()),
            data,
        }
    }
}

/// Validate workflow data and return the text to store.
///
/// A string must itself be JSON text; any other JSON value is serialized.
pub fn data_text(value: &Value) -> Result<String> {
    match value {
        Value::String(text) => {
            serde_json::from_str::<Value>(text)
                .map_err(|e| Error::validation(format!("data must be valid JSON: {}", e)))?;
            Ok(text.trim().to_string())
        }
        other => Ok(serde_json::to_string(other)?),
    }
}

/// Body of `createWorkflow` / `updateWorkflow`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowFields {
    pub id: Option<String>,
    pub name: Patch<String>,
    pub data: Patch<Value>,
}

impl WorkflowFields {
    /// Check everything that can be checked without Notion.
    pub fn validate_new(&self) -> Result<()> {
        match &self.name {
            Patch::Value(name) => required_text(Some(name.as_str()), "name")?,
            _ => return Err(Error::validation("name is required")),
        };
        if let Patch::Value(data) = &self.data {
            data_text(data)?;
        }
        Ok(())
    }

    pub fn to_new_properties(&self) -> Result<PropertyMap> {
        self.validate_new()?;
        let mut w = PropertyWriter::new();
        patch_title(&mut w, props::NAME, &self.name, "name")?;
        let data = match &self.data {
            Patch::Value(data) => data_text(data)?,
            _ => EMPTY_DATA.to_string(),
        };
        w.rich_text(props::DATA, &data);
        Ok(w.build())
    }

    pub fn to_update_properties(&self) -> Result<PropertyMap> {
        let mut w = PropertyWriter::new();
        patch_title(&mut w, props::NAME, &self.name, "name")?;
        match &self.data {
            Patch::Missing => {}
            Patch::Null => {
                w.rich_text(props::DATA, EMPTY_DATA);
            }
            Patch::Value(data) => {
                w.rich_text(props::DATA, &data_text(data)?);
            }
        }
        if w.is_empty() {
            return Err(Error::validation("No fields to update"));
        }
        Ok(w.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::PropertyReader;

    #[test]
    fn test_invalid_stored_data_reads_as_empty_list() {
        let properties = json!({
            "Name": { "title": [{ "plain_text": "Full setup" }] },
            "Data": { "rich_text": [{ "plain_text": "[{\"name\": \"Restring\"" }] }
        });
        let workflow = Workflow::from_page(&Page {
            id: "w-1".to_string(),
            properties: properties.as_object().cloned().unwrap(),
            ..Page::default()
        });
        assert_eq!(workflow.name, "Full setup");
        assert_eq!(workflow.data, "[]");
    }

    #[test]
    fn test_data_text() {
        assert_eq!(data_text(&json!("[{\"name\":\"Clean\"}]")).unwrap(), "[{\"name\":\"Clean\"}]");
        assert_eq!(data_text(&json!([{ "name": "Clean" }])).unwrap(), "[{\"name\":\"Clean\"}]");
        assert_eq!(data_text(&json!("[{oops")).unwrap_err().status_code(), 400);
    }

    #[test]
    fn test_new_workflow_defaults_data() {
        let fields: WorkflowFields = serde_json::from_value(json!({ "name": "Refret" })).unwrap();
        let props = fields.to_new_properties().unwrap();
        assert_eq!(PropertyReader::new(&props).rich_text("Data").as_deref(), Some("[]"));
    }

    #[test]
    fn test_update_with_malformed_data_is_rejected() {
        let fields: WorkflowFields =
            serde_json::from_value(json!({ "id": "w-1", "data": "{not json" })).unwrap();
        assert_eq!(fields.to_update_properties().unwrap_err().status_code(), 400);
    }
}
