//! Reading and writing Notion property bags.

use serde_json::{json, Map, Value};

/// Properties object sent to the pages endpoints.
pub type PropertyMap = Map<String, Value>;

/// Notion rejects rich text segments longer than this many characters.
pub const RICH_TEXT_SEGMENT_LIMIT: usize = 2000;

/// Typed read access to a page's properties.
///
/// Every accessor returns `None` (or an empty collection) when the property
/// is absent or has an unexpected shape; callers pick the default.
#[derive(Debug, Clone, Copy)]
pub struct PropertyReader<'a> {
    props: &'a Map<String, Value>,
}

impl<'a> PropertyReader<'a> {
    pub fn new(props: &'a Map<String, Value>) -> Self {
        Self { props }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.props.get(name).filter(|v| !v.is_null())
    }

    /// Title text, `None` when absent or empty.
    pub fn title(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(|p| p.get("title"))
            .map(segments_text)
            .filter(|s| !s.is_empty())
    }

    /// Rich text, `None` when absent or empty.
    pub fn rich_text(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(|p| p.get("rich_text"))
            .map(segments_text)
            .filter(|s| !s.is_empty())
    }

    /// Number, formula result or rollup result.
    pub fn number(&self, name: &str) -> Option<f64> {
        let prop = self.get(name)?;
        prop.get("number")
            .and_then(Value::as_f64)
            .or_else(|| prop.pointer("/formula/number").and_then(Value::as_f64))
            .or_else(|| prop.pointer("/rollup/number").and_then(Value::as_f64))
    }

    pub fn select(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(|p| p.pointer("/select/name"))
            .and_then(Value::as_str)
            .map(String::from)
    }

    /// Status option name. Select-typed status columns are accepted too.
    pub fn status(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(|p| p.pointer("/status/name"))
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| self.select(name))
    }

    pub fn multi_select(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(|p| p.get("multi_select"))
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(|o| o.get("name").and_then(Value::as_str))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Start of a date property.
    pub fn date(&self, name: &str) -> Option<String> {
        self.get(name)
            .and_then(|p| p.pointer("/date/start"))
            .and_then(Value::as_str)
            .map(String::from)
    }

    pub fn checkbox(&self, name: &str) -> Option<bool> {
        self.get(name)
            .and_then(|p| p.get("checkbox"))
            .and_then(Value::as_bool)
    }

    pub fn relation_ids(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(|p| p.get("relation"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|r| r.get("id").and_then(Value::as_str))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First related page id.
    pub fn first_relation(&self, name: &str) -> Option<String> {
        self.relation_ids(name).into_iter().next()
    }
}

/// Concatenate a rich text array. Pages read back from Notion carry
/// `plain_text`; property bags we built ourselves only carry `text.content`.
fn segments_text(segments: &Value) -> String {
    segments
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|s| {
                    s.get("plain_text")
                        .and_then(Value::as_str)
                        .or_else(|| s.pointer("/text/content").and_then(Value::as_str))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn text_segments(text: &str) -> Value {
    let chars: Vec<char> = text.chars().collect();
    let segments: Vec<Value> = chars
        .chunks(RICH_TEXT_SEGMENT_LIMIT)
        .map(|chunk| json!({ "text": { "content": chunk.iter().collect::<String>() } }))
        .collect();
    Value::Array(segments)
}

/// Builder for the `properties` object of a create or update call.
#[derive(Debug, Clone, Default)]
pub struct PropertyWriter {
    props: PropertyMap,
}

impl PropertyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, name: &str, value: Value) -> &mut Self {
        self.props.insert(name.to_string(), value);
        self
    }

    pub fn title(&mut self, name: &str, text: &str) -> &mut Self {
        self.set(name, json!({ "title": text_segments(text) }))
    }

    /// Rich text, split into segments Notion accepts. Empty text clears the property.
    pub fn rich_text(&mut self, name: &str, text: &str) -> &mut Self {
        self.set(name, json!({ "rich_text": text_segments(text) }))
    }

    pub fn number(&mut self, name: &str, value: Option<f64>) -> &mut Self {
        self.set(name, json!({ "number": value }))
    }

    pub fn select(&mut self, name: &str, option: Option<&str>) -> &mut Self {
        let value = match option {
            Some(option) => json!({ "name": option }),
            None => Value::Null,
        };
        self.set(name, json!({ "select": value }))
    }

    pub fn status(&mut self, name: &str, option: &str) -> &mut Self {
        self.set(name, json!({ "status": { "name": option } }))
    }

    pub fn multi_select(&mut self, name: &str, options: &[String]) -> &mut Self {
        let options: Vec<Value> = options.iter().map(|o| json!({ "name": o })).collect();
        self.set(name, json!({ "multi_select": options }))
    }

    /// Date start (`YYYY-MM-DD` or ISO 8601). `None` clears the property.
    pub fn date(&mut self, name: &str, start: Option<&str>) -> &mut Self {
        let value = match start {
            Some(start) => json!({ "start": start }),
            None => Value::Null,
        };
        self.set(name, json!({ "date": value }))
    }

    pub fn checkbox(&mut self, name: &str, checked: bool) -> &mut Self {
        self.set(name, json!({ "checkbox": checked }))
    }

    pub fn relation(&mut self, name: &str, page_ids: &[&str]) -> &mut Self {
        let ids: Vec<Value> = page_ids.iter().map(|id| json!({ "id": id })).collect();
        self.set(name, json!({ "relation": ids }))
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn build(self) -> PropertyMap {
        self.props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notion_page_properties() -> Map<String, Value> {
        json!({
            "Name": { "type": "title", "title": [
                { "plain_text": "Strat ", "text": { "content": "Strat " } },
                { "plain_text": "refret", "text": { "content": "refret" } }
            ]},
            "Make": { "type": "rich_text", "rich_text": [] },
            "Progress": { "type": "formula", "formula": { "type": "number", "number": 42.5 } },
            "Milestone Count": { "type": "rollup", "rollup": { "type": "number", "number": 4 } },
            "Status": { "type": "status", "status": { "name": "Waiting" } },
            "Kind": { "type": "select", "select": null },
            "Due": { "type": "date", "date": { "start": "2024-05-01", "end": null } },
            "Project": { "type": "relation", "relation": [{ "id": "p-1" }, { "id": "p-2" }] },
            "Urgent": { "type": "checkbox", "checkbox": true },
            "Actions Performed": { "type": "multi_select", "multi_select": [
                { "name": "Setup" }, { "name": "Fret Level" }
            ]}
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_reads_notion_shapes() {
        let props = notion_page_properties();
        let reader = PropertyReader::new(&props);

        assert_eq!(reader.title("Name").as_deref(), Some("Strat refret"));
        assert_eq!(reader.rich_text("Make"), None);
        assert_eq!(reader.number("Progress"), Some(42.5));
        assert_eq!(reader.number("Milestone Count"), Some(4.0));
        assert_eq!(reader.status("Status").as_deref(), Some("Waiting"));
        assert_eq!(reader.select("Kind"), None);
        assert_eq!(reader.date("Due").as_deref(), Some("2024-05-01"));
        assert_eq!(reader.first_relation("Project").as_deref(), Some("p-1"));
        assert_eq!(reader.checkbox("Urgent"), Some(true));
        assert_eq!(reader.multi_select("Actions Performed"), vec!["Setup", "Fret Level"]);
        assert_eq!(reader.number("Missing"), None);
        assert!(reader.relation_ids("Missing").is_empty());
    }

    #[test]
    fn test_written_properties_read_back() {
        let mut writer = PropertyWriter::new();
        writer
            .title("Name", "Tele setup")
            .number("Total", Some(120.0))
            .select("Complexity", Some("3-Moderate"))
            .checkbox("Urgent", false)
            .relation("Project", &["p-9"]);
        let props = writer.build();
        let reader = PropertyReader::new(&props);

        assert_eq!(reader.title("Name").as_deref(), Some("Tele setup"));
        assert_eq!(reader.number("Total"), Some(120.0));
        assert_eq!(reader.select("Complexity").as_deref(), Some("3-Moderate"));
        assert_eq!(reader.checkbox("Urgent"), Some(false));
        assert_eq!(reader.first_relation("Project").as_deref(), Some("p-9"));
    }

    #[test]
    fn test_long_rich_text_is_segmented() {
        let text = "x".repeat(RICH_TEXT_SEGMENT_LIMIT * 2 + 10);
        let mut writer = PropertyWriter::new();
        writer.rich_text("Data", &text);
        let props = writer.build();

        let segments = props["Data"]["rich_text"].as_array().unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(PropertyReader::new(&props).rich_text("Data"), Some(text));
    }

    #[test]
    fn test_clearing_writes_null_payloads() {
        let mut writer = PropertyWriter::new();
        writer
            .number("Tip", None)
            .select("Instrument Type", None)
            .date("Due", None)
            .rich_text("Notes", "");
        let props = writer.build();

        assert_eq!(props["Tip"], json!({ "number": null }));
        assert_eq!(props["Instrument Type"], json!({ "select": null }));
        assert_eq!(props["Due"], json!({ "date": null }));
        assert_eq!(props["Notes"], json!({ "rich_text": [] }));
    }
}
