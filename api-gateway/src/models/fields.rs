//! Input parsing shared by the record types.

use serde_json::Value;
use shared::{Error, Patch, PropertyWriter, Result};
use uuid::Uuid;

/// Parse a number supplied either as a JSON number or a numeric string.
///
/// Anything else (including blank strings) yields `None`.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Validate a page id supplied by the caller and return it in hyphenated form.
pub fn parse_page_id(raw: Option<&str>, field: &str) -> Result<String> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::validation(format!("{} is required", field)))?;

    Uuid::parse_str(raw)
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| Error::validation(format!("{} is not a valid id: {}", field, raw)))
}

/// Trimmed, non-empty text for a required field.
pub fn required_text(value: Option<&str>, field: &str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::validation(format!("{} is required", field)))
}

/// Title of a patch: may be changed, never cleared.
pub fn patch_title(
    writer: &mut PropertyWriter,
    property: &str,
    patch: &Patch<String>,
    field: &str,
) -> Result<()> {
    match patch {
        Patch::Missing => {}
        Patch::Null => return Err(Error::validation(format!("{} cannot be cleared", field))),
        Patch::Value(text) => {
            let text = required_text(Some(text.as_str()), field)?;
            writer.title(property, &text);
        }
    }
    Ok(())
}

pub fn patch_text(writer: &mut PropertyWriter, property: &str, patch: &Patch<String>) {
    match patch {
        Patch::Missing => {}
        Patch::Null => {
            writer.rich_text(property, "");
        }
        Patch::Value(text) => {
            writer.rich_text(property, text);
        }
    }
}

/// Select option; `null` or a blank string clears it.
pub fn patch_select(writer: &mut PropertyWriter, property: &str, patch: &Patch<String>) {
    match patch {
        Patch::Missing => {}
        Patch::Null => {
            writer.select(property, None);
        }
        Patch::Value(option) => {
            let option = option.trim();
            writer.select(property, Some(option).filter(|o| !o.is_empty()));
        }
    }
}

/// Date; `null` or a blank string clears it.
pub fn patch_date(writer: &mut PropertyWriter, property: &str, patch: &Patch<String>) {
    match patch {
        Patch::Missing => {}
        Patch::Null => {
            writer.date(property, None);
        }
        Patch::Value(start) => {
            let start = start.trim();
            writer.date(property, Some(start).filter(|s| !s.is_empty()));
        }
    }
}

/// Number; `null` or a blank string clears it, non-numeric input is ignored.
pub fn patch_number(writer: &mut PropertyWriter, property: &str, patch: &Patch<Value>) {
    match patch {
        Patch::Missing => {}
        Patch::Null => {
            writer.number(property, None);
        }
        Patch::Value(Value::String(s)) if s.trim().is_empty() => {
            writer.number(property, None);
        }
        Patch::Value(value) => {
            if let Some(n) = parse_number(value) {
                writer.number(property, Some(n));
            }
        }
    }
}

/// Checkbox; `null` unchecks it.
pub fn patch_checkbox(writer: &mut PropertyWriter, property: &str, patch: &Patch<bool>) {
    match patch {
        Patch::Missing => {}
        Patch::Null => {
            writer.checkbox(property, false);
        }
        Patch::Value(checked) => {
            writer.checkbox(property, *checked);
        }
    }
}
