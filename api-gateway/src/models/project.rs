//! Work orders (the Projects database).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{Error, Page, Patch, PropertyMap, PropertyWriter, Result};

use super::fields::{
    parse_number, patch_date, patch_number, patch_select, patch_text, patch_title, required_text,
};
use super::rating::RatingScale;

/// Status that triggers the paid-date stamp.
pub const PAID_STATUS: &str = "Paid";
/// Status reported for pages that carry none.
pub const DEFAULT_STATUS: &str = "On The Bench";

/// Property names in the Projects database.
pub mod props {
    pub const NAME: &str = "Name";
    pub const STATUS: &str = "Status";
    pub const MAKE: &str = "Make";
    pub const MODEL: &str = "Model";
    pub const INSTRUMENT_TYPE: &str = "Instrument Type";
    pub const SERIAL_NUMBER: &str = "Serial Number";
    pub const CUSTOMER: &str = "Customer";
    pub const DUE: &str = "Due";
    pub const PAID_DATE: &str = "Paid Date";
    pub const COMPLEXITY: &str = "Complexity";
    pub const PROFITABILITY: &str = "Profitability";
    pub const TOTAL: &str = "Total";
    pub const SUBTOTAL: &str = "Subtotal";
    pub const COMMISSION: &str = "Commission";
    pub const DISCOUNT: &str = "Discount";
    pub const TAX: &str = "Tax";
    pub const TIP: &str = "Tip";
    pub const HOURLY_RATE: &str = "Hourly Rate";
    pub const RELIEF_BEFORE: &str = "Relief Before";
    pub const RELIEF_AFTER: &str = "Relief After";
    pub const FRET_HEIGHT_BEFORE: &str = "Fret Height Before";
    pub const FRET_HEIGHT_AFTER: &str = "Fret Height After";
    pub const NOTES: &str = "Notes";
    pub const ACTIONS_PERFORMED: &str = "Actions Performed";
    pub const PROGRESS: &str = "Progress";
    pub const MILESTONE_COUNT: &str = "Milestone Count";
    pub const COMPLETED_MILESTONES: &str = "Completed Milestones";
    pub const TOTAL_ESTIMATED_HOURS: &str = "Total Estimated Hours";
}

/// Flat work order record returned to the app.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub status: String,
    pub instrument_make: String,
    pub instrument_model: String,
    pub instrument_type: Option<String>,
    pub serial_number: String,
    pub customer_name: String,
    pub due_date: Option<String>,
    pub paid_date: Option<String>,
    pub complexity: u8,
    pub profitability: u8,
    pub total: f64,
    pub subtotal: f64,
    pub commission: f64,
    pub discount: f64,
    pub tax: f64,
    pub tip: f64,
    pub hourly_rate: f64,
    pub relief_before: Option<f64>,
    pub relief_after: Option<f64>,
    pub fret_height_before: Vec<f64>,
    pub fret_height_after: Vec<f64>,
    pub notes: String,
    pub actions_performed: Vec<String>,
    pub progress: f64,
    pub milestone_count: u32,
    pub completed_milestones: u32,
    pub total_estimated_hours: f64,
}

impl Project {
    pub fn from_page(page: &Page) -> Self {
        let p = page.props();
        let count = |name: &str| p.number(name).map(|n| n.max(0.0).round() as u32).unwrap_or(0);

        Self {
            id: page.id.clone(),
            name: p.title(props::NAME).unwrap_or_else(|| "Untitled".to_string()),
            status: p
                .status(props::STATUS)
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            instrument_make: p.rich_text(props::MAKE).unwrap_or_default(),
            instrument_model: p.rich_text(props::MODEL).unwrap_or_default(),
            instrument_type: p.select(props::INSTRUMENT_TYPE),
            serial_number: p.rich_text(props::SERIAL_NUMBER).unwrap_or_default(),
            customer_name: p.rich_text(props::CUSTOMER).unwrap_or_default(),
            due_date: p.date(props::DUE),
            paid_date: p.date(props::PAID_DATE),
            complexity: RatingScale::Complexity.read(&p, props::COMPLEXITY),
            profitability: RatingScale::Profitability.read(&p, props::PROFITABILITY),
            total: p.number(props::TOTAL).unwrap_or(0.0),
            subtotal: p.number(props::SUBTOTAL).unwrap_or(0.0),
            commission: p.number(props::COMMISSION).unwrap_or(0.0),
            discount: p.number(props::DISCOUNT).unwrap_or(0.0),
            tax: p.number(props::TAX).unwrap_or(0.0),
            tip: p.number(props::TIP).unwrap_or(0.0),
            hourly_rate: p.number(props::HOURLY_RATE).unwrap_or(0.0),
            relief_before: p.number(props::RELIEF_BEFORE),
            relief_after: p.number(props::RELIEF_AFTER),
            fret_height_before: parse_samples_text(p.rich_text(props::FRET_HEIGHT_BEFORE).as_deref()),
            fret_height_after: parse_samples_text(p.rich_text(props::FRET_HEIGHT_AFTER).as_deref()),
            notes: p.rich_text(props::NOTES).unwrap_or_default(),
            actions_performed: p.multi_select(props::ACTIONS_PERFORMED),
            progress: p.number(props::PROGRESS).unwrap_or(0.0),
            milestone_count: count(props::MILESTONE_COUNT),
            completed_milestones: count(props::COMPLETED_MILESTONES),
            total_estimated_hours: p.number(props::TOTAL_ESTIMATED_HOURS).unwrap_or(0.0),
        }
    }
}

/// Fret-height samples stored as comma-separated text.
fn parse_samples_text(text: Option<&str>) -> Vec<f64> {
    text.map(|t| {
        t.split(',')
            .filter_map(|s| s.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .collect()
    })
    .unwrap_or_default()
}

/// Samples supplied as an array (numbers or numeric strings) or a comma-separated string.
fn samples_text(value: &Value) -> String {
    let samples: Vec<f64> = match value {
        Value::Array(items) => items.iter().filter_map(parse_number).collect(),
        Value::String(s) => parse_samples_text(Some(s.as_str())),
        other => parse_number(other).into_iter().collect(),
    };
    samples
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Body of `createProject`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewProject {
    pub name: Option<String>,
    pub status: Option<String>,
    pub instrument_make: Option<String>,
    pub instrument_model: Option<String>,
    pub instrument_type: Option<String>,
    pub serial_number: Option<String>,
    pub customer_name: Option<String>,
    pub due_date: Option<String>,
    pub paid_date: Option<String>,
    pub complexity: Option<Value>,
    pub profitability: Option<Value>,
    pub total: Option<Value>,
    pub subtotal: Option<Value>,
    pub commission: Option<Value>,
    pub discount: Option<Value>,
    pub tax: Option<Value>,
    pub tip: Option<Value>,
    pub hourly_rate: Option<Value>,
    pub relief_before: Option<Value>,
    pub relief_after: Option<Value>,
    pub fret_height_before: Option<Value>,
    pub fret_height_after: Option<Value>,
    pub notes: Option<String>,
    pub actions_performed: Option<Vec<String>>,
}

impl NewProject {
    /// Properties for a new page. Fields not supplied are left out.
    pub fn to_properties(&self) -> Result<PropertyMap> {
        let name = required_text(self.name.as_deref(), "name")?;
        let mut w = PropertyWriter::new();
        w.title(props::NAME, &name);

        if let Some(status) = self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            w.status(props::STATUS, status);
        }
        for (property, text) in [
            (props::MAKE, &self.instrument_make),
            (props::MODEL, &self.instrument_model),
            (props::SERIAL_NUMBER, &self.serial_number),
            (props::CUSTOMER, &self.customer_name),
            (props::NOTES, &self.notes),
        ] {
            if let Some(text) = text {
                w.rich_text(property, text);
            }
        }
        if let Some(kind) = self.instrument_type.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            w.select(props::INSTRUMENT_TYPE, Some(kind));
        }
        for (property, date) in [(props::DUE, &self.due_date), (props::PAID_DATE, &self.paid_date)] {
            if let Some(date) = date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                w.date(property, Some(date));
            }
        }
        for (property, scale, value) in [
            (props::COMPLEXITY, RatingScale::Complexity, &self.complexity),
            (props::PROFITABILITY, RatingScale::Profitability, &self.profitability),
        ] {
            if let Some(label) = value.as_ref().and_then(|v| scale.label_for_input(v)) {
                w.select(property, Some(label.as_str()));
            }
        }
        for (property, value) in [
            (props::TOTAL, &self.total),
            (props::SUBTOTAL, &self.subtotal),
            (props::COMMISSION, &self.commission),
            (props::DISCOUNT, &self.discount),
            (props::TAX, &self.tax),
            (props::TIP, &self.tip),
            (props::HOURLY_RATE, &self.hourly_rate),
            (props::RELIEF_BEFORE, &self.relief_before),
            (props::RELIEF_AFTER, &self.relief_after),
        ] {
            if let Some(n) = value.as_ref().and_then(parse_number) {
                w.number(property, Some(n));
            }
        }
        for (property, value) in [
            (props::FRET_HEIGHT_BEFORE, &self.fret_height_before),
            (props::FRET_HEIGHT_AFTER, &self.fret_height_after),
        ] {
            if let Some(value) = value {
                w.rich_text(property, &samples_text(value));
            }
        }
        if let Some(actions) = &self.actions_performed {
            w.multi_select(props::ACTIONS_PERFORMED, actions);
        }

        Ok(w.build())
    }
}

/// Body of `updateProject`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPatch {
    pub id: Option<String>,
    pub name: Patch<String>,
    pub status: Patch<String>,
    pub instrument_make: Patch<String>,
    pub instrument_model: Patch<String>,
    pub instrument_type: Patch<String>,
    pub serial_number: Patch<String>,
    pub customer_name: Patch<String>,
    pub due_date: Patch<String>,
    pub paid_date: Patch<String>,
    pub complexity: Patch<Value>,
    pub profitability: Patch<Value>,
    pub total: Patch<Value>,
    pub subtotal: Patch<Value>,
    pub commission: Patch<Value>,
    pub discount: Patch<Value>,
    pub tax: Patch<Value>,
    pub tip: Patch<Value>,
    pub hourly_rate: Patch<Value>,
    pub relief_before: Patch<Value>,
    pub relief_after: Patch<Value>,
    pub fret_height_before: Patch<Value>,
    pub fret_height_after: Patch<Value>,
    pub notes: Patch<String>,
    pub actions_performed: Patch<Vec<String>>,
}

impl ProjectPatch {
    /// Property mutations for the fields present in the patch.
    ///
    /// `today` stamps the paid date when the status moves to [`PAID_STATUS`]
    /// and the caller did not send `paidDate` itself.
    pub fn to_properties(&self, today: NaiveDate) -> Result<PropertyMap> {
        let mut w = PropertyWriter::new();

        patch_title(&mut w, props::NAME, &self.name, "name")?;
        write_status_change(&mut w, &self.status, &self.paid_date, today)?;

        for (property, patch) in [
            (props::MAKE, &self.instrument_make),
            (props::MODEL, &self.instrument_model),
            (props::SERIAL_NUMBER, &self.serial_number),
            (props::CUSTOMER, &self.customer_name),
            (props::NOTES, &self.notes),
        ] {
            patch_text(&mut w, property, patch);
        }
        patch_select(&mut w, props::INSTRUMENT_TYPE, &self.instrument_type);
        patch_date(&mut w, props::DUE, &self.due_date);
        patch_date(&mut w, props::PAID_DATE, &self.paid_date);

        for (property, scale, patch) in [
            (props::COMPLEXITY, RatingScale::Complexity, &self.complexity),
            (props::PROFITABILITY, RatingScale::Profitability, &self.profitability),
        ] {
            match patch {
                Patch::Missing => {}
                Patch::Null => {
                    w.select(property, None);
                }
                Patch::Value(value) => {
                    if let Some(label) = scale.label_for_input(value) {
                        w.select(property, Some(label.as_str()));
                    }
                }
            }
        }
        for (property, patch) in [
            (props::TOTAL, &self.total),
            (props::SUBTOTAL, &self.subtotal),
            (props::COMMISSION, &self.commission),
            (props::DISCOUNT, &self.discount),
            (props::TAX, &self.tax),
            (props::TIP, &self.tip),
            (props::HOURLY_RATE, &self.hourly_rate),
            (props::RELIEF_BEFORE, &self.relief_before),
            (props::RELIEF_AFTER, &self.relief_after),
        ] {
            patch_number(&mut w, property, patch);
        }
        for (property, patch) in [
            (props::FRET_HEIGHT_BEFORE, &self.fret_height_before),
            (props::FRET_HEIGHT_AFTER, &self.fret_height_after),
        ] {
            match patch {
                Patch::Missing => {}
                Patch::Null => {
                    w.rich_text(property, "");
                }
                Patch::Value(value) => {
                    w.rich_text(property, &samples_text(value));
                }
            }
        }
        match &self.actions_performed {
            Patch::Missing => {}
            Patch::Null => {
                w.multi_select(props::ACTIONS_PERFORMED, &[]);
            }
            Patch::Value(actions) => {
                w.multi_select(props::ACTIONS_PERFORMED, actions);
            }
        }

        if w.is_empty() {
            return Err(Error::validation("No fields to update"));
        }
        Ok(w.build())
    }
}

/// Write a status change, stamping the paid date when the status becomes paid.
pub fn write_status_change(
    w: &mut PropertyWriter,
    status: &Patch<String>,
    paid_date: &Patch<String>,
    today: NaiveDate,
) -> Result<()> {
    match status {
        Patch::Missing => {}
        Patch::Null => return Err(Error::validation("status cannot be cleared")),
        Patch::Value(status) => {
            let status = required_text(Some(status.as_str()), "status")?;
            w.status(props::STATUS, &status);
            if status.eq_ignore_ascii_case(PAID_STATUS) && paid_date.is_missing() {
                let stamp = today.format("%Y-%m-%d").to_string();
                w.date(props::PAID_DATE, Some(stamp.as_str()));
            }
        }
    }
    Ok(())
}

/// Listing filter for the requested statuses; `None` when every status is wanted.
pub fn status_filter(statuses: &[String]) -> Option<Value> {
    let clause = |status: &String| json!({ "property": props::STATUS, "status": { "equals": status } });
    match statuses {
        [] => None,
        [single] => Some(clause(single)),
        many => Some(json!({ "or": many.iter().map(clause).collect::<Vec<_>>() })),
    }
}
