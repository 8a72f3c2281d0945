//! `"<n>-<Label>"` rating selects.

use serde_json::Value;
use shared::PropertyReader;

use super::fields::parse_number;

/// Rating assumed when a page carries none or an unreadable one.
pub const DEFAULT_RATING: u8 = 3;

/// Leading integer of a rating label such as `"4-Involved"`.
///
/// Returns [`DEFAULT_RATING`] when the label is absent or not of that form.
pub fn parse_rating(label: Option<&str>) -> u8 {
    label.and_then(rating_prefix).unwrap_or(DEFAULT_RATING)
}

fn rating_prefix(label: &str) -> Option<u8> {
    let (digits, name) = label.trim().split_once('-')?;
    let digits = digits.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || name.trim().is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// The two rating selects on a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingScale {
    Complexity,
    Profitability,
}

impl RatingScale {
    fn labels(self) -> [&'static str; 5] {
        match self {
            RatingScale::Complexity => ["Simple", "Easy", "Moderate", "Involved", "Complex"],
            RatingScale::Profitability => ["Loss", "Low", "Fair", "Good", "Excellent"],
        }
    }

    /// Select option for a rating from 1 to 5.
    pub fn label(self, rating: u8) -> Option<String> {
        let index = usize::from(rating).checked_sub(1)?;
        self.labels()
            .get(index)
            .map(|name| format!("{}-{}", rating, name))
    }

    /// Select option for caller input: `4`, `"4"` or `"4-Anything"`.
    pub fn label_for_input(self, value: &Value) -> Option<String> {
        let rating = match value {
            Value::String(s) if s.contains('-') => f64::from(rating_prefix(s)?),
            other => parse_number(other)?,
        };

        if rating.fract() != 0.0 || !(1.0..=5.0).contains(&rating) {
            return None;
        }
        self.label(rating as u8)
    }

    /// Read a rating from a page, accepting select labels or plain numbers.
    pub fn read(self, props: &PropertyReader<'_>, property: &str) -> u8 {
        if let Some(label) = props.select(property) {
            return parse_rating(Some(label.as_str()));
        }
        props
            .number(property)
            .filter(|n| n.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(n))
            .map(|n| n as u8)
            .unwrap_or(DEFAULT_RATING)
    }
}
