//! Tri-state field for partial updates.

use serde::{Deserialize, Deserializer};

/// A field of a partial update.
///
/// Distinguishes a key that was left out of the payload from one sent as
/// `null`. Fields using it need `#[serde(default)]` so that absence
/// deserializes to [`Patch::Missing`].
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Key absent: leave the stored value alone
    Missing,
    /// Key present as `null`: clear the stored value
    Null,
    /// Key present with a value: overwrite
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Update {
        #[serde(default)]
        notes: Patch<String>,
    }

    #[test]
    fn test_absent_key_is_missing() {
        let update: Update = serde_json::from_str("{}").unwrap();
        assert_eq!(update.notes, Patch::Missing);
    }

    #[test]
    fn test_null_key_is_null() {
        let update: Update = serde_json::from_str(r#"{"notes":null}"#).unwrap();
        assert_eq!(update.notes, Patch::Null);
        assert!(!update.notes.is_missing());
    }

    #[test]
    fn test_value_key_is_value() {
        let update: Update = serde_json::from_str(r#"{"notes":"re-fret"}"#).unwrap();
        assert_eq!(update.notes, Patch::Value("re-fret".to_string()));
    }
}
