//! Row model: flat records supplied by the host

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell value.
///
/// Hosts deliver identifiers as text or numbers interchangeably, so
/// comparisons always go through [`Scalar::canonical`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Null and the empty string count as "no value".
    pub fn is_empty(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Canonical string form used for identity comparisons and labels.
    ///
    /// Integral floats print without a fraction so that `3` and `3.0`
    /// resolve to the same node.
    pub fn canonical(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", *f as i64)
                } else {
                    f.to_string()
                }
            }
            Scalar::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// One record of the relationship table: field name → value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Scalar>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Scalar>) {
        self.0.insert(field.into(), value.into());
    }

    /// Value of `field`, `Null` when the row does not carry it.
    pub fn value(&self, field: &str) -> &Scalar {
        static NULL: Scalar = Scalar::Null;
        self.0.get(field).unwrap_or(&NULL)
    }

    /// Canonical string of `field`, empty when missing.
    pub fn text(&self, field: &str) -> String {
        self.value(field).canonical()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<Scalar>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// The three configured field names that give rows their tree meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelectors {
    pub id: String,
    pub parent: String,
    pub label: String,
}

impl FieldSelectors {
    pub fn new(id: impl Into<String>, parent: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: parent.into(),
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_integral_float_when_canonical_then_drops_fraction() {
        assert_eq!(Scalar::Float(3.0).canonical(), "3");
        assert_eq!(Scalar::Integer(3).canonical(), "3");
        assert_eq!(Scalar::Float(2.5).canonical(), "2.5");
    }

    #[test]
    fn given_null_or_empty_text_when_checking_then_is_empty() {
        assert!(Scalar::Null.is_empty());
        assert!(Scalar::from("").is_empty());
        assert!(!Scalar::from(" ").is_empty());
        assert!(!Scalar::Integer(0).is_empty());
        assert!(!Scalar::Bool(false).is_empty());
    }

    #[test]
    fn given_missing_field_when_reading_then_returns_null() {
        let row: Row = [("id", "A")].into_iter().collect();
        assert_eq!(row.value("parent"), &Scalar::Null);
        assert_eq!(row.text("parent"), "");
        assert_eq!(row.text("id"), "A");
    }

    #[test]
    fn given_json_object_when_deserializing_then_keeps_scalar_kinds() {
        let row: Row =
            serde_json::from_str(r#"{"id": 7, "parent": null, "label": "Seven", "w": 1.5}"#)
                .expect("parse row");
        assert_eq!(row.value("id"), &Scalar::Integer(7));
        assert_eq!(row.value("parent"), &Scalar::Null);
        assert_eq!(row.value("label"), &Scalar::from("Seven"));
        assert_eq!(row.value("w"), &Scalar::Float(1.5));
    }
}
