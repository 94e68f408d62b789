//! Field selection for search indexes.
//!
//! Callers may name a single field or a list of fields when declaring an index.
//! Both forms normalize to an ordered list.

use serde::{Deserialize, Serialize};

/// Ordered list of field identifiers an index searches over.
///
/// Deserializes from either a string or an array of strings and always
/// serializes as an array.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawFieldSelection")]
pub struct FieldSelection(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldSelection {
    One(String),
    Many(Vec<String>),
}

impl From<RawFieldSelection> for FieldSelection {
    fn from(raw: RawFieldSelection) -> Self {
        match raw {
            RawFieldSelection::One(field) => Self(vec![field]),
            RawFieldSelection::Many(fields) => Self(fields),
        }
    }
}

impl FieldSelection {
    /// Borrow the normalized field list.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consume the selection, returning the normalized field list.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for FieldSelection {
    fn from(field: &str) -> Self {
        Self(vec![field.to_string()])
    }
}

impl From<String> for FieldSelection {
    fn from(field: String) -> Self {
        Self(vec![field])
    }
}

impl From<Vec<String>> for FieldSelection {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl From<Vec<&str>> for FieldSelection {
    fn from(fields: Vec<&str>) -> Self {
        Self(fields.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldSelection {
    fn from(fields: [&str; N]) -> Self {
        Self(fields.iter().map(|f| f.to_string()).collect())
    }
}
