//! Filter conditions evaluated by find operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lookup_path;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Substring match.
    Like,
    /// Case-insensitive substring match.
    ILike,
    /// List membership.
    In,
    /// Field is absent or null.
    IsNull,
    /// Field is present and not null.
    IsNotNull,
}

/// A dynamic filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A list of string values (for `In`).
    StringList(Vec<String>),
    /// No value (for `IsNull`, `IsNotNull`).
    Null,
}

/// A single filter condition on a dotted field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// The field path to filter on, e.g. `metadata.name`.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Eq, FilterValue::String(value.into()))
    }

    /// Shorthand for a case-insensitive substring filter.
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOp::ILike, FilterValue::String(pattern.into()))
    }

    /// Evaluates this condition against a JSON document.
    pub fn matches(&self, document: &Value) -> bool {
        let actual = lookup_path(document, &self.field).filter(|v| !v.is_null());

        match self.op {
            FilterOp::IsNull => actual.is_none(),
            FilterOp::IsNotNull => actual.is_some(),
            FilterOp::In => match (&self.value, actual.and_then(Value::as_str)) {
                (FilterValue::StringList(options), Some(s)) => options.iter().any(|o| o == s),
                _ => false,
            },
            FilterOp::Like | FilterOp::ILike => {
                let (Some(haystack), FilterValue::String(needle)) =
                    (actual.and_then(Value::as_str), &self.value)
                else {
                    return false;
                };
                if self.op == FilterOp::ILike {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                } else {
                    haystack.contains(needle.as_str())
                }
            }
            FilterOp::Eq => actual.is_some_and(|v| self.value.equals(v)),
            FilterOp::Ne => !actual.is_some_and(|v| self.value.equals(v)),
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                let Some(ordering) = actual.and_then(|v| self.value.compare(v)) else {
                    return false;
                };
                match self.op {
                    FilterOp::Gt => ordering.is_gt(),
                    FilterOp::Gte => ordering.is_ge(),
                    FilterOp::Lt => ordering.is_lt(),
                    _ => ordering.is_le(),
                }
            }
        }
    }
}

impl FilterValue {
    fn equals(&self, actual: &Value) -> bool {
        match self {
            Self::String(s) => actual.as_str() == Some(s.as_str()),
            Self::Integer(i) => actual.as_i64() == Some(*i),
            Self::Float(f) => actual.as_f64() == Some(*f),
            Self::Boolean(b) => actual.as_bool() == Some(*b),
            Self::StringList(_) | Self::Null => false,
        }
    }

    /// Orders the document value relative to this filter value.
    fn compare(&self, actual: &Value) -> Option<std::cmp::Ordering> {
        match self {
            Self::String(s) => actual.as_str().map(|a| a.cmp(s.as_str())),
            Self::Integer(i) => actual.as_f64().and_then(|a| a.partial_cmp(&(*i as f64))),
            Self::Float(f) => actual.as_f64().and_then(|a| a.partial_cmp(f)),
            Self::Boolean(_) | Self::StringList(_) | Self::Null => None,
        }
    }
}
