use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// How a condition wants a cell interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
}

impl ValueType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
        }
    }
}

/// A cell resolved to a concrete type at comparison time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Resolve raw cell text as `ty`. Returns `None` when a number was
    /// requested and the text does not parse.
    pub fn coerce(raw: &str, ty: ValueType) -> Option<Self> {
        match ty {
            ValueType::Number => parse_number(raw).map(Self::Number),
            ValueType::String => Some(Self::Text(raw.to_string())),
        }
    }

    /// Ordering between two values of the same kind. Mixed kinds and NaN
    /// are unordered.
    pub fn partial_cmp_same(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Parse a numeric cell, tolerating surrounding whitespace and thousands
/// separators (`"22,150.35"`).
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
