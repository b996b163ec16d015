use crate::parser::ParseFailure;
use crate::row::Row;
use crate::value::{Value, ValueType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "starts_with")]
    StartsWith,
    #[serde(rename = "ends_with")]
    EndsWith,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim() {
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::Ge,
            "<=" => Self::Le,
            "==" | "=" => Self::Eq,
            "!=" => Self::Ne,
            "contains" => Self::Contains,
            "starts_with" => Self::StartsWith,
            "ends_with" => Self::EndsWith,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Contains => "contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
        }
    }

    fn apply(self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Contains | Self::StartsWith | Self::EndsWith => {
                let (l, r) = (text_of(left).to_lowercase(), text_of(right).to_lowercase());
                match self {
                    Self::Contains => l.contains(&r),
                    Self::StartsWith => l.starts_with(&r),
                    _ => l.ends_with(&r),
                }
            }
            _ => {
                let Some(ord) = left.partial_cmp_same(right) else {
                    return matches!(self, Self::Ne) && left != right;
                };
                match self {
                    Self::Gt => ord == Ordering::Greater,
                    Self::Lt => ord == Ordering::Less,
                    Self::Ge => ord != Ordering::Less,
                    Self::Le => ord != Ordering::Greater,
                    Self::Eq => ord == Ordering::Equal,
                    _ => ord != Ordering::Equal,
                }
            }
        }
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Text(s) => s.clone(),
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConditionSpec
// ---------------------------------------------------------------------------

/// Why a single comparison could not be made. Never escalated: the
/// condition simply stays pending.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparisonError {
    #[error("field '{0}' is not present in the row")]
    MissingField(String),

    #[error("'{raw}' is not a number")]
    NotNumeric { raw: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub field: String,
    pub operator: Operator,
    pub value: String,
    pub value_type: ValueType,
}

impl ConditionSpec {
    /// Normalize loosely-typed parser output into a spec.
    pub fn from_raw(
        field: &str,
        operator: &str,
        value: &str,
        value_type: &str,
    ) -> Result<Self, ParseFailure> {
        let field = field.trim();
        if field.is_empty() {
            return Err(ParseFailure::new("parsed condition has no field"));
        }
        let operator = Operator::parse(operator)
            .ok_or_else(|| ParseFailure::new(format!("unsupported operator '{operator}'")))?;
        let value_type = ValueType::parse(value_type)
            .ok_or_else(|| ParseFailure::new(format!("unsupported value type '{value_type}'")))?;
        // String values are compared exactly as given.
        let value = match value_type {
            ValueType::Number => value.trim(),
            ValueType::String => value,
        };
        Ok(Self {
            field: field.to_string(),
            operator,
            value: value.to_string(),
            value_type,
        })
    }

    /// Compare `row[field]` against the spec's value.
    ///
    /// Returns `Ok(false)` for a clean non-match and `Err` when the
    /// comparison could not be made at all.
    pub fn evaluate(&self, row: &Row) -> Result<bool, ComparisonError> {
        let raw = row
            .get(&self.field)
            .ok_or_else(|| ComparisonError::MissingField(self.field.clone()))?;
        let left = Value::coerce(raw, self.value_type).ok_or_else(|| ComparisonError::NotNumeric {
            raw: raw.to_string(),
        })?;
        let right =
            Value::coerce(&self.value, self.value_type).ok_or_else(|| ComparisonError::NotNumeric {
                raw: self.value.clone(),
            })?;
        Ok(self.operator.apply(&left, &right))
    }
}

impl fmt::Display for ConditionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.field, self.operator, self.value, self.value_type
        )
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// Lifecycle: `Pending → Triggered` or `Pending → Failed`. Both targets
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionStatus {
    Pending,
    Triggered,
    Failed,
}

impl ConditionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Triggered => "triggered",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: Uuid,
    pub message: String,
    pub status: ConditionStatus,
    pub command_time: DateTime<Utc>,
    pub parsed_time: DateTime<Utc>,
    pub last_checked_time: DateTime<Utc>,
    pub triggered_time: Option<DateTime<Utc>>,
    pub assistant_message: String,
    pub spec: Option<ConditionSpec>,
    #[serde(default)]
    pub matched_row_index: Option<usize>,
    #[serde(default)]
    pub matched_row: Option<Row>,
}

impl Condition {
    pub fn is_pending(&self) -> bool {
        self.status == ConditionStatus::Pending
    }

    /// Evaluate a pending condition against `row` at `now`.
    ///
    /// Terminal conditions are left untouched. Returns `Ok(true)` when this
    /// call moved the condition to `Triggered`.
    pub fn check(
        &mut self,
        row: &Row,
        row_index: usize,
        now: DateTime<Utc>,
    ) -> Result<bool, ComparisonError> {
        if !self.is_pending() {
            return Ok(false);
        }
        self.last_checked_time = now;
        let Some(spec) = &self.spec else {
            return Ok(false);
        };
        if !spec.evaluate(row)? {
            return Ok(false);
        }
        self.status = ConditionStatus::Triggered;
        self.triggered_time = Some(now);
        self.matched_row_index = Some(row_index);
        self.matched_row = Some(row.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(field: &str, op: &str, value: &str, ty: &str) -> ConditionSpec {
        ConditionSpec::from_raw(field, op, value, ty).unwrap()
    }

    fn row(close: &str) -> Row {
        Row::from_pairs([("Date", "2024-01-02"), ("Close", close)])
    }

    fn pending(spec: ConditionSpec) -> Condition {
        let now = Utc::now();
        Condition {
            id: Uuid::new_v4(),
            message: "alert me".into(),
            status: ConditionStatus::Pending,
            command_time: now,
            parsed_time: now,
            last_checked_time: now,
            triggered_time: None,
            assistant_message: "ok".into(),
            spec: Some(spec),
            matched_row_index: None,
            matched_row: None,
        }
    }

    #[test]
    fn numeric_greater_than() {
        let s = spec("Close", ">", "100", "number");
        assert_eq!(s.evaluate(&row("150")), Ok(true));
        assert_eq!(s.evaluate(&row("50")), Ok(false));
        assert_eq!(s.evaluate(&row("100")), Ok(false));
    }

    #[test]
    fn numeric_with_separators() {
        let s = spec("Close", ">=", "21,600", "number");
        assert_eq!(s.evaluate(&row("21,665.80")), Ok(true));
    }

    #[test]
    fn every_comparison_operator() {
        let r = row("10");
        let cases = [
            ("<", "11", true),
            ("<=", "10", true),
            ("==", "10.0", true),
            ("!=", "10", false),
            (">", "9.5", true),
            (">=", "11", false),
        ];
        for (op, value, expected) in cases {
            assert_eq!(
                spec("Close", op, value, "number").evaluate(&r),
                Ok(expected),
                "Close {op} {value}"
            );
        }
    }

    #[test]
    fn string_operators_are_case_insensitive() {
        let r = Row::from_pairs([("Symbol", "NIFTY 50")]);
        assert_eq!(spec("Symbol", "contains", "nifty", "string").evaluate(&r), Ok(true));
        assert_eq!(spec("Symbol", "starts_with", "NIF", "string").evaluate(&r), Ok(true));
        assert_eq!(spec("Symbol", "ends_with", "51", "string").evaluate(&r), Ok(false));
        assert_eq!(spec("Symbol", "==", "NIFTY 50", "string").evaluate(&r), Ok(true));
    }

    #[test]
    fn missing_field_is_comparison_error() {
        let s = spec("Volume", ">", "1", "number");
        assert_eq!(
            s.evaluate(&row("1")),
            Err(ComparisonError::MissingField("Volume".into()))
        );
    }

    #[test]
    fn non_numeric_cell_is_comparison_error() {
        let s = spec("Close", ">", "1", "number");
        assert!(matches!(
            s.evaluate(&row("n/a")),
            Err(ComparisonError::NotNumeric { .. })
        ));
    }

    #[test]
    fn from_raw_keeps_string_values_verbatim() {
        let s = spec("Date", "==", " 2024-01-02", "string");
        assert_eq!(s.value, " 2024-01-02");
        assert_eq!(s.evaluate(&row("1")), Ok(false));
        assert_eq!(spec("Close", ">", " 100 ", "number").value, "100");
    }

    #[test]
    fn from_raw_rejects_unknown_operator_and_type() {
        assert!(ConditionSpec::from_raw("Close", "~=", "1", "number").is_err());
        assert!(ConditionSpec::from_raw("Close", ">", "1", "date").is_err());
        assert!(ConditionSpec::from_raw("  ", ">", "1", "number").is_err());
    }

    #[test]
    fn operator_serializes_as_symbol() {
        let s = spec("Close", ">=", "1", "number");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["operator"], ">=");
        assert_eq!(json["value_type"], "number");
    }

    #[test]
    fn check_triggers_and_records_match() {
        let mut c = pending(spec("Close", ">", "100", "number"));
        let now = Utc::now();
        assert_eq!(c.check(&row("150"), 7, now), Ok(true));
        assert_eq!(c.status, ConditionStatus::Triggered);
        assert_eq!(c.triggered_time, Some(now));
        assert_eq!(c.matched_row_index, Some(7));
        assert_eq!(c.matched_row.as_ref().unwrap().get("Close"), Some("150"));
    }

    #[test]
    fn check_is_inert_once_terminal() {
        let mut c = pending(spec("Close", ">", "100", "number"));
        let first = Utc::now();
        c.check(&row("150"), 1, first).unwrap();
        let frozen = c.clone();
        let later = first + chrono::Duration::seconds(60);
        assert_eq!(c.check(&row("500"), 2, later), Ok(false));
        assert_eq!(c, frozen);
    }

    #[test]
    fn check_updates_last_checked_on_missing_field() {
        let mut c = pending(spec("Volume", ">", "1", "number"));
        let later = c.last_checked_time + chrono::Duration::seconds(5);
        assert!(c.check(&row("1"), 0, later).is_err());
        assert_eq!(c.last_checked_time, later);
        assert!(c.is_pending());
    }
}
