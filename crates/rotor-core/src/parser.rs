//! Boundary to the natural-language condition parser.
//!
//! The parser is an external collaborator (an LLM behind HTTP in
//! production). The core only consumes its output: a [`ParsedCondition`] or
//! a [`ParseFailure`] that becomes a `failed` condition.

use crate::condition::ConditionSpec;
use crate::row::Row;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCondition {
    pub spec: ConditionSpec,
    pub assistant_message: String,
}

/// Expected, non-exceptional parser outcome: the text was ambiguous, asked
/// for something unsupported, or the upstream service was unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub reason: String,
}

impl ParseFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ParseFailure {}

/// Turns free text plus the current row into a structured comparison.
///
/// Implementations may block on the network; callers must not hold any
/// engine lock across `parse`.
#[async_trait]
pub trait ConditionParser: Send + Sync {
    async fn parse(&self, message: &str, row: &Row) -> Result<ParsedCondition, ParseFailure>;
}
