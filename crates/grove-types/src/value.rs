use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Comparison operator applied between a stored value and a probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOperator {
    Equals,
    NotEquals,
    Greater,
    Lesser,
}

/// The declared kind of a literal field, used to parse stored lexical
/// forms back into typed values on hydration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    String,
    Integer,
    Double,
    Boolean,
    Date,
    Uri,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Uri => "uri",
        };
        f.write_str(name)
    }
}

/// A typed literal carried on a graph edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Uri(String),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Integer(_) => ValueKind::Integer,
            Self::Double(_) => ValueKind::Double,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Date(_) => ValueKind::Date,
            Self::Uri(_) => ValueKind::Uri,
        }
    }

    /// Lexical form stored in the graph.
    pub fn render(&self) -> String {
        match self {
            Self::String(s) | Self::Uri(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Double(d) => d.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Date(d) => d.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Parse a lexical form back into a typed value.
    pub fn parse_as(kind: ValueKind, text: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidLiteral {
            kind: kind.to_string(),
            text: text.to_string(),
        };
        match kind {
            ValueKind::String => Ok(Self::String(text.to_string())),
            ValueKind::Uri => Ok(Self::Uri(text.to_string())),
            ValueKind::Integer => text.parse().map(Self::Integer).map_err(|_| invalid()),
            ValueKind::Double => text.parse().map(Self::Double).map_err(|_| invalid()),
            ValueKind::Boolean => text.parse().map(Self::Boolean).map_err(|_| invalid()),
            ValueKind::Date => DateTime::parse_from_rfc3339(text)
                .map(|d| Self::Date(d.with_timezone(&Utc)))
                .map_err(|_| invalid()),
        }
    }

    /// Whether an empty value should be skipped on write (imitates the
    /// store treating absent and empty-string literals alike).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) | Self::Uri(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Evaluate `self <op> probe`.
    ///
    /// Values of different kinds never compare equal; ordering operators
    /// on mismatched kinds are always false.
    pub fn matches(&self, op: SearchOperator, probe: &Value) -> bool {
        match op {
            SearchOperator::Equals => self.same_as(probe),
            SearchOperator::NotEquals => !self.same_as(probe),
            SearchOperator::Greater => self.compare(probe).is_some_and(|o| o.is_gt()),
            SearchOperator::Lesser => self.compare(probe).is_some_and(|o| o.is_lt()),
        }
    }

    fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Double(a), Self::Double(b)) => (a - b).abs() < f64::EPSILON,
            (a, b) => a == b,
        }
    }

    fn compare(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Double(b)) => (*a as f64).partial_cmp(b),
            (Self::Double(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) | (Self::Uri(a), Self::Uri(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
