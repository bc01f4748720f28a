//! Matcher for test operations
//!
//! A test operation carries a literal `value`, a `valueMatcher` pattern, or
//! both. The condition is resolved once, then checked against the observed
//! field of the live resource.

use super::error::{ApplyError, Result};
use super::model::ValueMatcher;
use regex::Regex;
use serde_json::Value;

/// Resolved condition of a test operation
#[derive(Debug, Clone)]
pub enum TestCondition {
    Literal(String),
    Pattern(Regex),
    /// Both checks must hold
    LiteralAndPattern(String, Regex),
}

impl TestCondition {
    /// Resolve the `value` / `valueMatcher` pair of an operation.
    ///
    /// An absent check is no constraint. Neither being present is an error.
    pub fn resolve(
        path: &str,
        value: Option<&Value>,
        value_matcher: Option<&ValueMatcher>,
    ) -> Result<Self> {
        let literal = value.map(expect_string).transpose()?;
        let pattern = value_matcher
            .map(|m| compile_anchored(&m.matches_pattern))
            .transpose()?;

        match (literal, pattern) {
            (Some(literal), Some(pattern)) => Ok(Self::LiteralAndPattern(literal, pattern)),
            (Some(literal), None) => Ok(Self::Literal(literal)),
            (None, Some(pattern)) => Ok(Self::Pattern(pattern)),
            (None, None) => Err(ApplyError::MissingCondition {
                path: path.to_string(),
            }),
        }
    }

    pub fn matches(&self, observed: &str) -> bool {
        match self {
            Self::Literal(expected) => observed == expected,
            Self::Pattern(re) => re.is_match(observed),
            Self::LiteralAndPattern(expected, re) => observed == expected && re.is_match(observed),
        }
    }
}

impl std::fmt::Display for TestCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(expected) => write!(f, "== {:?}", expected),
            Self::Pattern(re) => write!(f, "=~ {}", re.as_str()),
            Self::LiteralAndPattern(expected, re) => {
                write!(f, "== {:?} and =~ {}", expected, re.as_str())
            }
        }
    }
}

/// Read an operation value that must be a JSON string
pub fn expect_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(ApplyError::ValueType {
            found: json_type_name(other),
        }),
    }
}

/// Compile `pattern` so that it must match the whole observed string.
///
/// The pattern is validated alone first: an unbalanced `)` would otherwise
/// close the wrapping group and leave an alternative unanchored.
pub fn compile_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)?;
    Ok(Regex::new(&format!("^(?:{})$", pattern))?)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
