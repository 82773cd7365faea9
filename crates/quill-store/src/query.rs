//! Quill Query Options
//!
//! Declarative match specs and the options bag consumed by the query
//! compiler: per-attribute conditions (equality, pattern, inclusive range,
//! set membership) plus an ascending sort order.
//!
//! @version 0.1.0
//! @author Quill Development Team

use crate::types::Value;
use quill_common::{QuillError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Matcher
// =============================================================================

/// A match spec evaluated against a single document attribute. Absent
/// attributes are compared as [`Value::Null`]; no matcher ever errors at
/// match time.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Exact equality against a literal value.
    Equals(Value),
    /// Regular-expression match; only string attributes can match.
    Pattern(Regex),
    /// Inclusive range over the value's natural ordering.
    Between(Value, Value),
    /// Membership in a literal set.
    OneOf(Vec<Value>),
    /// Always matches. The explicit spelling of a no-op condition.
    Any,
}

impl Matcher {
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Equals(value.into())
    }

    /// Compile a pattern matcher, failing fast on an invalid expression.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| QuillError::InvalidPattern(e.to_string()))
    }

    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::Between(low.into(), high.into())
    }

    pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Evaluate this spec against an attribute value.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Equals(expected) => value == expected,
            Self::Pattern(regex) => value
                .as_str()
                .map(|s| regex.is_match(s))
                .unwrap_or(false),
            Self::Between(low, high) => {
                let above = matches!(
                    value.compare(low),
                    Some(Ordering::Greater | Ordering::Equal)
                );
                let below = matches!(value.compare(high), Some(Ordering::Less | Ordering::Equal));
                above && below
            }
            Self::OneOf(values) => values.contains(value),
            Self::Any => true,
        }
    }
}

/// Literal rendering, used by the query compiler's canonical keys.
impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(value) => write!(f, "{}", value),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
            Self::Between(low, high) => write!(f, "{}..{}", low, high),
            // Rendered with an `in` prefix so set membership never
            // collides with equality against an array literal.
            Self::OneOf(values) => {
                write!(f, "in [")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Self::Any => write!(f, "*"),
        }
    }
}

// =============================================================================
// Query Options
// =============================================================================

/// Declarative query options: conditions in the order supplied by the
/// caller (the order participates in the canonical key and fixes the
/// short-circuit evaluation order) and an optional ascending sort.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    conditions: Vec<(String, Matcher)>,
    order: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition on an attribute.
    pub fn condition(mut self, attribute: impl Into<String>, matcher: Matcher) -> Self {
        self.conditions.push((attribute.into(), matcher));
        self
    }

    /// Sort by a single attribute name or a comma-separated ordered list
    /// of attribute names, ascending.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn conditions(&self) -> &[(String, Matcher)] {
        &self.conditions
    }

    pub fn order_spec(&self) -> Option<&str> {
        self.order.as_deref()
    }

    /// The order spec split into attribute names.
    pub fn order_fields(&self) -> Vec<String> {
        match &self.order {
            None => Vec::new(),
            Some(spec) => spec
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.order.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================
