//! Quill Document Types
//!
//! Core data types for document storage: the attribute value enum and the
//! schemaless, insertion-ordered document.
//!
//! @version 0.1.0
//! @author Quill Development Team

use indexmap::IndexMap;
use quill_common::{QuillError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Value
// =============================================================================

/// A document attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[derive(Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Document),
}

impl Value {
    /// Shared absent-attribute sentinel.
    pub fn null() -> &'static Value {
        static NULL: Value = Value::Null;
        &NULL
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Object(doc) => Some(doc),
            _ => None,
        }
    }

    /// Natural ordering across comparable types: numeric compare for
    /// numbers (crossing int/float), lexicographic for strings. Returns
    /// `None` for incomparable pairs instead of panicking.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            _ => None,
        }
    }

    /// Convert from serde_json::Value.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(arr) => Self::Array(arr.into_iter().map(Self::from_json).collect()),
            JsonValue::Object(obj) => {
                let attrs = obj
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect();
                Self::Object(Document { attrs })
            }
        }
    }

    /// Convert to serde_json::Value.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(n) => JsonValue::Number((*n).into()),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Array(arr) => JsonValue::Array(arr.iter().map(|v| v.to_json()).collect()),
            Self::Object(doc) => doc.to_json(),
        }
    }
}

/// Literal rendering, used by the query compiler's canonical keys.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            // Floats always carry a decimal point so an integral float
            // never renders identically to an int literal.
            Self::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Self::String(s) => write!(f, "{:?}", s),
            Self::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Self::Object(doc) => {
                write!(f, "{{")?;
                for (i, (k, v)) in doc.attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Self::Array(arr)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Self::Object(doc)
    }
}

// =============================================================================
// Document
// =============================================================================

/// A schemaless document: an insertion-ordered attribute bag.
///
/// Documents carry no identifier of their own; identity at the core level
/// is membership in a store. Attribute access by name is dynamic: unknown
/// names read as absent, never as an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    attrs: IndexMap<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from attribute pairs, preserving their order.
    pub fn from_attrs<K, V, I>(attrs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Build a document from a value. Fails fast unless the input is a
    /// structured mapping or null (which yields an empty document).
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(doc) => Ok(doc),
            Value::Null => Ok(Self::new()),
            other => Err(QuillError::InvalidDocument(format!(
                "expected a mapping, got {}",
                other
            ))),
        }
    }

    /// Build a document from JSON. Same construction contract as
    /// [`Document::from_value`].
    pub fn from_json(json: JsonValue) -> Result<Self> {
        Self::from_value(Value::from_json(json))
    }

    /// Convert to JSON.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Get an attribute, or `None` when absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Get an attribute, reading absent names as the null sentinel.
    /// Comparisons against missing attributes go through here so map
    /// transforms never fail on heterogeneous documents.
    pub fn get_or_null(&self, name: &str) -> &Value {
        self.attrs.get(name).unwrap_or(Value::null())
    }

    /// Set an attribute. Overwriting keeps the attribute's original
    /// position in the insertion order.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Check whether an attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Attribute names in insertion order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    /// Iterate attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Read the kind discriminator from the given attribute.
    pub fn kind(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_order_preserved() {
        let mut doc = Document::new();
        doc.set("zeta", 1i64);
        doc.set("alpha", 2i64);
        doc.set("mid", 3i64);
        doc.set("alpha", 4i64); // overwrite keeps position

        let names: Vec<&str> = doc.attribute_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(doc.get("alpha").and_then(Value::as_i64), Some(4));
    }

    #[test]
    fn test_absent_reads_as_null() {
        let doc = Document::new();
        assert!(doc.get("missing").is_none());
        assert!(doc.get_or_null("missing").is_null());
    }

    #[test]
    fn test_from_value_rejects_scalars() {
        assert!(Document::from_value(Value::Int(7)).is_err());
        assert!(Document::from_value(Value::String("x".into())).is_err());
        assert!(Document::from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"first_name": "liz", "age": 22});
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.get("first_name").and_then(Value::as_str), Some("liz"));
        assert_eq!(doc.get("age").and_then(Value::as_i64), Some(22));

        assert!(Document::from_json(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_compare() {
        use std::cmp::Ordering;

        assert_eq!(Value::Int(2).compare(&Value::Int(3)), Some(Ordering::Less));
        assert_eq!(
            Value::Int(2).compare(&Value::Float(1.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::from("adams").compare(&Value::from("brown")),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(Value::from("van").to_string(), "\"van\"");
        assert_eq!(Value::Int(22).to_string(), "22");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "[1, 2]"
        );
    }

    #[test]
    fn test_display_distinguishes_float_from_int() {
        // Int(22) and Float(22.0) never compare equal, so they must not
        // render to the same literal either.
        assert_eq!(Value::Float(22.0).to_string(), "22.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_ne!(Value::Int(22).to_string(), Value::Float(22.0).to_string());
    }

    #[test]
    fn test_kind() {
        let doc = Document::from_attrs([("doctype", "user"), ("name", "pete")]);
        assert_eq!(doc.kind("doctype"), Some("user"));
        assert_eq!(doc.kind("clazz"), None);
    }
}
