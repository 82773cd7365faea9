//! Quill View
//!
//! A view is a named pair of transforms registered against a store: a map
//! transform applied to every document, and an optional reduce transform
//! aggregating the surviving map results. Views are definitions only; every
//! evaluation re-runs the full map pass over the current document sequence.
//!
//! @version 0.1.0
//! @author Quill Development Team

use crate::types::{Document, Value};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Transform Types
// =============================================================================

/// Map transform: derives a value from a document, or `None` to exclude it.
/// Receives the per-query argument passed to `evaluate`. Must be a pure
/// function of its inputs; it must not mutate the store.
pub type MapFn = Arc<dyn Fn(&Document, Option<&Value>) -> Option<Value> + Send + Sync>;

/// Reduce transform: aggregates the ordered sequence of non-excluded map
/// results into a single value. The aggregate type is unconstrained.
pub type ReduceFn = Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>;

// =============================================================================
// View
// =============================================================================

/// A named (map transform, optional reduce transform) pair.
pub struct View {
    name: String,
    map: MapFn,
    reduce: Option<ReduceFn>,
}

impl View {
    /// Create a view definition.
    pub fn new(name: impl Into<String>, map: MapFn, reduce: Option<ReduceFn>) -> Self {
        Self {
            name: name.into(),
            map,
            reduce,
        }
    }

    /// The view's registry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_reduce(&self) -> bool {
        self.reduce.is_some()
    }

    /// Run the map transform over a document sequence, collecting
    /// non-excluded results in sequence order, then apply reduce if
    /// present. Without a reduce, yields `Value::Array` of the map results.
    pub fn evaluate(&self, documents: &[Document], arg: Option<&Value>) -> Value {
        let rows: Vec<Value> = documents
            .iter()
            .filter_map(|doc| (self.map)(doc, arg))
            .collect();

        match &self.reduce {
            Some(reduce) => reduce(rows),
            None => Value::Array(rows),
        }
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("has_reduce", &self.reduce.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
