//! Quill Store
//!
//! Append-only, in-memory collection of documents plus a registry of named
//! views. Insertion order of documents is significant: it fixes the result
//! order of every map pass.
//!
//! Concurrency model: copy-on-append snapshotting. `evaluate` clones the
//! document sequence under a short read lock and scans outside it, so a
//! scan sees exactly what existed at call start; appends made during a
//! long-running map/reduce pass are not visible to that call.
//!
//! @version 0.1.0
//! @author Quill Development Team

use crate::types::{Document, Value};
use crate::view::{MapFn, ReduceFn, View};
use parking_lot::RwLock;
use quill_common::{QuillError, Result, StoreConfig};
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Store
// =============================================================================

/// An in-memory document store with a view registry.
pub struct Store {
    config: StoreConfig,
    documents: RwLock<Vec<Document>>,
    views: RwLock<HashMap<String, Arc<View>>>,
}

impl Store {
    /// Create a store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a store with custom configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            documents: RwLock::new(Vec::new()),
            views: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Attribute holding each document's kind discriminator.
    pub fn kind_field(&self) -> &str {
        &self.config.kind_field
    }

    // -------------------------------------------------------------------------
    // Document Operations
    // -------------------------------------------------------------------------

    /// Append a document to the end of the sequence. There is no identity
    /// or dedup key at this layer: appending a logically identical document
    /// twice creates two distinct entries.
    pub fn append(&self, doc: Document) {
        let mut docs = self.documents.write();
        docs.push(doc);
        tracing::trace!(total = docs.len(), "document appended");
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Clone of the document sequence as of now, in insertion order.
    pub fn snapshot(&self) -> Vec<Document> {
        self.documents.read().clone()
    }

    // -------------------------------------------------------------------------
    // View Registry
    // -------------------------------------------------------------------------

    /// Register a view under a name. A name collision silently overwrites
    /// the registry entry: last writer wins.
    pub fn register_view(
        &self,
        name: impl Into<String>,
        map: MapFn,
        reduce: Option<ReduceFn>,
    ) -> Arc<View> {
        let name = name.into();
        let view = Arc::new(View::new(name.clone(), map, reduce));

        let mut views = self.views.write();
        if views.insert(name.clone(), Arc::clone(&view)).is_some() {
            tracing::debug!(view = %name, "replaced existing view");
        } else {
            tracing::debug!(view = %name, "registered view");
        }

        view
    }

    /// Look up a registered view by name.
    pub fn lookup_view(&self, name: &str) -> Option<Arc<View>> {
        self.views.read().get(name).cloned()
    }

    /// Names of all registered views, in no particular order.
    pub fn view_names(&self) -> Vec<String> {
        self.views.read().keys().cloned().collect()
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    /// Evaluate a view by name against the documents present at call time.
    ///
    /// Runs the map transform over a snapshot of the sequence, collecting
    /// non-excluded results in document order, then applies the reduce
    /// transform if the view has one. Nothing is cached across calls: each
    /// call re-runs the full pass. Fails with [`QuillError::ViewNotFound`]
    /// for an unknown name so callers can tell "no matches" from "no such
    /// query".
    pub fn evaluate(&self, name: &str, arg: Option<&Value>) -> Result<Value> {
        let view = self
            .lookup_view(name)
            .ok_or_else(|| QuillError::ViewNotFound(name.to_string()))?;

        let snapshot = self.snapshot();
        Ok(view.evaluate(&snapshot, arg))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
