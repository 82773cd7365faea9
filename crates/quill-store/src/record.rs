//! Quill Records
//!
//! ORM-style façade over the store: a record type binds a kind
//! discriminator to a store handle and answers `find` through the query
//! compiler; a record wraps a document with explicit attribute
//! delegation.
//!
//! @version 0.1.0
//! @author Quill Development Team

use crate::compiler::QueryCompiler;
use crate::query::QueryOptions;
use crate::store::Store;
use crate::types::{Document, Value};
use quill_common::Result;
use std::sync::Arc;

// =============================================================================
// Record
// =============================================================================

/// A typed record wrapping a document. Attribute access is explicit
/// delegation onto the underlying document.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    document: Document,
}

impl Record {
    /// Wrap a document returned from a query.
    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.document.get(name)
    }

    pub fn get_or_null(&self, name: &str) -> &Value {
        self.document.get_or_null(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.document.set(name, value);
    }
}

// =============================================================================
// Record Type
// =============================================================================

/// Handle for one record kind over a shared store. Holds its store handle
/// explicitly; there is no ambient global database.
#[derive(Clone)]
pub struct RecordType {
    name: String,
    store: Arc<Store>,
    compiler: QueryCompiler,
}

impl RecordType {
    /// Bind a record type to a store.
    pub fn bind(store: Arc<Store>, name: impl Into<String>) -> Self {
        let compiler = QueryCompiler::new(Arc::clone(&store));
        Self {
            name: name.into(),
            store,
            compiler,
        }
    }

    /// The kind discriminator value written into this type's documents.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a record tagged with this type's kind discriminator, without
    /// storing it.
    pub fn build<K, V, I>(&self, attrs: I) -> Record
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut document = Document::from_attrs(attrs);
        document.set(self.store.kind_field(), self.name.as_str());
        Record { document }
    }

    /// Build a record and append it to the store.
    pub fn create<K, V, I>(&self, attrs: I) -> Record
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let record = self.build(attrs);
        self.save(&record);
        record
    }

    /// Append the record's document to the store. Saving the same record
    /// twice appends two entries; there is no identity key at this layer.
    pub fn save(&self, record: &Record) {
        self.store.append(record.document.clone());
    }

    /// Set attributes on the record, then save it again (appending a new
    /// store entry, matching the append-only store contract).
    pub fn update_attributes<K, V, I>(&self, record: &mut Record, attrs: I)
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (name, value) in attrs {
            record.set(name, value);
        }
        self.save(record);
    }

    /// Find records of this kind matching the declarative options.
    pub fn find(&self, options: &QueryOptions) -> Result<Vec<Record>> {
        let documents = self.compiler.find(&self.name, options)?;
        Ok(documents.into_iter().map(Record::from_document).collect())
    }
}

// =============================================================================
// Tests
// =============================================================================
