//! Quill Store - Document Store Engine
//!
//! Embeddable, schemaless, in-memory document store queried through named,
//! user-defined views, with a query compiler that turns declarative
//! filter/sort options into automatically generated, cached views.
//!
//! Key Features:
//! - Insertion-ordered, schemaless documents
//! - Named map/reduce views evaluated live on every query
//! - Declarative conditions (equality, pattern, range, set) with
//!   multi-key stable sorting
//! - ORM-style record façade over a shared store
//!
//! @version 0.1.0
//! @author Quill Development Team

pub mod compiler;
pub mod query;
pub mod record;
pub mod store;
pub mod types;
pub mod view;

pub use compiler::QueryCompiler;
pub use query::{Matcher, QueryOptions};
pub use record::{Record, RecordType};
pub use store::Store;
pub use types::{Document, Value};
pub use view::{MapFn, ReduceFn, View};

pub use quill_common::{QuillError, Result, StoreConfig};
