//! Quill Common - Shared Types
//!
//! Error and configuration types shared by all Quill crates.
//!
//! @version 0.1.0
//! @author Quill Development Team

pub mod config;
pub mod error;

pub use config::StoreConfig;
pub use error::{QuillError, Result};
