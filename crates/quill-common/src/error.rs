//! Quill Error - Unified Error Types
//!
//! Error handling for all Quill operations. Every core failure is a local,
//! synchronous error raised at the call that triggered it; a query either
//! fully evaluates or fails before producing any rows.
//!
//! Key Features:
//! - "View not found" distinct from an empty result set
//! - Fail-fast document construction errors
//! - User vs system error classification
//! - Seamless integration with std::io::Error
//!
//! @version 0.1.0
//! @author Quill Development Team

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Unified error type for all Quill operations.
#[derive(Error, Debug)]
pub enum QuillError {
    /// No view is registered under the given name. Returned instead of an
    /// empty result so callers can tell "no matches" from "no such query".
    #[error("view not found: {0}")]
    ViewNotFound(String),

    /// A document was constructed from an input that is neither a
    /// structured mapping nor empty.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A pattern condition failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for Quill operations.
pub type Result<T> = std::result::Result<T, QuillError>;

// =============================================================================
// Error Classification
// =============================================================================

impl QuillError {
    /// Returns true if this is a user error (vs system error).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            QuillError::ViewNotFound(_)
                | QuillError::InvalidDocument(_)
                | QuillError::InvalidPattern(_)
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
