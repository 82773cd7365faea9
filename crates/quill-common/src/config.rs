//! Quill Config - Configuration Structures
//!
//! Configuration for the document store. Supports TOML files and
//! programmatic construction, with sensible defaults for embedding.
//!
//! @version 0.1.0
//! @author Quill Development Team

use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Store Configuration
// =============================================================================

/// Configuration for a document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Attribute holding each document's kind discriminator. Higher-level
    /// filters use it to distinguish record types sharing one store.
    pub kind_field: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind_field: "doctype".to_string(),
        }
    }
}

impl StoreConfig {
    /// Create a configuration with a custom kind discriminator attribute.
    pub fn with_kind_field(kind_field: impl Into<String>) -> Self {
        Self {
            kind_field: kind_field.into(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::QuillError::Configuration(e.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.kind_field, "doctype");
    }

    #[test]
    fn test_custom_kind_field() {
        let config = StoreConfig::with_kind_field("clazz");
        assert_eq!(config.kind_field, "clazz");
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = StoreConfig::with_kind_field("clazz");
        let text = toml::to_string(&config).unwrap();
        let parsed: StoreConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.kind_field, "clazz");
    }
}
