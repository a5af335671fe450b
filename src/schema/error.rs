//! Error types for schema loading and introspection

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or querying a schema
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Failed to read schema file
    #[error("Failed to read schema file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse schema document
    #[error("Failed to parse schema: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Structurally invalid schema (dangling references, cycles)
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Class not defined in the schema
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// Slot not reachable from the given class
    #[error("Slot '{slot}' not found on class '{class}'")]
    SlotNotFound { slot: String, class: String },

    /// Enumeration not defined in the schema
    #[error("Enum not found: {0}")]
    EnumNotFound(String),
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
