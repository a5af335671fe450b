//! Error types for the data-making pipeline

use thiserror::Error;

use crate::llm::LlmError;
use crate::schema::SchemaError;

/// Reasons an assembled field mapping cannot become a grounded object
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("Class '{class}' has no slot '{field}'")]
    UnknownField { class: String, field: String },

    #[error("Required slot '{field}' missing on class '{class}'")]
    MissingRequired { class: String, field: String },

    /// A list where a single value belongs, or the reverse
    #[error("Slot '{field}' on class '{class}' expects {expected}")]
    ShapeMismatch {
        class: String,
        field: String,
        expected: String,
    },

    #[error("Value '{value}' for slot '{field}' on class '{class}' is not a valid {range}")]
    TypeMismatch {
        class: String,
        field: String,
        range: String,
        value: String,
    },

    #[error("Value '{value}' is not permissible in enum '{range}' (slot '{field}')")]
    InvalidEnumValue {
        field: String,
        range: String,
        value: String,
    },
}

/// Errors that can occur while making data
#[derive(Error, Debug)]
pub enum DataMakerError {
    /// Schema lookup failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Completion provider failed; never retried here
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Object construction rejected the grounded fields
    #[error("Could not construct object: {0}")]
    Construction(#[from] ConstructionError),

    /// A required slot came back with an empty value
    #[error("Cannot have empty value for required slot '{slot}' (line: '{line}')")]
    MissingRequiredValue { slot: String, line: String },

    /// Nested objects went deeper than the configured limit
    #[error("Nested objects exceed maximum depth of {0}")]
    MaxDepthExceeded(usize),

    /// A stub field that the class does not declare
    #[error("Stub field '{field}' is not a slot of class '{class}'")]
    UnknownSlot { field: String, class: String },

    /// No class was named and the schema has no candidate
    #[error("Schema declares no class that can be generated")]
    NoTargetClass,
}

/// Result type for data-making operations
pub type DataMakerResult<T> = Result<T, DataMakerError>;
