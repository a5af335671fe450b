//! LinkML DataMaker - synthetic data generation from schemas
//!
//! Provides:
//! - Schema loading and introspection (classes, slots, enums, inheritance)
//! - Completion clients (OpenAI-compatible HTTP, in-memory mock)
//! - The data-making pipeline: prompt building, response parsing, grounding
//!   and validated object construction
//! - Result export (JSON, JSON Lines, YAML, Markdown)
//!
//! # Feature Flags
//!
//! - `llm-online` (default): HTTP requests in [`llm::OpenAiClient`]
//! - `cli`: the `datamaker` binary

pub mod engine;
pub mod export;
pub mod llm;
pub mod schema;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use engine::{
    DataMakerEngine, DataMakerError, DataMakerResult, EngineConfig, ExtractionResult, FieldValue,
    GroundedObject, LooseRecord, LooseValue, NamedEntity,
};
pub use export::{ExportError, OutputFormat};
pub use llm::{CompletionClient, LlmError, MockCompletionClient, OpenAiClient, OpenAiConfig};
pub use schema::{SchemaDefinition, SchemaError, SchemaLoader, SchemaView};
