//! Synthetic data generation pipeline
//!
//! The pipeline, in call order:
//!
//! 1. [`PromptBuilder`] lists the promptable slots of a class as a
//!    `field: <hint>` template
//! 2. a [`CompletionClient`](crate::llm::CompletionClient) answers it
//! 3. [`ResponseParser`] reads the answer into a [`LooseRecord`]
//! 4. [`Grounder`] fills identifiers, normalizes entities, matches enums and
//!    recurses into nested objects
//! 5. an [`ObjectConstructor`] validates the result as a [`GroundedObject`]
//!
//! [`DataMakerEngine`] runs all of it and returns an [`ExtractionResult`].
//!
//! # Example
//!
//! ```rust
//! use linkml_datamaker::engine::DataMakerEngine;
//! use linkml_datamaker::llm::MockCompletionClient;
//! use linkml_datamaker::schema::SchemaLoader;
//!
//! let schema = SchemaLoader::from_yaml_str(r#"
//! name: people
//! classes:
//!   Person:
//!     attributes:
//!       name:
//!         required: true
//!       nickname:
//!         multivalued: true
//! "#).unwrap();
//!
//! let client = MockCompletionClient::new("name: Ada\nnickname: Ace; The Analyst");
//! let engine = DataMakerEngine::new(schema, client);
//! let result = engine.make_data(Some("Person"), None, false).unwrap();
//!
//! let object = result.object().unwrap();
//! assert_eq!(object.get("name").unwrap().as_str(), Some("Ada"));
//! ```

mod config;
mod construct;
mod datamaker;
mod error;
mod grounder;
mod normalizer;
mod parser;
mod prompt;
mod record;

pub use config::{DEFAULT_ID_PREFIX, EngineConfig};
pub use construct::{ObjectConstructor, SchemaConstructor, coerce_primitive};
pub use datamaker::{DataMakerEngine, ExtractionResult};
pub use error::{ConstructionError, DataMakerError, DataMakerResult};
pub use grounder::Grounder;
pub use normalizer::{
    EntityNormalizer, GroundingContext, LiteralNormalizer, LookupNormalizer, NamedEntity,
};
pub use parser::ResponseParser;
pub use prompt::{PROMPT_HEADER, PromptBuilder, serialize_value};
pub use record::{FieldValue, GroundedObject, LooseRecord, LooseValue, loose_record_from_json};
