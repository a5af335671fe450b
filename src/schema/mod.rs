//! Schema model and introspection
//!
//! Provides:
//! - LinkML-style definitions (classes, slots, enums, types) deserialized from YAML
//! - The [`SchemaView`] trait used by the data-making pipeline to query a schema
//! - [`SchemaLoader`] for reading and reference-checking schema files
//!
//! # Example
//!
//! ```rust
//! use linkml_datamaker::schema::{SchemaLoader, SchemaView};
//!
//! let schema = SchemaLoader::from_yaml_str(r#"
//! name: people
//! classes:
//!   Person:
//!     attributes:
//!       name:
//!         required: true
//! "#).unwrap();
//!
//! assert_eq!(schema.class_slots("Person").unwrap(), vec!["name"]);
//! ```

mod definition;
mod error;
mod loader;
mod view;

pub use definition::{
    ANNOTATION_KEY_PROMPT, ANNOTATION_KEY_PROMPT_SKIP, ClassDefinition, DEFAULT_RANGE,
    EnumDefinition, OrderedMap, PRIMITIVE_TYPES, PermissibleValue, SchemaDefinition,
    SlotDefinition, TypeDefinition, URI_TYPES,
};
pub use error::{SchemaError, SchemaResult};
pub use loader::SchemaLoader;
pub use view::SchemaView;
