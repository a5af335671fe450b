//! Named-entity normalization
//!
//! Free-text tokens whose slot range is a schema class stand for a
//! referenced entity. A normalizer maps such a token to an identifier and
//! records the mapping in the per-call [`GroundingContext`]; every other
//! token passes through as text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::SchemaView;

/// A token grounded to an identifier during one data-making call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: String,
    pub label: String,
    /// Class the entity was grounded as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

/// State accumulated while grounding one response
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroundingContext {
    named_entities: Vec<NamedEntity>,
}

impl GroundingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entity; ids already seen are ignored
    pub fn add_named_entity(&mut self, entity: NamedEntity) {
        if !self.named_entities.iter().any(|e| e.id == entity.id) {
            self.named_entities.push(entity);
        }
    }

    pub fn named_entities(&self) -> &[NamedEntity] {
        &self.named_entities
    }

    pub fn into_named_entities(self) -> Vec<NamedEntity> {
        self.named_entities
    }
}

/// Maps raw tokens to grounded scalar values
pub trait EntityNormalizer {
    /// Normalize `token` for a slot ranging over `range`
    ///
    /// Returns `None` to drop the token.
    fn normalize(
        &self,
        token: &str,
        range: &str,
        schema: &dyn SchemaView,
        ctx: &mut GroundingContext,
    ) -> Option<Value>;
}

/// Pass-through normalizer
///
/// Tokens for class ranges become `{prefix}:{url-encoded token}` ids.
#[derive(Debug, Clone)]
pub struct LiteralNormalizer {
    id_prefix: String,
}

impl LiteralNormalizer {
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: id_prefix.into(),
        }
    }

    fn literal_id(&self, token: &str) -> String {
        format!("{}:{}", self.id_prefix, urlencoding::encode(token))
    }
}

impl Default for LiteralNormalizer {
    fn default() -> Self {
        Self::new(super::config::DEFAULT_ID_PREFIX)
    }
}

impl EntityNormalizer for LiteralNormalizer {
    fn normalize(
        &self,
        token: &str,
        range: &str,
        schema: &dyn SchemaView,
        ctx: &mut GroundingContext,
    ) -> Option<Value> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if !schema.is_class(range) {
            return Some(Value::String(token.to_string()));
        }
        let id = self.literal_id(token);
        ctx.add_named_entity(NamedEntity {
            id: id.clone(),
            label: token.to_string(),
            range: Some(range.to_string()),
        });
        Some(Value::String(id))
    }
}

/// Dictionary normalizer: known labels map to fixed identifiers
///
/// Lookup is case-insensitive and applies to class and URI ranges; anything
/// not in the table is handled like [`LiteralNormalizer`].
#[derive(Debug, Clone, Default)]
pub struct LookupNormalizer {
    table: HashMap<String, String>,
    fallback: LiteralNormalizer,
}

impl LookupNormalizer {
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            table: HashMap::new(),
            fallback: LiteralNormalizer::new(id_prefix),
        }
    }

    /// Add a label → id entry
    pub fn with_entry(mut self, label: &str, id: impl Into<String>) -> Self {
        self.table.insert(label.trim().to_lowercase(), id.into());
        self
    }

    /// Read entries from a YAML mapping of labels to ids
    ///
    /// ```yaml
    /// London: GEO:2643743
    /// Paris: GEO:2988507
    /// ```
    pub fn from_yaml_str(content: &str, id_prefix: impl Into<String>) -> Result<Self, serde_yaml::Error> {
        let entries: HashMap<String, String> = serde_yaml::from_str(content)?;
        Ok(entries
            .into_iter()
            .fold(Self::new(id_prefix), |n, (label, id)| n.with_entry(&label, id)))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl EntityNormalizer for LookupNormalizer {
    fn normalize(
        &self,
        token: &str,
        range: &str,
        schema: &dyn SchemaView,
        ctx: &mut GroundingContext,
    ) -> Option<Value> {
        let label = token.trim();
        if schema.is_class(range) || schema.is_uri_range(range) {
            if let Some(id) = self.table.get(&label.to_lowercase()) {
                tracing::debug!("Grounded '{}' to {}", label, id);
                ctx.add_named_entity(NamedEntity {
                    id: id.clone(),
                    label: label.to_string(),
                    range: Some(range.to_string()),
                });
                return Some(Value::String(id.clone()));
            }
        }
        self.fallback.normalize(token, range, schema, ctx)
    }
}
