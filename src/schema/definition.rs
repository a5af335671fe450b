//! Schema definition types
//!
//! A small, LinkML-flavoured schema model: classes made of slots, enumerations
//! with permissible values, and custom types layered over a fixed set of
//! primitive types. Definitions are deserialized from YAML and keep the
//! declaration order of every map, since prompt layout follows it.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Annotation key holding an explicit prompt hint for a slot
pub const ANNOTATION_KEY_PROMPT: &str = "prompt";

/// Annotation key marking a slot as excluded from prompting
pub const ANNOTATION_KEY_PROMPT_SKIP: &str = "prompt.skip";

/// Range used when neither the slot nor the schema declares one
pub const DEFAULT_RANGE: &str = "string";

/// Built-in primitive types understood without a `types` declaration
pub const PRIMITIVE_TYPES: &[&str] = &[
    "string",
    "integer",
    "float",
    "double",
    "decimal",
    "boolean",
    "date",
    "datetime",
    "time",
    "uri",
    "uriorcurie",
    "curie",
    "ncname",
    "objectidentifier",
    "nodeidentifier",
    "jsonpointer",
    "jsonpath",
    "sparqlpath",
];

/// Primitive types whose values are URIs or CURIEs
pub const URI_TYPES: &[&str] = &["uri", "uriorcurie", "curie"];

/// Insertion-ordered map used for every named collection in a schema
pub type OrderedMap<T> = IndexMap<String, T>;

/// Read a YAML mapping in document order
///
/// A `null` map is empty, and a `null` entry body is `T::default()` so that
/// `RED:` with no body is a valid permissible value.
fn ordered_map<'de, D, T>(deserializer: D) -> Result<OrderedMap<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let entries: Option<IndexMap<String, Option<T>>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_default()))
        .collect())
}

/// A slot (field) definition
///
/// Flags are optional so that a definition can also express a partial
/// override (`slot_usage`, class attributes refining a global slot). Use the
/// `is_*` accessors for the effective value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotDefinition {
    /// Slot name (filled from the map key when loaded)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Primitive type, enum name or class name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multivalued: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<bool>,
    /// Explicit inlining; when unset it is derived from the range class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inlined: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inlined_as_list: Option<bool>,
    #[serde(default, deserialize_with = "ordered_map", skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: OrderedMap<serde_yaml::Value>,
}

impl SlotDefinition {
    /// Create a bare string-ranged slot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn multivalued(mut self) -> Self {
        self.multivalued = Some(true);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn recommended(mut self) -> Self {
        self.recommended = Some(true);
        self
    }

    pub fn identifier(mut self) -> Self {
        self.identifier = Some(true);
        self
    }

    pub fn inlined(mut self, inlined: bool) -> Self {
        self.inlined = Some(inlined);
        self
    }

    /// Attach an annotation value
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations
            .insert(key.into(), serde_yaml::Value::String(value.into()));
        self
    }

    pub fn is_multivalued(&self) -> bool {
        self.multivalued.unwrap_or(false)
    }

    /// Identifiers are implicitly required
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false) || self.is_identifier()
    }

    pub fn is_recommended(&self) -> bool {
        self.recommended.unwrap_or(false)
    }

    pub fn is_identifier(&self) -> bool {
        self.identifier.unwrap_or(false)
    }

    /// Effective range, falling back to `string`
    pub fn range(&self) -> &str {
        self.range.as_deref().unwrap_or(DEFAULT_RANGE)
    }

    /// Read an annotation as text
    ///
    /// Accepts both the short form (`prompt: text`) and the tagged form
    /// (`prompt: {tag: prompt, value: text}`).
    pub fn annotation(&self, key: &str) -> Option<String> {
        let value = self.annotations.get(key)?;
        let value = match value {
            serde_yaml::Value::Mapping(m) => m.get("value").unwrap_or(value),
            other => other,
        };
        match value {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Null => Some(String::new()),
            _ => None,
        }
    }

    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations.contains_key(key)
    }

    /// Whether prompting should leave this slot out
    pub fn skip_prompt(&self) -> bool {
        match self.annotation(ANNOTATION_KEY_PROMPT_SKIP) {
            Some(v) => !matches!(v.to_lowercase().as_str(), "false" | "no" | "0"),
            None => self.has_annotation(ANNOTATION_KEY_PROMPT_SKIP),
        }
    }

    /// Layer `overrides` on top of this definition
    ///
    /// Every field set on `overrides` wins; annotations are merged key by key.
    pub fn merged_with(&self, overrides: &SlotDefinition) -> SlotDefinition {
        let mut annotations = self.annotations.clone();
        for (k, v) in overrides.annotations.iter() {
            annotations.insert(k.clone(), v.clone());
        }
        SlotDefinition {
            name: self.name.clone(),
            description: overrides
                .description
                .clone()
                .or_else(|| self.description.clone()),
            range: overrides.range.clone().or_else(|| self.range.clone()),
            multivalued: overrides.multivalued.or(self.multivalued),
            required: overrides.required.or(self.required),
            recommended: overrides.recommended.or(self.recommended),
            identifier: overrides.identifier.or(self.identifier),
            inlined: overrides.inlined.or(self.inlined),
            inlined_as_list: overrides.inlined_as_list.or(self.inlined_as_list),
            annotations,
        }
    }
}

/// A class definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_a: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,
    /// References to schema-level slots
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<String>,
    /// Slots declared inline on this class
    #[serde(default, deserialize_with = "ordered_map", skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: OrderedMap<SlotDefinition>,
    /// Class-specific refinements of inherited slots
    #[serde(default, deserialize_with = "ordered_map", skip_serializing_if = "IndexMap::is_empty")]
    pub slot_usage: OrderedMap<SlotDefinition>,
    #[serde(default)]
    pub tree_root: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub mixin: bool,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an inline attribute
    pub fn with_attribute(mut self, slot: SlotDefinition) -> Self {
        let name = slot.name.clone();
        self.attributes.insert(name, slot);
        self
    }

    /// Reference a schema-level slot
    pub fn with_slot(mut self, name: impl Into<String>) -> Self {
        self.slots.push(name.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.is_a = Some(parent.into());
        self
    }

    pub fn with_slot_usage(mut self, usage: SlotDefinition) -> Self {
        let name = usage.name.clone();
        self.slot_usage.insert(name, usage);
        self
    }

    pub fn tree_root(mut self) -> Self {
        self.tree_root = true;
        self
    }
}

/// One member of an enumeration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissibleValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ontology term this value stands for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
}

/// A closed enumeration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDefinition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub permissible_values: OrderedMap<PermissibleValue>,
}

impl EnumDefinition {
    /// Build an enum from its value keys
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            permissible_values: values
                .into_iter()
                .map(|v| (v.into(), PermissibleValue::default()))
                .collect(),
        }
    }

    /// Permissible value keys in declaration order
    pub fn value_keys(&self) -> Vec<&str> {
        self.permissible_values.keys().map(String::as_str).collect()
    }
}

/// A custom type layered over a primitive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "typeof", skip_serializing_if = "Option::is_none")]
    pub type_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A complete schema document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_range: Option<String>,
    #[serde(default, deserialize_with = "ordered_map", skip_serializing_if = "IndexMap::is_empty")]
    pub types: OrderedMap<TypeDefinition>,
    #[serde(default, deserialize_with = "ordered_map", skip_serializing_if = "IndexMap::is_empty")]
    pub slots: OrderedMap<SlotDefinition>,
    #[serde(default, deserialize_with = "ordered_map", skip_serializing_if = "IndexMap::is_empty")]
    pub classes: OrderedMap<ClassDefinition>,
    #[serde(default, deserialize_with = "ordered_map", skip_serializing_if = "IndexMap::is_empty")]
    pub enums: OrderedMap<EnumDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissible_values_keep_document_order() {
        let yaml = "name: Greek\npermissible_values:\n  zeta: {}\n  alpha:\n  mid:\n    description: m\n";
        let enum_def: EnumDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(enum_def.value_keys(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(enum_def.permissible_values["alpha"], PermissibleValue::default());
    }

    #[test]
    fn test_null_collections_are_empty() {
        let class: ClassDefinition = serde_yaml::from_str("attributes:\nslot_usage: ~\n").unwrap();
        assert!(class.attributes.is_empty());
        assert!(class.slot_usage.is_empty());
    }

    #[test]
    fn test_slot_merge_prefers_overrides() {
        let base = SlotDefinition::new("name")
            .with_description("base")
            .with_annotation("prompt", "base prompt");
        let overrides = SlotDefinition {
            required: Some(true),
            description: Some("override".to_string()),
            ..Default::default()
        };
        let merged = base.merged_with(&overrides);
        assert_eq!(merged.name, "name");
        assert!(merged.is_required());
        assert_eq!(merged.description.as_deref(), Some("override"));
        assert_eq!(merged.annotation("prompt").as_deref(), Some("base prompt"));
    }

    #[test]
    fn test_annotation_forms() {
        let yaml = r#"
annotations:
  prompt: short form
  prompt.skip:
    tag: prompt.skip
    value: "true"
"#;
        let slot: SlotDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(slot.annotation("prompt").as_deref(), Some("short form"));
        assert!(slot.skip_prompt());
    }

    #[test]
    fn test_skip_prompt_false_value() {
        let slot = SlotDefinition::new("x").with_annotation(ANNOTATION_KEY_PROMPT_SKIP, "false");
        assert!(!slot.skip_prompt());
    }

    #[test]
    fn test_identifier_implies_required() {
        let slot = SlotDefinition::new("id").identifier();
        assert!(slot.is_required());
        assert_eq!(slot.range(), "string");
    }
}
