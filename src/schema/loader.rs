//! Schema loading from YAML documents

use std::path::Path;

use super::definition::SchemaDefinition;
use super::error::{SchemaError, SchemaResult};
use super::view::SchemaView;

/// Loads and checks schema documents
pub struct SchemaLoader;

impl SchemaLoader {
    /// Load a schema from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<SchemaDefinition> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded schema file {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Load a schema from YAML text
    pub fn from_yaml_str(content: &str) -> SchemaResult<SchemaDefinition> {
        let mut schema: SchemaDefinition = serde_yaml::from_str(content)?;
        fill_names(&mut schema);
        check_references(&schema)?;
        Ok(schema)
    }
}

/// Copy map keys into the `name` field of each definition
fn fill_names(schema: &mut SchemaDefinition) {
    for (name, slot) in schema.slots.iter_mut() {
        slot.name = name.to_string();
    }
    for (name, class) in schema.classes.iter_mut() {
        class.name = name.to_string();
        for (attr_name, attr) in class.attributes.iter_mut() {
            attr.name = attr_name.to_string();
        }
        for (usage_name, usage) in class.slot_usage.iter_mut() {
            usage.name = usage_name.to_string();
        }
    }
    for (name, enum_def) in schema.enums.iter_mut() {
        enum_def.name = name.to_string();
    }
    for (name, type_def) in schema.types.iter_mut() {
        type_def.name = name.to_string();
    }
}

/// Reject dangling class, slot and range references
fn check_references(schema: &SchemaDefinition) -> SchemaResult<()> {
    let range_known = |range: &str| {
        schema.is_class(range) || schema.is_enum(range) || schema.primitive_type(range).is_some()
    };

    for (name, class) in schema.classes.iter() {
        for parent in class.is_a.iter().chain(class.mixins.iter()) {
            if !schema.is_class(parent) {
                return Err(SchemaError::InvalidSchema(format!(
                    "class '{name}' inherits from unknown class '{parent}'"
                )));
            }
        }
        for slot in &class.slots {
            if !schema.slots.contains_key(slot) {
                return Err(SchemaError::InvalidSchema(format!(
                    "class '{name}' references unknown slot '{slot}'"
                )));
            }
        }
        let declared = class
            .attributes
            .iter()
            .chain(class.slot_usage.iter())
            .filter_map(|(slot_name, slot)| slot.range.as_deref().map(|r| (slot_name, r)));
        for (slot_name, range) in declared {
            if !range_known(range) {
                return Err(SchemaError::InvalidSchema(format!(
                    "slot '{slot_name}' on class '{name}' has unknown range '{range}'"
                )));
            }
        }
        let mut parent = class.is_a.as_deref();
        let mut steps = 0;
        while let Some(current) = parent {
            if current == name {
                return Err(SchemaError::InvalidSchema(format!(
                    "class '{name}' is its own ancestor"
                )));
            }
            steps += 1;
            if steps > schema.classes.len() {
                break;
            }
            parent = schema.classes.get(current).and_then(|c| c.is_a.as_deref());
        }
    }

    for (name, slot) in schema.slots.iter() {
        if let Some(range) = slot.range.as_deref()
            && !range_known(range)
        {
            return Err(SchemaError::InvalidSchema(format!(
                "slot '{name}' has unknown range '{range}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSON_SCHEMA: &str = r#"
id: https://example.org/people
name: people
default_prefix: ex
classes:
  Person:
    tree_root: true
    attributes:
      name:
        required: true
      nickname:
        multivalued: true
      favorite_color:
        range: Color
enums:
  Color:
    permissible_values:
      RED:
      GREEN:
        description: the color of grass
"#;

    #[test]
    fn test_load_fills_names() {
        let schema = SchemaLoader::from_yaml_str(PERSON_SCHEMA).unwrap();
        assert_eq!(schema.name, "people");
        let person = schema.get_class("Person").unwrap();
        assert_eq!(person.name, "Person");
        assert_eq!(person.attributes.get("nickname").unwrap().name, "nickname");
        let color = schema.get_enum("Color").unwrap();
        assert_eq!(color.value_keys(), vec!["RED", "GREEN"]);
    }

    #[test]
    fn test_unknown_range_rejected() {
        let yaml = r#"
name: broken
classes:
  Thing:
    attributes:
      part:
        range: Missing
"#;
        let err = SchemaLoader::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema(_)));
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let yaml = r#"
name: broken
classes:
  Thing:
    is_a: Ghost
"#;
        assert!(matches!(
            SchemaLoader::from_yaml_str(yaml),
            Err(SchemaError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SchemaLoader::from_path("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, SchemaError::ReadError { .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            SchemaLoader::from_yaml_str("classes: [unclosed"),
            Err(SchemaError::ParseError(_))
        ));
    }
}
