//! Prompt construction
//!
//! A prompt lists every promptable slot of the target class as a
//! `name: <hint>` template line, followed by any stub values already known.
//! Stub values are rendered in the same line format the response parser
//! reads, so a completion that echoes them parses back to the same record.

use crate::schema::{ANNOTATION_KEY_PROMPT, SchemaView, SlotDefinition};

use super::error::{DataMakerError, DataMakerResult};
use super::record::{LooseRecord, LooseValue};

/// Instruction line opening every prompt
pub const PROMPT_HEADER: &str = "Produce a data object following this format:";

/// Builds completion prompts for schema classes
pub struct PromptBuilder<'a> {
    schema: &'a dyn SchemaView,
    include_header: bool,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(schema: &'a dyn SchemaView) -> Self {
        Self {
            schema,
            include_header: true,
        }
    }

    /// Toggle the instruction header
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Build the prompt for `class_name`, optionally seeded with a stub
    ///
    /// # Errors
    ///
    /// Fails when the class is unknown or a stub field is not one of its
    /// slots.
    pub fn build(&self, class_name: &str, stub: Option<&LooseRecord>) -> DataMakerResult<String> {
        let mut prompt = String::new();
        if self.include_header {
            prompt.push_str(PROMPT_HEADER);
            prompt.push_str("\n\n");
        }

        for slot in self.schema.promptable_slots(class_name)? {
            prompt.push_str(&format!("{}: <{}>\n", slot.name, self.slot_hint(&slot)));
        }

        if let Some(stub) = stub {
            prompt.push_str(&self.serialize_object(stub, class_name)?);
        }
        Ok(prompt)
    }

    /// Hint text shown between the angle brackets for a slot
    pub fn slot_hint(&self, slot: &SlotDefinition) -> String {
        let hint = slot
            .annotation(ANNOTATION_KEY_PROMPT)
            .or_else(|| slot.description.clone())
            .unwrap_or_else(|| {
                if slot.is_multivalued() {
                    format!("semicolon-separated list of {}s", slot.name)
                } else {
                    format!("the value for {}", slot.name)
                }
            });

        match self.schema.get_enum(slot.range()) {
            Some(enum_def) => format!(
                "{}. Must be one of: {}",
                hint.trim_end_matches('.'),
                enum_def.value_keys().join(", ")
            ),
            None => hint,
        }
    }

    /// Render a record as `field: value` lines, skipping empty fields
    ///
    /// Inlined objects go in an indented block under their field, one
    /// `- ` item per object of a multivalued slot, so nesting at any depth
    /// reads back unchanged.
    pub fn serialize_object(&self, object: &LooseRecord, class_name: &str) -> DataMakerResult<String> {
        let mut out = String::new();
        self.write_record(&mut out, object, class_name, 0)?;
        Ok(out)
    }

    fn write_record(
        &self,
        out: &mut String,
        record: &LooseRecord,
        class_name: &str,
        indent: usize,
    ) -> DataMakerResult<()> {
        let slots = self.schema.class_slots(class_name)?;
        let pad = " ".repeat(indent);
        for (field, value) in record {
            if !slots.contains(field) {
                return Err(DataMakerError::UnknownSlot {
                    field: field.to_string(),
                    class: class_name.to_string(),
                });
            }
            if value.is_empty() {
                continue;
            }

            let slot = self.schema.induced_slot(field, class_name)?;
            let inlined = self.schema.is_class(slot.range()) && self.schema.is_inlined(&slot)?;
            let Some(records) = nested_records(value).filter(|_| inlined) else {
                out.push_str(&format!("{pad}{field}: {}\n", serialize_value(value)));
                continue;
            };

            out.push_str(&format!("{pad}{field}:\n"));
            for nested in records {
                if matches!(value, LooseValue::List(_)) {
                    let mut item = String::new();
                    self.write_record(&mut item, nested, slot.range(), 0)?;
                    for (i, line) in item.lines().enumerate() {
                        let marker = if i == 0 { "- " } else { "  " };
                        out.push_str(&format!("{pad}  {marker}{line}\n"));
                    }
                } else {
                    self.write_record(out, nested, slot.range(), indent + 2)?;
                }
            }
        }
        Ok(())
    }
}

/// The records held by a record value or a list of them
fn nested_records(value: &LooseValue) -> Option<Vec<&LooseRecord>> {
    match value {
        LooseValue::Record(record) => Some(vec![record]),
        LooseValue::List(items) => items
            .iter()
            .filter(|v| !v.is_empty())
            .map(LooseValue::as_record)
            .collect(),
        _ => None,
    }
}

/// Inline text form of a value: `;` between list items, `, ` between the
/// `k: v` fields of a nested record, ` - ` between positional values
pub fn serialize_value(value: &LooseValue) -> String {
    match value {
        LooseValue::Scalar(s) => s.trim().to_string(),
        LooseValue::List(items) => items
            .iter()
            .filter(|v| !v.is_empty())
            .map(serialize_value)
            .collect::<Vec<_>>()
            .join("; "),
        LooseValue::Record(record) => record
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}: {}", k, serialize_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
        LooseValue::Pair(parts) => parts
            .iter()
            .map(|p| p.trim())
            .collect::<Vec<_>>()
            .join(" - "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaLoader;

    const SCHEMA: &str = r#"
name: people
classes:
  Person:
    tree_root: true
    attributes:
      id:
        identifier: true
        annotations:
          prompt.skip: true
      name:
        description: The person's full name
        required: true
      nickname:
        multivalued: true
      favorite_color:
        range: Color
      occupation:
        annotations:
          prompt: job title
      address:
        range: Address
  Address:
    attributes:
      street:
      city:
enums:
  Color:
    permissible_values:
      RED:
      GREEN:
"#;

    #[test]
    fn test_build_prompt() {
        let schema = SchemaLoader::from_yaml_str(SCHEMA).unwrap();
        let prompt = PromptBuilder::new(&schema).build("Person", None).unwrap();
        assert_eq!(
            prompt,
            "Produce a data object following this format:\n\n\
             name: <The person's full name>\n\
             nickname: <semicolon-separated list of nicknames>\n\
             favorite_color: <the value for favorite_color. Must be one of: RED, GREEN>\n\
             occupation: <job title>\n\
             address: <the value for address>\n"
        );
    }

    #[test]
    fn test_build_without_header() {
        let schema = SchemaLoader::from_yaml_str(SCHEMA).unwrap();
        let prompt = PromptBuilder::new(&schema)
            .with_header(false)
            .build("Address", None)
            .unwrap();
        assert_eq!(
            prompt,
            "street: <the value for street>\ncity: <the value for city>\n"
        );
    }

    #[test]
    fn test_stub_lines() {
        let schema = SchemaLoader::from_yaml_str(SCHEMA).unwrap();
        let mut address = LooseRecord::new();
        address.insert("street".into(), LooseValue::scalar("1 Main St"));
        address.insert("city".into(), LooseValue::scalar("Springfield"));
        let mut stub = LooseRecord::new();
        stub.insert("name".into(), LooseValue::scalar("Ada"));
        stub.insert("occupation".into(), LooseValue::scalar(""));
        stub.insert(
            "nickname".into(),
            LooseValue::List(vec![LooseValue::scalar("Ace"), LooseValue::scalar("Countess")]),
        );
        stub.insert("address".into(), LooseValue::Record(address));

        let prompt = PromptBuilder::new(&schema).build("Person", Some(&stub)).unwrap();
        assert!(prompt.ends_with(
            "name: Ada\nnickname: Ace; Countess\naddress:\n  street: 1 Main St\n  city: Springfield\n"
        ));
        assert!(!prompt.contains("occupation: \n"));
    }

    #[test]
    fn test_stub_unknown_field() {
        let schema = SchemaLoader::from_yaml_str(SCHEMA).unwrap();
        let mut stub = LooseRecord::new();
        stub.insert("middlename".into(), LooseValue::scalar("B"));
        let result = PromptBuilder::new(&schema).build("Person", Some(&stub));
        assert!(matches!(result, Err(DataMakerError::UnknownSlot { .. })));
    }

    const NESTED_SCHEMA: &str = r#"
name: jobs
classes:
  Person:
    attributes:
      name:
      employer:
        range: Organization
      previous_addresses:
        range: Address
        multivalued: true
  Organization:
    attributes:
      name:
      address:
        range: Address
  Address:
    attributes:
      street:
      tags:
        multivalued: true
"#;

    fn address(street: &str, tags: &[&str]) -> LooseRecord {
        let mut address = LooseRecord::new();
        address.insert("street".into(), LooseValue::scalar(street));
        if !tags.is_empty() {
            let tags = tags.iter().map(|t| LooseValue::scalar(*t)).collect();
            address.insert("tags".into(), LooseValue::List(tags));
        }
        address
    }

    #[test]
    fn test_nested_objects_use_blocks() {
        let schema = SchemaLoader::from_yaml_str(NESTED_SCHEMA).unwrap();
        let mut employer = LooseRecord::new();
        employer.insert("name".into(), LooseValue::scalar("Acme"));
        employer.insert("address".into(), LooseValue::Record(address("A", &[])));
        let mut person = LooseRecord::new();
        person.insert("name".into(), LooseValue::scalar("Ada"));
        person.insert("employer".into(), LooseValue::Record(employer));
        person.insert(
            "previous_addresses".into(),
            LooseValue::List(vec![
                LooseValue::Record(address("B", &["x", "y"])),
                LooseValue::Record(address("C", &[])),
            ]),
        );

        let text = PromptBuilder::new(&schema)
            .serialize_object(&person, "Person")
            .unwrap();
        assert_eq!(
            text,
            "name: Ada\n\
             employer:\n  name: Acme\n  address:\n    street: A\n\
             previous_addresses:\n  - street: B\n    tags: x; y\n  - street: C\n"
        );
    }

    #[test]
    fn test_nested_unknown_field() {
        let schema = SchemaLoader::from_yaml_str(NESTED_SCHEMA).unwrap();
        let mut employer = LooseRecord::new();
        employer.insert("motto".into(), LooseValue::scalar("Onward"));
        let mut person = LooseRecord::new();
        person.insert("employer".into(), LooseValue::Record(employer));
        let result = PromptBuilder::new(&schema).serialize_object(&person, "Person");
        assert!(matches!(
            result,
            Err(DataMakerError::UnknownSlot { ref class, .. }) if class == "Organization"
        ));
    }

    #[test]
    fn test_serialize_pair() {
        let value = LooseValue::Pair(vec!["Paris".into(), " France ".into()]);
        assert_eq!(serialize_value(&value), "Paris - France");
    }
}
