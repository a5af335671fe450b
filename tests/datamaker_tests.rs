//! Data maker pipeline tests

use linkml_datamaker::engine::{
    DataMakerEngine, DataMakerError, EngineConfig, FieldValue, GroundingContext, Grounder,
    LiteralNormalizer, LooseRecord, LooseValue, PromptBuilder, ResponseParser, SchemaConstructor,
};
use linkml_datamaker::llm::MockCompletionClient;
use linkml_datamaker::schema::{SchemaDefinition, SchemaLoader};

const PERSON_SCHEMA: &str = r#"
id: https://example.org/people
name: people
classes:
  Person:
    tree_root: true
    attributes:
      name:
        required: true
      nickname:
        multivalued: true
        annotations:
          prompt.skip: true
"#;

const RICH_SCHEMA: &str = r#"
name: rich
types:
  Identifier:
    typeof: uriorcurie
classes:
  Person:
    tree_root: true
    attributes:
      id:
        identifier: true
        range: Identifier
        annotations:
          prompt.skip: true
      name:
        required: true
      nickname:
        multivalued: true
      favorite_color:
        range: Color
      address:
        range: Address
      colleagues:
        range: Person
        multivalued: true
      employer:
        range: Organization
      previous_addresses:
        range: Address
        multivalued: true
      birthplace:
        range: Place
  Organization:
    attributes:
      name:
      address:
        range: Address
  Address:
    attributes:
      street:
      city:
      tags:
        multivalued: true
  Place:
    attributes:
      city:
      country:
  Badge:
    attributes:
      code:
        identifier: true
      label:
enums:
  Color:
    permissible_values:
      RED:
        description: the color red
      GREEN:
"#;

fn person_schema() -> SchemaDefinition {
    SchemaLoader::from_yaml_str(PERSON_SCHEMA).unwrap()
}

fn rich_schema() -> SchemaDefinition {
    SchemaLoader::from_yaml_str(RICH_SCHEMA).unwrap()
}

fn make(schema: SchemaDefinition, completion: &str) -> Result<Option<serde_json::Value>, DataMakerError> {
    let engine = DataMakerEngine::new(schema, MockCompletionClient::new(completion));
    let result = engine.make_data(None, None, false)?;
    Ok(result.object().map(|o| o.to_json()))
}

mod person_scenarios {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name_and_nicknames() {
        let object = make(person_schema(), "name: Ada\nnickname: Ace; The Analyst")
            .unwrap()
            .unwrap();
        assert_eq!(object, json!({"name": "Ada", "nickname": ["Ace", "The Analyst"]}));
    }

    #[test]
    fn test_bare_value_coerced_to_sole_slot() {
        let object = make(person_schema(), "Ada").unwrap().unwrap();
        assert_eq!(object, json!({"name": "Ada"}));
    }

    #[test]
    fn test_empty_required_value_fails() {
        let result = make(person_schema(), "name: ");
        assert!(matches!(
            result,
            Err(DataMakerError::MissingRequiredValue { .. })
        ));
    }

    #[test]
    fn test_unknown_field_dropped() {
        let object = make(person_schema(), "name: Ada\nmiddlename: X")
            .unwrap()
            .unwrap();
        assert_eq!(object, json!({"name": "Ada"}));
    }

    #[test]
    fn test_empty_segments_dropped() {
        let object = make(person_schema(), "name: Ada\nnickname: a; ;c")
            .unwrap()
            .unwrap();
        assert_eq!(object["nickname"], json!(["a", "c"]));
    }

    #[test]
    fn test_prompt_skips_annotated_slot() {
        let client = MockCompletionClient::new("name: Ada");
        let engine = DataMakerEngine::new(person_schema(), &client);
        let result = engine.make_data(None, None, true).unwrap();
        assert_eq!(
            result.prompt(),
            "Produce a data object following this format:\n\nname: <the value for name>\n"
        );
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.prompts()[0], result.prompt());
    }
}

mod grounding {
    use super::*;

    #[test]
    fn test_enum_canonical_casing() {
        let object = make(rich_schema(), "name: Ada\nfavorite_color: green")
            .unwrap()
            .unwrap();
        assert_eq!(object["favorite_color"], "GREEN");
    }

    #[test]
    fn test_enum_miss_is_absent() {
        let object = make(rich_schema(), "name: Ada\nfavorite_color: mauve")
            .unwrap()
            .unwrap();
        assert!(object.get("favorite_color").is_none());
    }

    #[test]
    fn test_identifier_auto_filled() {
        let engine = DataMakerEngine::new(rich_schema(), MockCompletionClient::new("name: Ada"))
            .with_config(EngineConfig::default().with_id_prefix("GEN"));
        let first = engine.make_data(None, None, false).unwrap();
        let second = engine.make_data(None, None, false).unwrap();

        let id = |r: &linkml_datamaker::ExtractionResult| {
            r.object()
                .and_then(|o| o.get("id"))
                .and_then(FieldValue::as_str)
                .map(str::to_string)
                .unwrap()
        };
        assert!(id(&first).starts_with("GEN:"));
        assert_ne!(id(&first), id(&second));
    }

    #[test]
    fn test_bare_identifier_for_string_range() {
        let engine = DataMakerEngine::new(rich_schema(), MockCompletionClient::new("label: gold"));
        let result = engine.make_data(Some("Badge"), None, false).unwrap();
        let code = result
            .object()
            .and_then(|o| o.get("code"))
            .and_then(FieldValue::as_str)
            .unwrap();
        assert!(uuid::Uuid::parse_str(code).is_ok());
    }

    #[test]
    fn test_referenced_entities_recorded() {
        let engine = DataMakerEngine::new(
            rich_schema(),
            MockCompletionClient::new("name: Ada\ncolleagues: Charles Babbage; Mary Somerville"),
        );
        let result = engine.make_data(None, None, false).unwrap();
        let object = result.object().unwrap().to_json();
        assert_eq!(
            object["colleagues"],
            serde_json::json!(["AUTO:Charles%20Babbage", "AUTO:Mary%20Somerville"])
        );
        let labels: Vec<&str> = result
            .named_entities()
            .iter()
            .map(|e| e.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Charles Babbage", "Mary Somerville"]);
    }

    #[test]
    fn test_nested_block_object() {
        let completion = "name: Ada\naddress:\n  street: 12 St James's Square\n  city: London\n";
        let object = make(rich_schema(), completion).unwrap().unwrap();
        assert_eq!(object["address"]["city"], "London");
        assert_eq!(object["address"]["street"], "12 St James's Square");
    }

    #[test]
    fn test_depth_guard() {
        let schema = SchemaLoader::from_yaml_str(
            r#"
name: tree
classes:
  Node:
    attributes:
      label:
      child:
        range: Node
        inlined: true
"#,
        )
        .unwrap();
        let completion = "label: a\nchild:\n  label: b\n  child:\n    label: c\n";
        let engine = DataMakerEngine::new(schema, MockCompletionClient::new(completion))
            .with_config(EngineConfig::default().with_max_depth(1));
        assert!(matches!(
            engine.make_data(None, None, false),
            Err(DataMakerError::MaxDepthExceeded(1))
        ));
    }
}

mod round_trip {
    use super::*;

    fn scalars(values: &[&str]) -> LooseValue {
        LooseValue::List(values.iter().map(|v| LooseValue::scalar(*v)).collect())
    }

    fn record(fields: Vec<(&str, LooseValue)>) -> LooseRecord {
        fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    /// Render a stub, parse the text back and ground it
    fn render_and_ground(schema: &SchemaDefinition, stub: &LooseRecord) -> LooseRecord {
        let text = PromptBuilder::new(schema)
            .serialize_object(stub, "Person")
            .unwrap();
        let parsed = ResponseParser::new(schema).parse(&text, "Person").unwrap();

        let config = EngineConfig::default();
        let normalizer = LiteralNormalizer::default();
        let grounder = Grounder::new(schema, &normalizer, &SchemaConstructor, &config);
        let mut ctx = GroundingContext::new();
        grounder
            .ground(parsed, "Person", &mut ctx)
            .unwrap()
            .unwrap()
            .to_loose_record()
    }

    #[test]
    fn test_flat_stub() {
        let address = record(vec![
            ("street", LooseValue::scalar("1 Main St")),
            ("city", LooseValue::scalar("Springfield")),
        ]);
        let stub = record(vec![
            ("id", LooseValue::scalar("P:1")),
            ("name", LooseValue::scalar("Ada")),
            ("nickname", scalars(&["Ace", "Countess"])),
            ("favorite_color", LooseValue::scalar("RED")),
            ("address", LooseValue::Record(address)),
        ]);
        assert_eq!(render_and_ground(&rich_schema(), &stub), stub);
    }

    #[test]
    fn test_object_two_levels_deep() {
        let address = record(vec![
            ("street", LooseValue::scalar("A")),
            ("city", LooseValue::scalar("B")),
        ]);
        let employer = record(vec![
            ("name", LooseValue::scalar("Acme")),
            ("address", LooseValue::Record(address)),
        ]);
        let stub = record(vec![
            ("id", LooseValue::scalar("P:1")),
            ("name", LooseValue::scalar("Ada")),
            ("employer", LooseValue::Record(employer)),
        ]);
        assert_eq!(render_and_ground(&rich_schema(), &stub), stub);
    }

    #[test]
    fn test_list_of_objects_with_lists() {
        let first = record(vec![
            ("street", LooseValue::scalar("A")),
            ("tags", scalars(&["x", "y"])),
        ]);
        let second = record(vec![
            ("street", LooseValue::scalar("B")),
            ("city", LooseValue::scalar("Paris, Texas")),
        ]);
        let stub = record(vec![
            ("id", LooseValue::scalar("P:1")),
            ("name", LooseValue::scalar("Ada")),
            (
                "previous_addresses",
                LooseValue::List(vec![LooseValue::Record(first), LooseValue::Record(second)]),
            ),
        ]);
        assert_eq!(render_and_ground(&rich_schema(), &stub), stub);
    }

    #[test]
    fn test_enum_casing_is_canonical() {
        let stub = record(vec![
            ("id", LooseValue::scalar("P:1")),
            ("name", LooseValue::scalar("Ada")),
            ("favorite_color", LooseValue::scalar("green")),
        ]);
        let grounded = render_and_ground(&rich_schema(), &stub);
        assert_eq!(grounded.get("favorite_color"), Some(&LooseValue::scalar("GREEN")));
        assert_eq!(grounded.get("name"), Some(&LooseValue::scalar("Ada")));
    }

    #[test]
    fn test_pair_grounds_to_object() {
        let stub = record(vec![
            ("id", LooseValue::scalar("P:1")),
            ("name", LooseValue::scalar("Ada")),
            (
                "birthplace",
                LooseValue::Pair(vec!["London".to_string(), "England".to_string()]),
            ),
        ]);
        let grounded = render_and_ground(&rich_schema(), &stub);
        let place = record(vec![
            ("city", LooseValue::scalar("London")),
            ("country", LooseValue::scalar("England")),
        ]);
        assert_eq!(grounded.get("birthplace"), Some(&LooseValue::Record(place)));
    }
}
