//! Data-making orchestration
//!
//! One call to [`DataMakerEngine::make_data`] builds a prompt for a schema
//! class, asks the completion client once, parses the answer and grounds it
//! into a [`GroundedObject`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::llm::CompletionClient;
use crate::schema::{SchemaError, SchemaView};

use super::config::EngineConfig;
use super::construct::{ObjectConstructor, SchemaConstructor};
use super::error::{DataMakerError, DataMakerResult};
use super::grounder::Grounder;
use super::normalizer::{EntityNormalizer, GroundingContext, LiteralNormalizer, NamedEntity};
use super::parser::ResponseParser;
use super::prompt::PromptBuilder;
use super::record::{GroundedObject, LooseRecord};

/// Everything produced by one data-making call
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    class_name: String,
    prompt: String,
    raw_completion_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    extracted_object: Option<GroundedObject>,
    named_entities: Vec<NamedEntity>,
    model: String,
    timestamp: DateTime<Utc>,
}

impl ExtractionResult {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Prompt sent to the model
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Completion text exactly as returned
    pub fn raw_completion(&self) -> &str {
        &self.raw_completion_output
    }

    /// Grounded object; `None` when the response could not be parsed
    pub fn object(&self) -> Option<&GroundedObject> {
        self.extracted_object.as_ref()
    }

    pub fn into_object(self) -> Option<GroundedObject> {
        self.extracted_object
    }

    /// Entities grounded while building the object
    pub fn named_entities(&self) -> &[NamedEntity] {
        &self.named_entities
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Generates schema-conforming objects with a language model
pub struct DataMakerEngine<S: SchemaView, C: CompletionClient> {
    schema: S,
    client: C,
    config: EngineConfig,
    normalizer: Option<Box<dyn EntityNormalizer>>,
    constructor: Box<dyn ObjectConstructor>,
}

impl<S: SchemaView, C: CompletionClient> DataMakerEngine<S, C> {
    /// Create an engine with the default configuration, a literal
    /// normalizer and the schema-driven constructor
    pub fn new(schema: S, client: C) -> Self {
        Self {
            schema,
            client,
            config: EngineConfig::default(),
            normalizer: None,
            constructor: Box::new(SchemaConstructor),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the entity normalizer
    pub fn with_normalizer(mut self, normalizer: impl EntityNormalizer + 'static) -> Self {
        self.normalizer = Some(Box::new(normalizer));
        self
    }

    /// Replace the object constructor
    pub fn with_constructor(mut self, constructor: impl ObjectConstructor + 'static) -> Self {
        self.constructor = Box::new(constructor);
        self
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The class to generate: the one named, else the schema's target class
    pub fn resolve_class(&self, class_name: Option<&str>) -> DataMakerResult<String> {
        match class_name {
            Some(name) if self.schema.is_class(name) => Ok(name.to_string()),
            Some(name) => Err(SchemaError::ClassNotFound(name.to_string()).into()),
            None => self.schema.target_class().ok_or(DataMakerError::NoTargetClass),
        }
    }

    /// Generate one object
    ///
    /// Stub fields seed the prompt and fill any slot the model leaves out.
    /// The completion client is called exactly once.
    pub fn make_data(
        &self,
        class_name: Option<&str>,
        stub: Option<&LooseRecord>,
        show_prompt: bool,
    ) -> DataMakerResult<ExtractionResult> {
        let class_name = self.resolve_class(class_name)?;
        let schema: &dyn SchemaView = &self.schema;

        let prompt = PromptBuilder::new(schema)
            .with_header(self.config.include_header)
            .build(&class_name, stub)?;
        let raw = self.client.complete(&prompt, show_prompt)?;
        tracing::info!("RAW TEXT: {}", raw);

        let parsed = ResponseParser::new(schema)
            .with_max_depth(self.config.max_depth)
            .parse(&raw, &class_name)?;
        let merged = parsed.map(|mut record| {
            if let Some(stub) = stub {
                merge_stub(&mut record, stub);
            }
            record
        });

        let default_normalizer = LiteralNormalizer::new(self.config.id_prefix.clone());
        let normalizer: &dyn EntityNormalizer = match self.normalizer.as_deref() {
            Some(normalizer) => normalizer,
            None => &default_normalizer,
        };
        let grounder = Grounder::new(schema, normalizer, self.constructor.as_ref(), &self.config);
        let mut ctx = GroundingContext::new();
        let object = grounder.ground(merged, &class_name, &mut ctx)?;

        Ok(ExtractionResult {
            class_name,
            prompt,
            raw_completion_output: raw,
            extracted_object: object,
            named_entities: ctx.into_named_entities(),
            model: self.client.model_name().to_string(),
            timestamp: Utc::now(),
        })
    }

    /// Generate `count` objects one after another
    ///
    /// Stops at the first error.
    pub fn make_many(
        &self,
        class_name: Option<&str>,
        count: usize,
        stub: Option<&LooseRecord>,
        show_prompt: bool,
    ) -> DataMakerResult<Vec<ExtractionResult>> {
        (0..count)
            .map(|i| {
                tracing::debug!("Generating object {} of {}", i + 1, count);
                self.make_data(class_name, stub, show_prompt)
            })
            .collect()
    }
}

/// Stub values fill fields the parsed record lacks
fn merge_stub(record: &mut LooseRecord, stub: &LooseRecord) {
    for (field, value) in stub.iter() {
        if !record.contains_key(field) {
            record.insert(field.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::record::{FieldValue, LooseValue};
    use crate::llm::{LlmError, MockCompletionClient};
    use crate::schema::{SchemaDefinition, SchemaLoader};

    const SCHEMA: &str = r#"
name: people
classes:
  Person:
    tree_root: true
    attributes:
      name:
        required: true
      age:
        range: integer
"#;

    fn schema() -> SchemaDefinition {
        SchemaLoader::from_yaml_str(SCHEMA).unwrap()
    }

    #[test]
    fn test_make_data() {
        let engine = DataMakerEngine::new(schema(), MockCompletionClient::new("name: Ada\nage: 36"));
        let result = engine.make_data(None, None, false).unwrap();

        assert_eq!(result.class_name(), "Person");
        assert_eq!(result.model(), "mock-model");
        assert_eq!(result.raw_completion(), "name: Ada\nage: 36");
        assert!(result.prompt().starts_with("Produce a data object"));
        let object = result.object().unwrap();
        assert_eq!(object.to_json(), serde_json::json!({"name": "Ada", "age": 36}));
        assert_eq!(engine.client().call_count(), 1);
    }

    #[test]
    fn test_stub_fills_missing_fields() {
        let engine = DataMakerEngine::new(schema(), MockCompletionClient::new("name: Ada"));
        let mut stub = LooseRecord::new();
        stub.insert("age".into(), LooseValue::scalar("36"));
        stub.insert("name".into(), LooseValue::scalar("Grace"));

        let result = engine.make_data(Some("Person"), Some(&stub), false).unwrap();
        let object = result.object().unwrap();
        assert_eq!(object.get("name").and_then(FieldValue::as_str), Some("Ada"));
        assert_eq!(object.get("age"), Some(&FieldValue::Scalar(36.into())));
        assert!(engine.client().prompts()[0].ends_with("age: 36\nname: Grace\n"));
    }

    #[test]
    fn test_unparseable_response() {
        let engine = DataMakerEngine::new(schema(), MockCompletionClient::new("no colon here"));
        let result = engine.make_data(None, None, false).unwrap();
        assert!(result.object().is_none());
    }

    #[test]
    fn test_unknown_class() {
        let engine = DataMakerEngine::new(schema(), MockCompletionClient::new("name: Ada"));
        let result = engine.make_data(Some("Robot"), None, false);
        assert!(matches!(
            result,
            Err(DataMakerError::Schema(SchemaError::ClassNotFound(_)))
        ));
        assert_eq!(engine.client().call_count(), 0);
    }

    #[test]
    fn test_client_failure_propagates() {
        let engine = DataMakerEngine::new(schema(), MockCompletionClient::failing());
        let result = engine.make_data(None, None, false);
        assert!(matches!(
            result,
            Err(DataMakerError::Llm(LlmError::Unreachable { .. }))
        ));
        assert_eq!(engine.client().call_count(), 1);
    }

    #[test]
    fn test_make_many() {
        let client = MockCompletionClient::with_responses(vec![
            "name: Ada".to_string(),
            "name: Grace".to_string(),
        ]);
        let engine = DataMakerEngine::new(schema(), &client);
        let results = engine.make_many(None, 2, None, false).unwrap();
        let names: Vec<&str> = results
            .iter()
            .filter_map(|r| r.object()?.get("name")?.as_str())
            .collect();
        assert_eq!(names, vec!["Ada", "Grace"]);
        assert_eq!(client.call_count(), 2);
    }
}
