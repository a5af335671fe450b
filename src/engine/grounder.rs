//! Grounding of parsed records
//!
//! Turns a [`LooseRecord`] into a [`GroundedObject`]: identifiers are filled
//! in, scalar tokens go through the entity normalizer, enum values are
//! snapped to permissible values, nested records and pairs recurse into
//! their range class, and the result is handed to the object constructor.

use serde_json::Value;
use uuid::Uuid;

use crate::schema::{EnumDefinition, OrderedMap, SchemaView, SlotDefinition};

use super::config::EngineConfig;
use super::construct::ObjectConstructor;
use super::error::{DataMakerError, DataMakerResult};
use super::normalizer::{EntityNormalizer, GroundingContext};
use super::record::{FieldValue, GroundedObject, LooseRecord, LooseValue};

/// Grounds loose records against a schema
pub struct Grounder<'a> {
    schema: &'a dyn SchemaView,
    normalizer: &'a dyn EntityNormalizer,
    constructor: &'a dyn ObjectConstructor,
    config: &'a EngineConfig,
}

impl<'a> Grounder<'a> {
    pub fn new(
        schema: &'a dyn SchemaView,
        normalizer: &'a dyn EntityNormalizer,
        constructor: &'a dyn ObjectConstructor,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            schema,
            normalizer,
            constructor,
            config,
        }
    }

    /// Ground a parsed record as an instance of `class_name`
    ///
    /// A missing record (unparseable response) grounds to `None`.
    pub fn ground(
        &self,
        record: Option<LooseRecord>,
        class_name: &str,
        ctx: &mut GroundingContext,
    ) -> DataMakerResult<Option<GroundedObject>> {
        match record {
            Some(record) => self.ground_record(record, class_name, ctx, 0).map(Some),
            None => {
                tracing::error!("Nothing to ground for class {}", class_name);
                Ok(None)
            }
        }
    }

    /// Give every absent identifier slot a fresh UUID
    ///
    /// URI-typed identifiers get the configured prefix, e.g. `AUTO:<uuid>`.
    pub fn fill_identifiers(&self, record: &mut LooseRecord, class_name: &str) -> DataMakerResult<()> {
        for slot in self.schema.class_induced_slots(class_name)? {
            if !slot.is_identifier() || record.contains_key(&slot.name) {
                continue;
            }
            let uuid = Uuid::new_v4().to_string();
            let id = if self.schema.is_uri_range(slot.range()) {
                format!("{}:{}", self.config.id_prefix, uuid)
            } else {
                uuid
            };
            tracing::debug!("Assigned {}.{} = {}", class_name, slot.name, id);
            record.insert(slot.name, LooseValue::Scalar(id));
        }
        Ok(())
    }

    fn ground_record(
        &self,
        mut record: LooseRecord,
        class_name: &str,
        ctx: &mut GroundingContext,
        depth: usize,
    ) -> DataMakerResult<GroundedObject> {
        if depth > self.config.max_depth {
            return Err(DataMakerError::MaxDepthExceeded(self.config.max_depth));
        }
        self.fill_identifiers(&mut record, class_name)?;
        let slot_names = self.schema.class_slots(class_name)?;

        let mut fields = OrderedMap::new();
        for (field, value) in record {
            if !slot_names.contains(&field) {
                tracing::warn!("Dropping field '{}': not a slot of {}", field, class_name);
                continue;
            }
            let slot = self.schema.induced_slot(&field, class_name)?;
            if let Some(value) = self.ground_field(value, &slot, ctx, depth)? {
                fields.insert(field, value);
            }
        }

        tracing::debug!("Constructing {} from {} fields", class_name, fields.len());
        self.constructor.construct(self.schema, class_name, fields)
    }

    fn ground_field(
        &self,
        value: LooseValue,
        slot: &SlotDefinition,
        ctx: &mut GroundingContext,
        depth: usize,
    ) -> DataMakerResult<Option<FieldValue>> {
        let mut grounded = Vec::new();
        for item in flatten(value) {
            if let Some(value) = self.ground_item(item, slot, ctx, depth)? {
                grounded.push(value);
            }
        }

        if slot.is_multivalued() {
            return Ok(Some(FieldValue::List(grounded)));
        }
        if grounded.len() > 1 {
            tracing::warn!(
                "Slot '{}' is single-valued; keeping the first of {} values",
                slot.name,
                grounded.len()
            );
        }
        Ok(grounded.into_iter().next())
    }

    fn ground_item(
        &self,
        item: LooseValue,
        slot: &SlotDefinition,
        ctx: &mut GroundingContext,
        depth: usize,
    ) -> DataMakerResult<Option<FieldValue>> {
        let range = slot.range();
        match item {
            LooseValue::Record(record) => {
                if !self.schema.is_class(range) {
                    tracing::warn!("Slot '{}' does not range over a class; dropping object", slot.name);
                    return Ok(None);
                }
                self.ground_record(record, range, ctx, depth + 1)
                    .map(|object| Some(FieldValue::Object(object)))
            }
            LooseValue::Pair(parts) => self.ground_pair(parts, slot, ctx, depth),
            // flatten() never yields lists
            LooseValue::List(_) => Ok(None),
            LooseValue::Scalar(token) => {
                let Some(value) = self.normalizer.normalize(&token, range, self.schema, ctx) else {
                    return Ok(None);
                };
                match self.schema.get_enum(range) {
                    Some(enum_def) => Ok(self.match_enum(&value, enum_def)),
                    None => Ok(Some(FieldValue::Scalar(value))),
                }
            }
        }
    }

    /// Map positional values onto the promptable slots of the range class
    fn ground_pair(
        &self,
        parts: Vec<String>,
        slot: &SlotDefinition,
        ctx: &mut GroundingContext,
        depth: usize,
    ) -> DataMakerResult<Option<FieldValue>> {
        let range = slot.range();
        if !self.schema.is_class(range) {
            tracing::warn!("Slot '{}' does not range over a class; dropping pair", slot.name);
            return Ok(None);
        }
        let sub_slots = self.schema.promptable_slots(range)?;
        if parts.len() > sub_slots.len() {
            tracing::warn!(
                "Pair for '{}' has {} parts but {} has {} slots; ignoring the rest",
                slot.name,
                parts.len(),
                range,
                sub_slots.len()
            );
        }
        let record: LooseRecord = sub_slots
            .iter()
            .zip(parts)
            .map(|(sub_slot, part)| (sub_slot.name.clone(), LooseValue::Scalar(part)))
            .collect();
        self.ground_record(record, range, ctx, depth + 1)
            .map(|object| Some(FieldValue::Object(object)))
    }

    /// Snap a value to a permissible value key
    fn match_enum(&self, value: &Value, enum_def: &EnumDefinition) -> Option<FieldValue> {
        let Some(text) = value.as_str() else {
            tracing::info!("Cannot match non-text value {} in {}", value, enum_def.name);
            return None;
        };
        tracing::debug!("Looking for '{}' in {}", text, enum_def.name);
        let wanted = text.trim().to_lowercase();
        let keys = enum_def.value_keys();

        let found = keys
            .iter()
            .find(|k| k.to_lowercase() == wanted)
            .or_else(|| {
                let max = self.config.enum_fuzzy_distance;
                if max == 0 {
                    return None;
                }
                keys.iter()
                    .map(|k| (k, edit_distance(&k.to_lowercase(), &wanted)))
                    .filter(|(_, d)| *d <= max)
                    .min_by_key(|(_, d)| *d)
                    .map(|(k, _)| k)
            });

        match found {
            Some(key) => Some(FieldValue::Scalar(Value::String(key.to_string()))),
            None => {
                tracing::info!("Cannot find enum value for '{}' in {}", text, enum_def.name);
                None
            }
        }
    }
}

/// Expand a value into its items, lists of lists included
fn flatten(value: LooseValue) -> Vec<LooseValue> {
    match value {
        LooseValue::List(items) => items.into_iter().flat_map(flatten).collect(),
        other => vec![other],
    }
}

/// Levenshtein distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
