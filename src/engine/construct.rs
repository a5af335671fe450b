//! Object construction
//!
//! The last grounding step: check an assembled field mapping against the
//! class definition and coerce primitive values to their JSON types.

use serde_json::{Number, Value};

use crate::schema::{OrderedMap, SchemaView, SlotDefinition};

use super::error::{ConstructionError, DataMakerResult};
use super::record::{FieldValue, GroundedObject};

/// Builds grounded objects from field mappings
pub trait ObjectConstructor {
    /// Validate `fields` as an instance of `class_name`
    fn construct(
        &self,
        schema: &dyn SchemaView,
        class_name: &str,
        fields: OrderedMap<FieldValue>,
    ) -> DataMakerResult<GroundedObject>;
}

/// Constructor driven by the schema's induced slots
///
/// Fields come out in slot order. Integers, numbers and booleans are
/// coerced from text; every other primitive stays a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaConstructor;

impl ObjectConstructor for SchemaConstructor {
    fn construct(
        &self,
        schema: &dyn SchemaView,
        class_name: &str,
        mut fields: OrderedMap<FieldValue>,
    ) -> DataMakerResult<GroundedObject> {
        let slots = schema.class_induced_slots(class_name)?;

        if let Some(field) = fields.keys().find(|f| !slots.iter().any(|s| &s.name == *f)) {
            return Err(ConstructionError::UnknownField {
                class: class_name.to_string(),
                field: field.to_string(),
            }
            .into());
        }

        let mut out = OrderedMap::new();
        for slot in &slots {
            let value = fields.shift_remove(&slot.name);
            let missing = match &value {
                None => true,
                Some(FieldValue::List(items)) => items.is_empty(),
                Some(_) => false,
            };
            if missing && slot.is_required() {
                return Err(ConstructionError::MissingRequired {
                    class: class_name.to_string(),
                    field: slot.name.clone(),
                }
                .into());
            }
            if let Some(value) = value {
                let checked = check_value(schema, class_name, slot, value)?;
                out.insert(slot.name.clone(), checked);
            }
        }

        Ok(GroundedObject::new(class_name, out))
    }
}

fn check_value(
    schema: &dyn SchemaView,
    class_name: &str,
    slot: &SlotDefinition,
    value: FieldValue,
) -> Result<FieldValue, ConstructionError> {
    let shape_error = |expected: &str| ConstructionError::ShapeMismatch {
        class: class_name.to_string(),
        field: slot.name.clone(),
        expected: expected.to_string(),
    };

    match (slot.is_multivalued(), value) {
        (true, FieldValue::List(items)) => items
            .into_iter()
            .map(|item| check_single(schema, class_name, slot, item))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::List),
        (true, _) => Err(shape_error("a list")),
        (false, FieldValue::List(_)) => Err(shape_error("a single value")),
        (false, value) => check_single(schema, class_name, slot, value),
    }
}

fn check_single(
    schema: &dyn SchemaView,
    class_name: &str,
    slot: &SlotDefinition,
    value: FieldValue,
) -> Result<FieldValue, ConstructionError> {
    let range = slot.range();
    let type_error = |value: &Value| ConstructionError::TypeMismatch {
        class: class_name.to_string(),
        field: slot.name.clone(),
        range: range.to_string(),
        value: match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    };

    let scalar = match value {
        FieldValue::Object(object) if schema.is_class(range) => {
            return Ok(FieldValue::Object(object));
        }
        FieldValue::Object(_) | FieldValue::List(_) => {
            return Err(ConstructionError::ShapeMismatch {
                class: class_name.to_string(),
                field: slot.name.clone(),
                expected: format!("a {range} value"),
            });
        }
        FieldValue::Scalar(scalar) => scalar,
    };

    // References to class instances are carried as identifiers.
    if schema.is_class(range) {
        return match scalar {
            Value::String(_) => Ok(FieldValue::Scalar(scalar)),
            other => Err(type_error(&other)),
        };
    }

    if let Some(enum_def) = schema.get_enum(range) {
        let permitted = scalar
            .as_str()
            .is_some_and(|s| enum_def.permissible_values.contains_key(s));
        if permitted {
            return Ok(FieldValue::Scalar(scalar));
        }
        return Err(ConstructionError::InvalidEnumValue {
            field: slot.name.clone(),
            range: range.to_string(),
            value: scalar
                .as_str()
                .map_or_else(|| scalar.to_string(), str::to_string),
        });
    }

    let primitive = schema
        .primitive_type(range)
        .unwrap_or_else(|| "string".to_string());
    coerce_primitive(&primitive, &scalar)
        .map(FieldValue::Scalar)
        .ok_or_else(|| type_error(&scalar))
}

/// Coerce a JSON scalar to the representation of a primitive type
pub fn coerce_primitive(primitive: &str, value: &Value) -> Option<Value> {
    match primitive {
        "integer" => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        },
        "float" | "double" | "decimal" => match value {
            Value::Number(_) => Some(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            _ => None,
        },
        "boolean" => match value {
            Value::Bool(_) => Some(value.clone()),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" => Some(Value::Bool(true)),
                "false" | "no" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        _ => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(_) | Value::Bool(_) => Some(Value::String(value.to_string())),
            _ => None,
        },
    }
}
