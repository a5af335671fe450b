//! Intermediate and grounded value shapes
//!
//! The parser produces a [`LooseRecord`]: field names mapped to
//! [`LooseValue`]s holding raw text. Grounding turns that into a
//! [`GroundedObject`], whose [`FieldValue`]s carry typed JSON scalars and
//! nested objects.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::schema::OrderedMap;

/// A value as read from completion text, before grounding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LooseValue {
    /// Raw text token
    Scalar(String),
    /// Values of a multivalued slot
    List(Vec<LooseValue>),
    /// An inlined nested object
    Record(LooseRecord),
    /// Positional values of a ` - ` separated segment, mapped onto the
    /// range class's slots in declaration order
    Pair(Vec<String>),
}

/// Field name to loose value, in the order fields were read
pub type LooseRecord = OrderedMap<LooseValue>;

impl LooseValue {
    pub fn scalar(text: impl Into<String>) -> Self {
        LooseValue::Scalar(text.into())
    }

    /// The text of a scalar value
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            LooseValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&LooseRecord> {
        match self {
            LooseValue::Record(r) => Some(r),
            _ => None,
        }
    }

    /// True for empty text, empty lists and empty records
    pub fn is_empty(&self) -> bool {
        match self {
            LooseValue::Scalar(s) => s.trim().is_empty(),
            LooseValue::List(items) => items.iter().all(LooseValue::is_empty),
            LooseValue::Record(r) => r.is_empty(),
            LooseValue::Pair(parts) => parts.iter().all(|p| p.trim().is_empty()),
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(LooseValue::Scalar(s.clone())),
            Value::Bool(_) | Value::Number(_) => Some(LooseValue::Scalar(value.to_string())),
            Value::Array(items) => Some(LooseValue::List(
                items.iter().filter_map(LooseValue::from_json).collect(),
            )),
            Value::Object(_) => loose_record_from_json(value).map(LooseValue::Record),
        }
    }
}

/// Build a loose record from a JSON object, e.g. a stub read from a file
///
/// Numbers and booleans become their text form; `null` fields are skipped.
/// Returns `None` when the value is not an object.
pub fn loose_record_from_json(value: &Value) -> Option<LooseRecord> {
    let Value::Object(map) = value else {
        return None;
    };
    Some(
        map.iter()
            .filter_map(|(k, v)| LooseValue::from_json(v).map(|v| (k.clone(), v)))
            .collect(),
    )
}

/// A grounded, typed field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Value),
    List(Vec<FieldValue>),
    Object(GroundedObject),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&GroundedObject> {
        match self {
            FieldValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Plain JSON form
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Scalar(v) => v.clone(),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Object(o) => o.to_json(),
        }
    }

    fn to_loose(&self) -> Option<LooseValue> {
        match self {
            FieldValue::Scalar(Value::Null) => None,
            FieldValue::Scalar(Value::String(s)) => Some(LooseValue::Scalar(s.clone())),
            FieldValue::Scalar(v) => Some(LooseValue::Scalar(v.to_string())),
            FieldValue::List(items) => Some(LooseValue::List(
                items.iter().filter_map(FieldValue::to_loose).collect(),
            )),
            FieldValue::Object(o) => Some(LooseValue::Record(o.to_loose_record())),
        }
    }
}

/// An object of a schema class whose fields have been validated
#[derive(Debug, Clone, PartialEq)]
pub struct GroundedObject {
    class_name: String,
    fields: OrderedMap<FieldValue>,
}

impl GroundedObject {
    pub fn new(class_name: impl Into<String>, fields: OrderedMap<FieldValue>) -> Self {
        Self {
            class_name: class_name.into(),
            fields,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &OrderedMap<FieldValue> {
        &self.fields
    }

    pub fn into_fields(self) -> OrderedMap<FieldValue> {
        self.fields
    }

    /// Plain JSON object, fields in slot order
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Deserialize into a caller-defined Rust type
    pub fn into_typed<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }

    /// Text form of the object, usable as a stub for another round
    pub fn to_loose_record(&self) -> LooseRecord {
        self.fields
            .iter()
            .filter_map(|(k, v)| v.to_loose().map(|v| (k.to_string(), v)))
            .collect()
    }
}

impl Serialize for GroundedObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn person() -> GroundedObject {
        let mut address = OrderedMap::new();
        address.insert("city".into(), FieldValue::Scalar(json!("Paris")));
        let mut fields = OrderedMap::new();
        fields.insert("name".into(), FieldValue::Scalar(json!("Ada")));
        fields.insert("age".into(), FieldValue::Scalar(json!(36)));
        fields.insert(
            "nickname".into(),
            FieldValue::List(vec![FieldValue::Scalar(json!("Ace"))]),
        );
        fields.insert(
            "address".into(),
            FieldValue::Object(GroundedObject::new("Address", address)),
        );
        GroundedObject::new("Person", fields)
    }

    #[test]
    fn test_to_json_keeps_order() {
        let json = serde_json::to_string(&person()).unwrap();
        assert_eq!(
            json,
            r#"{"name":"Ada","age":36,"nickname":["Ace"],"address":{"city":"Paris"}}"#
        );
        assert_eq!(person().to_json()["address"]["city"], "Paris");
    }

    #[test]
    fn test_into_typed() {
        #[derive(Deserialize)]
        struct Person {
            name: String,
            age: u32,
            nickname: Vec<String>,
        }

        let typed: Person = person().into_typed().unwrap();
        assert_eq!(typed.name, "Ada");
        assert_eq!(typed.age, 36);
        assert_eq!(typed.nickname, vec!["Ace"]);
    }

    #[test]
    fn test_to_loose_record() {
        let loose = person().to_loose_record();
        assert_eq!(loose.get("age"), Some(&LooseValue::scalar("36")));
        let address = loose.get("address").and_then(LooseValue::as_record).unwrap();
        assert_eq!(address.get("city"), Some(&LooseValue::scalar("Paris")));
    }

    #[test]
    fn test_loose_record_from_json() {
        let record = loose_record_from_json(&json!({
            "name": "Ada",
            "age": 36,
            "tags": ["a", null, "b"],
            "gone": null
        }))
        .unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(
            record.get("tags"),
            Some(&LooseValue::List(vec![
                LooseValue::scalar("a"),
                LooseValue::scalar("b")
            ]))
        );
        assert!(loose_record_from_json(&json!("text")).is_none());
    }

    #[test]
    fn test_is_empty() {
        assert!(LooseValue::scalar("  ").is_empty());
        assert!(LooseValue::List(vec![]).is_empty());
        assert!(!LooseValue::Pair(vec!["a".into()]).is_empty());
    }
}
