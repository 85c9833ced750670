//! Wire codec for [`PropertyDefinition`].
//!
//! Encoding dispatches on the variant. Decoding has no tag to go by, so it
//! inspects which keys the JSON object carries, in a fixed priority order:
//!
//! 1. `oneOf`, `anyOf`, `allOf`, `$ref` (composition and references)
//! 2. `items` (array), then `properties` (object)
//! 3. the first recognised member of `type`
//! 4. string, when nothing else matches
//!
//! Structural keys win over `type` because composed schemas in the wild
//! often omit or misstate `type`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::definition::{PropertyDefinition, json_type_name};
use super::string_or_list::StringOrList;
use crate::error::SchemaError;

/// The shape a JSON object decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    OneOf,
    AnyOf,
    AllOf,
    Reference,
    Array,
    Object,
    String,
    Numeric,
    Boolean,
}

/// Pick the shape for `object`.
pub fn sniff_shape(object: &Map<String, Value>) -> ShapeKind {
    if object.contains_key("oneOf") {
        return ShapeKind::OneOf;
    }
    if object.contains_key("anyOf") {
        return ShapeKind::AnyOf;
    }
    if object.contains_key("allOf") {
        return ShapeKind::AllOf;
    }
    if object.contains_key("$ref") {
        return ShapeKind::Reference;
    }
    if object.contains_key("items") {
        return ShapeKind::Array;
    }
    if object.contains_key("properties") {
        return ShapeKind::Object;
    }
    object
        .get("type")
        .and_then(shape_from_type)
        .unwrap_or(ShapeKind::String)
}

fn shape_from_type(type_value: &Value) -> Option<ShapeKind> {
    let types: StringOrList = serde_json::from_value(type_value.clone()).ok()?;
    types.as_slice().iter().find_map(|t| match t.as_str() {
        "string" => Some(ShapeKind::String),
        "integer" | "number" => Some(ShapeKind::Numeric),
        "boolean" => Some(ShapeKind::Boolean),
        "array" => Some(ShapeKind::Array),
        "object" => Some(ShapeKind::Object),
        _ => None,
    })
}

/// Decode a JSON value into a [`PropertyDefinition`].
pub fn decode(value: Value) -> Result<PropertyDefinition, SchemaError> {
    let object = match value {
        Value::Object(object) => object,
        other => return Err(SchemaError::NotAnObject(json_type_name(&other))),
    };
    let shape = sniff_shape(&object);
    log::trace!("decoding property definition as {shape:?}");
    let value = Value::Object(object);
    let definition = match shape {
        ShapeKind::OneOf => PropertyDefinition::OneOf(serde_json::from_value(value)?),
        ShapeKind::AnyOf => PropertyDefinition::AnyOf(serde_json::from_value(value)?),
        ShapeKind::AllOf => PropertyDefinition::AllOf(serde_json::from_value(value)?),
        ShapeKind::Reference => PropertyDefinition::Reference(serde_json::from_value(value)?),
        ShapeKind::Array => PropertyDefinition::Array(serde_json::from_value(value)?),
        ShapeKind::Object => PropertyDefinition::Object(serde_json::from_value(value)?),
        ShapeKind::String => PropertyDefinition::String(serde_json::from_value(value)?),
        ShapeKind::Numeric => PropertyDefinition::Numeric(serde_json::from_value(value)?),
        ShapeKind::Boolean => PropertyDefinition::Boolean(serde_json::from_value(value)?),
    };
    Ok(definition)
}

/// Encode a [`PropertyDefinition`] into a JSON value.
pub fn encode(definition: &PropertyDefinition) -> Result<Value, SchemaError> {
    Ok(serde_json::to_value(definition)?)
}

impl Serialize for PropertyDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyDefinition::String(d) => d.serialize(serializer),
            PropertyDefinition::Numeric(d) => d.serialize(serializer),
            PropertyDefinition::Boolean(d) => d.serialize(serializer),
            PropertyDefinition::Array(d) => d.serialize(serializer),
            PropertyDefinition::Object(d) => d.serialize(serializer),
            PropertyDefinition::Reference(d) => d.serialize(serializer),
            PropertyDefinition::OneOf(d) => d.serialize(serializer),
            PropertyDefinition::AnyOf(d) => d.serialize(serializer),
            PropertyDefinition::AllOf(d) => d.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode(value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shape(value: Value) -> ShapeKind {
        match value {
            Value::Object(object) => sniff_shape(&object),
            _ => unreachable!("test input must be an object"),
        }
    }

    #[test]
    fn composition_keys_win_over_everything() {
        assert_eq!(
            shape(json!({"oneOf": [], "anyOf": [], "$ref": "#/x"})),
            ShapeKind::OneOf
        );
        assert_eq!(shape(json!({"anyOf": [], "allOf": []})), ShapeKind::AnyOf);
        assert_eq!(shape(json!({"allOf": [], "$ref": "#/x"})), ShapeKind::AllOf);
    }

    #[test]
    fn ref_wins_over_structural_keys() {
        assert_eq!(
            shape(json!({"$ref": "#/$defs/A", "items": {}})),
            ShapeKind::Reference
        );
    }

    #[test]
    fn items_wins_over_wrong_type() {
        assert_eq!(
            shape(json!({"type": "string", "items": {"type": "string"}})),
            ShapeKind::Array
        );
    }

    #[test]
    fn properties_without_type_is_object() {
        assert_eq!(shape(json!({"properties": {}})), ShapeKind::Object);
    }

    #[test]
    fn type_list_uses_first_recognised_member() {
        assert_eq!(shape(json!({"type": ["null", "integer"]})), ShapeKind::Numeric);
        assert_eq!(shape(json!({"type": ["boolean", "string"]})), ShapeKind::Boolean);
        assert_eq!(shape(json!({"type": "number"})), ShapeKind::Numeric);
        assert_eq!(shape(json!({"type": "array"})), ShapeKind::Array);
        assert_eq!(shape(json!({"type": "object"})), ShapeKind::Object);
    }

    #[test]
    fn falls_back_to_string() {
        assert_eq!(shape(json!({})), ShapeKind::String);
        assert_eq!(shape(json!({"type": "null"})), ShapeKind::String);
        assert_eq!(shape(json!({"const": "Dog"})), ShapeKind::String);
        assert_eq!(shape(json!({"type": 12})), ShapeKind::String);
    }

    #[test]
    fn non_object_is_a_decode_error() {
        let err = decode(json!([1, 2])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "property definition must be a JSON object, got array"
        );
    }

    #[test]
    fn wrong_field_type_inside_shape_is_a_decode_error() {
        assert!(decode(json!({"type": "string", "minLength": "three"})).is_err());
    }
}
