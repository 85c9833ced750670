use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::codec;
use super::definition::{PropertyDefinition, json_type_name};
use crate::error::SchemaError;

/// JSON Schema Draft 2020-12 meta-schema URI.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

const SCHEMA_KEY: &str = "$schema";
const ID_KEY: &str = "$id";
const STRICT_KEY: &str = "strict";
const DEFS_KEY: &str = "$defs";

/// A JSON Schema document root.
///
/// The root schema itself (`body`) is written flat next to the document
/// keywords, so a root object shows up as `{"$id": .., "type": "object",
/// "properties": ..}` and a root reference as `{"$id": .., "$ref": ..}`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchemaDefinition {
    pub schema: Option<String>,
    pub id: Option<String>,
    /// OpenAI strict-mode marker.
    pub strict: Option<bool>,
    pub defs: IndexMap<String, PropertyDefinition>,
    pub body: PropertyDefinition,
}

impl JsonSchemaDefinition {
    pub fn new(body: PropertyDefinition) -> Self {
        Self {
            schema: None,
            id: None,
            strict: None,
            defs: IndexMap::new(),
            body,
        }
    }

    pub fn def(&self, id: &str) -> Option<&PropertyDefinition> {
        self.defs.get(id)
    }

    /// The document as a JSON object.
    pub fn to_json_object(&self) -> Result<Map<String, Value>, SchemaError> {
        match serde_json::to_value(self)? {
            Value::Object(object) => Ok(object),
            other => Err(SchemaError::NotAnObject(json_type_name(&other))),
        }
    }

    pub fn to_json_string_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(input)?)
    }

    fn from_object(mut object: Map<String, Value>) -> Result<Self, SchemaError> {
        let schema = take_string(&mut object, SCHEMA_KEY)?;
        let id = take_string(&mut object, ID_KEY)?;
        let strict = match object.remove(STRICT_KEY) {
            Some(value) => Some(serde_json::from_value(value)?),
            None => None,
        };
        let defs = match object.remove(DEFS_KEY) {
            Some(value) => serde_json::from_value(value)?,
            None => IndexMap::new(),
        };
        let body = codec::decode(Value::Object(object))?;
        Ok(Self {
            schema,
            id,
            strict,
            defs,
            body,
        })
    }
}

fn take_string(object: &mut Map<String, Value>, key: &str) -> Result<Option<String>, SchemaError> {
    match object.remove(key) {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

impl Serialize for JsonSchemaDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match serde_json::to_value(&self.body).map_err(S::Error::custom)? {
            Value::Object(object) => object,
            _ => return Err(S::Error::custom("root schema must serialize to an object")),
        };

        let mut map = serializer.serialize_map(None)?;
        if let Some(ref schema) = self.schema {
            map.serialize_entry(SCHEMA_KEY, schema)?;
        }
        if let Some(ref id) = self.id {
            map.serialize_entry(ID_KEY, id)?;
        }
        if let Some(strict) = self.strict {
            map.serialize_entry(STRICT_KEY, &strict)?;
        }
        if !self.defs.is_empty() {
            map.serialize_entry(DEFS_KEY, &self.defs)?;
        }
        for (key, value) in &body {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for JsonSchemaDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_object(object).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::definition::ObjectPropertyDefinition;
    use serde_json::json;

    #[test]
    fn document_keys_come_before_body() {
        let mut doc = JsonSchemaDefinition::new(PropertyDefinition::reference("User"));
        doc.id = Some("User".into());
        doc.defs.insert(
            "User".into(),
            ObjectPropertyDefinition::closed(IndexMap::new(), vec![]).into(),
        );
        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            text,
            r##"{"$id":"User","$defs":{"User":{"type":"object","properties":{},"required":[],"additionalProperties":false}},"$ref":"#/$defs/User"}"##
        );
    }

    #[test]
    fn empty_defs_are_omitted() {
        let doc = JsonSchemaDefinition::new(ObjectPropertyDefinition::default().into());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({"type": "object"}));
    }

    #[test]
    fn decodes_document_keywords_and_body() {
        let doc: JsonSchemaDefinition = serde_json::from_value(json!({
            "$schema": DRAFT_2020_12,
            "$id": "Pet",
            "strict": true,
            "$defs": {"Pet": {"type": "object", "properties": {}}},
            "$ref": "#/$defs/Pet"
        }))
        .unwrap();
        assert_eq!(doc.schema.as_deref(), Some(DRAFT_2020_12));
        assert_eq!(doc.id.as_deref(), Some("Pet"));
        assert_eq!(doc.strict, Some(true));
        assert!(matches!(doc.def("Pet"), Some(PropertyDefinition::Object(_))));
        assert!(matches!(doc.body, PropertyDefinition::Reference(_)));
    }

    #[test]
    fn non_string_id_is_rejected() {
        let result: Result<JsonSchemaDefinition, _> =
            serde_json::from_value(json!({"$id": 5, "type": "object"}));
        assert!(result.is_err());
    }
}
