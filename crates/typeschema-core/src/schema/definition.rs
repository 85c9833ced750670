use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::string_or_list::StringOrList;
use crate::error::SchemaError;

/// Prefix of every `$ref` the transformers emit.
pub const DEFS_REF_PREFIX: &str = "#/$defs/";

/// Build the `$ref` pointer for a `$defs` entry.
pub fn defs_ref(id: &str) -> String {
    format!("{DEFS_REF_PREFIX}{id}")
}

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One schema in a JSON Schema document.
///
/// The wire format carries no tag naming the shape; decoding sniffs the
/// keys present (see [`super::codec`]).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyDefinition {
    String(StringPropertyDefinition),
    Numeric(NumericPropertyDefinition),
    Boolean(BooleanPropertyDefinition),
    Array(ArrayPropertyDefinition),
    Object(ObjectPropertyDefinition),
    Reference(ReferencePropertyDefinition),
    OneOf(OneOfPropertyDefinition),
    AnyOf(AnyOfPropertyDefinition),
    AllOf(AllOfPropertyDefinition),
}

impl PropertyDefinition {
    /// `{"type": "null"}`. It has no dedicated shape and decodes as a string
    /// shape with a `null` type.
    pub fn null() -> Self {
        PropertyDefinition::String(StringPropertyDefinition {
            schema_type: Some(StringOrList::single("null")),
            ..StringPropertyDefinition::untyped()
        })
    }

    /// `{"$ref": "#/$defs/<id>"}`.
    pub fn reference(id: &str) -> Self {
        PropertyDefinition::Reference(ReferencePropertyDefinition::new(defs_ref(id)))
    }

    pub fn one_of(branches: Vec<PropertyDefinition>) -> Self {
        PropertyDefinition::OneOf(OneOfPropertyDefinition {
            one_of: branches,
            ..Default::default()
        })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyDefinition::String(_) => "string",
            PropertyDefinition::Numeric(_) => "numeric",
            PropertyDefinition::Boolean(_) => "boolean",
            PropertyDefinition::Array(_) => "array",
            PropertyDefinition::Object(_) => "object",
            PropertyDefinition::Reference(_) => "reference",
            PropertyDefinition::OneOf(_) => "oneOf",
            PropertyDefinition::AnyOf(_) => "anyOf",
            PropertyDefinition::AllOf(_) => "allOf",
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            PropertyDefinition::String(d) => d.description.as_deref(),
            PropertyDefinition::Numeric(d) => d.description.as_deref(),
            PropertyDefinition::Boolean(d) => d.description.as_deref(),
            PropertyDefinition::Array(d) => d.description.as_deref(),
            PropertyDefinition::Object(d) => d.description.as_deref(),
            PropertyDefinition::Reference(d) => d.description.as_deref(),
            PropertyDefinition::OneOf(d) => d.description.as_deref(),
            PropertyDefinition::AnyOf(d) => d.description.as_deref(),
            PropertyDefinition::AllOf(d) => d.description.as_deref(),
        }
    }

    pub fn set_description(&mut self, description: Option<String>) {
        let slot = match self {
            PropertyDefinition::String(d) => &mut d.description,
            PropertyDefinition::Numeric(d) => &mut d.description,
            PropertyDefinition::Boolean(d) => &mut d.description,
            PropertyDefinition::Array(d) => &mut d.description,
            PropertyDefinition::Object(d) => &mut d.description,
            PropertyDefinition::Reference(d) => &mut d.description,
            PropertyDefinition::OneOf(d) => &mut d.description,
            PropertyDefinition::AnyOf(d) => &mut d.description,
            PropertyDefinition::AllOf(d) => &mut d.description,
        };
        *slot = description;
    }

    /// Set `default` without type checking. Transformers use this for values
    /// that came out of a type graph.
    pub fn set_default(&mut self, value: Value) {
        let slot = match self {
            PropertyDefinition::String(d) => &mut d.default,
            PropertyDefinition::Numeric(d) => &mut d.default,
            PropertyDefinition::Boolean(d) => &mut d.default,
            PropertyDefinition::Array(d) => &mut d.default,
            PropertyDefinition::Object(d) => &mut d.default,
            PropertyDefinition::Reference(d) => &mut d.default,
            PropertyDefinition::OneOf(d) => &mut d.default,
            PropertyDefinition::AnyOf(d) => &mut d.default,
            PropertyDefinition::AllOf(d) => &mut d.default,
        };
        *slot = Some(value);
    }

    /// The `type` keyword of value shapes; `None` for references,
    /// compositions and untyped string shapes.
    pub fn type_mut(&mut self) -> Option<&mut StringOrList> {
        match self {
            PropertyDefinition::String(d) => d.schema_type.as_mut(),
            PropertyDefinition::Numeric(d) => Some(&mut d.schema_type),
            PropertyDefinition::Boolean(d) => Some(&mut d.schema_type),
            PropertyDefinition::Array(d) => Some(&mut d.schema_type),
            PropertyDefinition::Object(d) => Some(&mut d.schema_type),
            PropertyDefinition::Reference(_)
            | PropertyDefinition::OneOf(_)
            | PropertyDefinition::AnyOf(_)
            | PropertyDefinition::AllOf(_) => None,
        }
    }

    /// The legacy `nullable` flag of value shapes.
    pub fn nullable_mut(&mut self) -> Option<&mut Option<bool>> {
        match self {
            PropertyDefinition::String(d) => Some(&mut d.nullable),
            PropertyDefinition::Numeric(d) => Some(&mut d.nullable),
            PropertyDefinition::Boolean(d) => Some(&mut d.nullable),
            PropertyDefinition::Array(d) => Some(&mut d.nullable),
            PropertyDefinition::Object(d) => Some(&mut d.nullable),
            PropertyDefinition::Reference(_)
            | PropertyDefinition::OneOf(_)
            | PropertyDefinition::AnyOf(_)
            | PropertyDefinition::AllOf(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectPropertyDefinition> {
        match self {
            PropertyDefinition::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut ObjectPropertyDefinition> {
        match self {
            PropertyDefinition::Object(object) => Some(object),
            _ => None,
        }
    }
}

macro_rules! into_property_definition {
    ($($shape:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$shape> for PropertyDefinition {
                fn from(value: $shape) -> Self {
                    PropertyDefinition::$variant(value)
                }
            }
        )*
    };
}

into_property_definition! {
    StringPropertyDefinition => String,
    NumericPropertyDefinition => Numeric,
    BooleanPropertyDefinition => Boolean,
    ArrayPropertyDefinition => Array,
    ObjectPropertyDefinition => Object,
    ReferencePropertyDefinition => Reference,
    OneOfPropertyDefinition => OneOf,
    AnyOfPropertyDefinition => AnyOf,
    AllOfPropertyDefinition => AllOf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringPropertyDefinition {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<StringOrList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

impl StringPropertyDefinition {
    /// A string shape with no `type` keyword at all.
    pub fn untyped() -> Self {
        Self {
            schema_type: None,
            description: None,
            nullable: None,
            format: None,
            enum_values: None,
            min_length: None,
            max_length: None,
            pattern: None,
            default: None,
            const_value: None,
        }
    }

    /// `{"const": value}`, as injected for discriminator properties.
    pub fn constant(value: impl Into<String>) -> Self {
        Self {
            const_value: Some(Value::String(value.into())),
            ..Self::untyped()
        }
    }
}

impl Default for StringPropertyDefinition {
    fn default() -> Self {
        Self {
            schema_type: Some(StringOrList::single("string")),
            ..Self::untyped()
        }
    }
}

// Non-string value shapes always carry `type`; it is what tells them
// apart on the wire.
fn number_type() -> StringOrList {
    StringOrList::single("number")
}

fn boolean_type() -> StringOrList {
    StringOrList::single("boolean")
}

fn array_type() -> StringOrList {
    StringOrList::single("array")
}

fn object_type() -> StringOrList {
    StringOrList::single("object")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericPropertyDefinition {
    #[serde(rename = "type", default = "number_type")]
    pub schema_type: StringOrList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(rename = "exclusiveMinimum", default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,
    #[serde(rename = "exclusiveMaximum", default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(rename = "multipleOf", default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

impl NumericPropertyDefinition {
    /// A numeric shape typed `integer` or `number`.
    pub fn of_type(json_type: &str) -> Self {
        Self {
            schema_type: StringOrList::single(json_type),
            description: None,
            nullable: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            multiple_of: None,
            default: None,
            const_value: None,
        }
    }
}

impl Default for NumericPropertyDefinition {
    fn default() -> Self {
        Self::of_type("number")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanPropertyDefinition {
    #[serde(rename = "type", default = "boolean_type")]
    pub schema_type: StringOrList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

impl Default for BooleanPropertyDefinition {
    fn default() -> Self {
        Self {
            schema_type: boolean_type(),
            description: None,
            nullable: None,
            default: None,
            const_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayPropertyDefinition {
    #[serde(rename = "type", default = "array_type")]
    pub schema_type: StringOrList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertyDefinition>>,
    #[serde(rename = "minItems", default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

impl ArrayPropertyDefinition {
    pub fn of(items: PropertyDefinition) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }
}

impl Default for ArrayPropertyDefinition {
    fn default() -> Self {
        Self {
            schema_type: array_type(),
            description: None,
            nullable: None,
            items: None,
            min_items: None,
            max_items: None,
            default: None,
            const_value: None,
        }
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<PropertyDefinition>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPropertyDefinition {
    #[serde(rename = "type", default = "object_type")]
    pub schema_type: StringOrList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, PropertyDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

impl ObjectPropertyDefinition {
    /// A closed object: `{type: object, properties, required,
    /// additionalProperties: false}`.
    pub fn closed(properties: IndexMap<String, PropertyDefinition>, required: Vec<String>) -> Self {
        Self {
            properties: Some(properties),
            required: Some(required),
            additional_properties: Some(AdditionalProperties::Bool(false)),
            ..Default::default()
        }
    }

    /// Insert or replace a property and make sure it is listed in `required`.
    pub fn insert_required(&mut self, name: &str, definition: PropertyDefinition) {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(name.to_string(), definition);
        let required = self.required.get_or_insert_with(Vec::new);
        if !required.iter().any(|r| r == name) {
            required.push(name.to_string());
        }
    }
}

impl Default for ObjectPropertyDefinition {
    fn default() -> Self {
        Self {
            schema_type: object_type(),
            description: None,
            nullable: None,
            properties: None,
            required: None,
            additional_properties: None,
            default: None,
            const_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePropertyDefinition {
    #[serde(rename = "$ref")]
    pub ref_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ReferencePropertyDefinition {
    pub fn new(ref_path: impl Into<String>) -> Self {
        Self {
            ref_path: ref_path.into(),
            description: None,
            default: None,
        }
    }
}

/// Discriminator as it appears on the wire (OpenAPI style).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiscriminator {
    #[serde(rename = "propertyName")]
    pub property_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OneOfPropertyDefinition {
    #[serde(rename = "oneOf")]
    pub one_of: Vec<PropertyDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<SchemaDiscriminator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnyOfPropertyDefinition {
    #[serde(rename = "anyOf")]
    pub any_of: Vec<PropertyDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllOfPropertyDefinition {
    #[serde(rename = "allOf")]
    pub all_of: Vec<PropertyDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Checked `with_default` / `with_const` builders for the value shapes.
/// `null` is accepted everywhere since any shape can be made nullable.
macro_rules! checked_literals {
    ($shape:ident, $kind:literal, $accepts:expr) => {
        impl $shape {
            pub fn with_default(mut self, value: Value) -> Result<Self, SchemaError> {
                if !value.is_null() && !$accepts(&value) {
                    return Err(SchemaError::InvalidDefault {
                        kind: $kind,
                        found: json_type_name(&value),
                    });
                }
                self.default = Some(value);
                Ok(self)
            }

            pub fn with_const(mut self, value: Value) -> Result<Self, SchemaError> {
                if !value.is_null() && !$accepts(&value) {
                    return Err(SchemaError::InvalidConst {
                        kind: $kind,
                        found: json_type_name(&value),
                    });
                }
                self.const_value = Some(value);
                Ok(self)
            }
        }
    };
}

checked_literals!(StringPropertyDefinition, "string", Value::is_string);
checked_literals!(NumericPropertyDefinition, "numeric", Value::is_number);
checked_literals!(BooleanPropertyDefinition, "boolean", Value::is_boolean);
checked_literals!(ArrayPropertyDefinition, "array", Value::is_array);
checked_literals!(ObjectPropertyDefinition, "object", Value::is_object);
