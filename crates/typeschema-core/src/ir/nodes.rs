use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::graph::{TypeId, TypeRef};

/// Default discriminator property name.
pub const DEFAULT_DISCRIMINATOR_NAME: &str = "type";

/// A node of the type graph.
///
/// Object, enum and polymorphic nodes are named and live in
/// [`super::TypeGraph::nodes`]; primitives, lists and maps are embedded
/// at their use site through [`TypeRef::Inline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    Primitive(PrimitiveNode),
    Enum(EnumNode),
    List(ListNode),
    Map(MapNode),
    Object(ObjectNode),
    Polymorphic(PolymorphicNode),
}

impl TypeNode {
    /// Lowercase name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeNode::Primitive(_) => "primitive",
            TypeNode::Enum(_) => "enum",
            TypeNode::List(_) => "list",
            TypeNode::Map(_) => "map",
            TypeNode::Object(_) => "object",
            TypeNode::Polymorphic(_) => "polymorphic",
        }
    }

    /// Whether this node kind may appear in [`TypeRef::Inline`] position.
    pub fn is_inlinable(&self) -> bool {
        matches!(
            self,
            TypeNode::Primitive(_) | TypeNode::List(_) | TypeNode::Map(_)
        )
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            TypeNode::Primitive(_) => None,
            TypeNode::Enum(e) => e.description.as_deref(),
            TypeNode::List(l) => l.description.as_deref(),
            TypeNode::Map(m) => m.description.as_deref(),
            TypeNode::Object(o) => o.description.as_deref(),
            TypeNode::Polymorphic(p) => p.description.as_deref(),
        }
    }
}

/// Scalar kinds understood by the transformers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    String,
    Boolean,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    /// The JSON Schema `type` keyword value for this kind.
    pub fn json_type(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Int | PrimitiveKind::Long => "integer",
            PrimitiveKind::Float | PrimitiveKind::Double => "number",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveNode {
    #[serde(rename = "type")]
    pub kind: PrimitiveKind,
}

/// A closed set of string constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumNode {
    pub name: String,
    pub entries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListNode {
    pub element: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A string-keyed dictionary. The key type is kept for information only;
/// JSON Schema cannot constrain object keys by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub key: TypeRef,
    pub value: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A record type with ordered properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Names of properties without a default value, as computed by the
    /// introspector.
    #[serde(default)]
    pub required: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ObjectNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            required: IndexSet::new(),
            description: None,
        }
    }

    /// Append a property, recording it as required unless it declares a default.
    pub fn with_property(mut self, property: Property) -> Self {
        if !property.has_default_value {
            self.required.insert(property.name.clone());
        }
        self.properties.push(property);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A property of an [`ObjectNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub has_default_value: bool,
    /// The default itself. May be `None` even when `has_default_value` is
    /// set, when the introspector can only observe presence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

impl Property {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: None,
            has_default_value: false,
            default_value: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the property as defaulted, optionally with the known value.
    pub fn with_default(mut self, value: Option<serde_json::Value>) -> Self {
        self.has_default_value = true;
        self.default_value = value;
        self
    }
}

/// A union of subtypes, typically a sealed hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolymorphicNode {
    pub base_name: String,
    pub subtypes: Vec<SubtypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtypeRef {
    pub id: TypeId,
}

impl SubtypeRef {
    pub fn new(id: impl Into<TypeId>) -> Self {
        Self { id: id.into() }
    }
}

/// How a polymorphic value names its concrete subtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discriminator {
    #[serde(default = "default_discriminator_name")]
    pub name: String,
    /// Inject the discriminator as a required `const` property into every
    /// subtype schema.
    #[serde(default)]
    pub required: bool,
    /// Discriminator value to subtype id. `None` means the value is the
    /// subtype's own name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, TypeId>>,
}

fn default_discriminator_name() -> String {
    DEFAULT_DISCRIMINATOR_NAME.to_string()
}

impl Default for Discriminator {
    fn default() -> Self {
        Self {
            name: default_discriminator_name(),
            required: false,
            mapping: None,
        }
    }
}
