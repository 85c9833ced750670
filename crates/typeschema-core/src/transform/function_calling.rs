use indexmap::IndexMap;
use log::debug;

use super::SchemaTransformer;
use super::discriminator::{inject_const, mapping_entries, value_for};
use super::emit::{
    NullEncoding, annotate_property, any_definition, enum_definition, into_nullable,
    primitive_definition,
};
use crate::config::FunctionCallingConfig;
use crate::error::TransformError;
use crate::ir::{ObjectNode, PolymorphicNode, TypeGraph, TypeId, TypeNode, TypeRef};
use crate::schema::{
    AdditionalProperties, ArrayPropertyDefinition, FunctionCallingSchema,
    ObjectPropertyDefinition, OneOfPropertyDefinition, PropertyDefinition, ToolType,
};

/// Nullability for tool schemas: type unions only, never the legacy flag.
const TOOL_NULLS: NullEncoding = NullEncoding {
    union_type: true,
    nullable_flag: false,
    null_in_enum: true,
};

/// Turns a [`TypeGraph`] whose root is an object into a tool definition for
/// LLM function-calling APIs.
///
/// The output has no `$defs`: every use is expanded in place, every
/// property is required, and every object is closed.
#[derive(Debug, Clone, Default)]
pub struct FunctionCallingTransformer {
    config: FunctionCallingConfig,
}

impl FunctionCallingTransformer {
    pub fn new(config: FunctionCallingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FunctionCallingConfig {
        &self.config
    }

    pub fn transform(
        &self,
        graph: &TypeGraph,
        root_name: &str,
    ) -> Result<FunctionCallingSchema, TransformError> {
        let (root_id, root) = match graph.root {
            TypeRef::Ref { ref id, .. } => match graph.get(id.as_str()) {
                Some(TypeNode::Object(object)) => (id, object),
                Some(other) => return Err(TransformError::InvalidRoot(other.kind_name().into())),
                None => return Err(TransformError::UnresolvedRef(id.to_string())),
            },
            TypeRef::Inline { ref node, .. } => {
                return Err(TransformError::InvalidRoot(node.kind_name().into()));
            }
        };

        let mut inliner = Inliner {
            graph,
            visiting: Vec::new(),
        };
        let parameters = inliner.inline_named(root_id, |inliner| inliner.inline_object(root))?;

        debug!("transformed '{root_name}' into a function-calling schema");

        Ok(FunctionCallingSchema {
            tool_type: ToolType::Function,
            name: root_name.to_string(),
            description: root.description.clone().unwrap_or_default(),
            strict: self.config.strict,
            parameters,
        })
    }
}

impl SchemaTransformer for FunctionCallingTransformer {
    type Output = FunctionCallingSchema;

    fn transform(
        &self,
        graph: &TypeGraph,
        root_name: &str,
    ) -> Result<FunctionCallingSchema, TransformError> {
        FunctionCallingTransformer::transform(self, graph, root_name)
    }
}

/// Per-call inlining state. `visiting` holds the named nodes currently being
/// expanded, so only true cycles are rejected; a type used twice side by
/// side is simply expanded twice.
struct Inliner<'a> {
    graph: &'a TypeGraph,
    visiting: Vec<TypeId>,
}

impl<'a> Inliner<'a> {
    fn inline_named<T>(
        &mut self,
        id: &TypeId,
        expand: impl FnOnce(&mut Self) -> Result<T, TransformError>,
    ) -> Result<T, TransformError> {
        if self.visiting.contains(id) {
            return Err(TransformError::CyclicReference(id.to_string()));
        }
        self.visiting.push(id.clone());
        let result = expand(self);
        self.visiting.pop();
        result
    }

    fn lookup(&self, id: &TypeId) -> Result<&'a TypeNode, TransformError> {
        self.graph
            .get(id.as_str())
            .ok_or_else(|| TransformError::UnresolvedRef(id.to_string()))
    }

    fn inline_ref(&mut self, type_ref: &TypeRef) -> Result<PropertyDefinition, TransformError> {
        let (definition, nullable) = match type_ref {
            TypeRef::Inline { node, nullable } => {
                if !node.is_inlinable() {
                    return Err(TransformError::InvalidInlineNode {
                        kind: node.kind_name(),
                    });
                }
                (self.inline_node(node)?, *nullable)
            }
            TypeRef::Ref { id, nullable } if id.is_any() && self.graph.get(id.as_str()).is_none() => {
                (any_definition(), *nullable)
            }
            TypeRef::Ref { id, nullable } => {
                let node = self.lookup(id)?;
                let definition = self.inline_named(id, |inliner| inliner.inline_node(node))?;
                (definition, *nullable)
            }
        };
        Ok(if nullable {
            into_nullable(definition, TOOL_NULLS)
        } else {
            definition
        })
    }

    fn inline_node(&mut self, node: &TypeNode) -> Result<PropertyDefinition, TransformError> {
        Ok(match node {
            TypeNode::Primitive(primitive) => primitive_definition(primitive.kind),
            TypeNode::Enum(e) => enum_definition(e),
            TypeNode::List(list) => ArrayPropertyDefinition {
                description: list.description.clone(),
                ..ArrayPropertyDefinition::of(self.inline_ref(&list.element)?)
            }
            .into(),
            TypeNode::Map(map) => ObjectPropertyDefinition {
                description: map.description.clone(),
                additional_properties: Some(AdditionalProperties::Schema(Box::new(
                    self.inline_ref(&map.value)?,
                ))),
                ..Default::default()
            }
            .into(),
            TypeNode::Object(object) => self.inline_object(object)?.into(),
            TypeNode::Polymorphic(polymorphic) => self.inline_polymorphic(polymorphic)?,
        })
    }

    fn inline_object(
        &mut self,
        object: &ObjectNode,
    ) -> Result<ObjectPropertyDefinition, TransformError> {
        let mut properties = IndexMap::with_capacity(object.properties.len());
        let mut required = Vec::with_capacity(object.properties.len());
        for property in &object.properties {
            let definition = self.inline_ref(&property.type_ref)?;
            properties.insert(
                property.name.clone(),
                annotate_property(definition, property, false),
            );
            required.push(property.name.clone());
        }
        Ok(ObjectPropertyDefinition {
            description: object.description.clone(),
            ..ObjectPropertyDefinition::closed(properties, required)
        })
    }

    fn inline_polymorphic(
        &mut self,
        polymorphic: &PolymorphicNode,
    ) -> Result<PropertyDefinition, TransformError> {
        let tagging = match polymorphic.discriminator {
            Some(ref d) if d.required => {
                Some((d.name.as_str(), mapping_entries(self.graph, polymorphic, d)?))
            }
            _ => None,
        };

        let mut branches = Vec::with_capacity(polymorphic.subtypes.len());
        for subtype in &polymorphic.subtypes {
            let node = self.lookup(&subtype.id)?;
            let mut branch = self.inline_named(&subtype.id, |inliner| inliner.inline_node(node))?;

            if let Some((name, ref entries)) = tagging {
                if let Some(value) = value_for(entries, &subtype.id) {
                    let object = branch.as_object_mut().ok_or_else(|| {
                        TransformError::InvalidDiscriminatorTarget {
                            polymorphic: polymorphic.base_name.clone(),
                            subtype: subtype.id.to_string(),
                        }
                    })?;
                    inject_const(object, name, value);
                }
            }
            branches.push(branch);
        }

        Ok(OneOfPropertyDefinition {
            one_of: branches,
            description: polymorphic.description.clone(),
            discriminator: None,
            default: None,
        }
        .into())
    }
}
