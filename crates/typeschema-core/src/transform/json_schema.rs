use indexmap::IndexMap;
use log::{debug, trace};
use serde_json::{Map, Value};

use super::SchemaTransformer;
use super::discriminator::{inject_const, mapping_entries, to_schema_discriminator};
use super::emit::{
    NullEncoding, annotate_property, any_definition, enum_definition, into_nullable,
    is_unconstrained, primitive_definition,
};
use crate::config::JsonSchemaConfig;
use crate::error::TransformError;
use crate::ir::{ObjectNode, PolymorphicNode, TypeGraph, TypeNode, TypeRef};
use crate::schema::{
    AdditionalProperties, ArrayPropertyDefinition, DRAFT_2020_12, JsonSchemaDefinition,
    ObjectPropertyDefinition, OneOfPropertyDefinition, PropertyDefinition,
};

/// Turns a [`TypeGraph`] into a JSON Schema Draft 2020-12 document.
///
/// Every named node becomes a `$defs` entry and named uses become `$ref`s,
/// so recursive types produce finite documents.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaTransformer {
    config: JsonSchemaConfig,
}

impl JsonSchemaTransformer {
    pub fn new(config: JsonSchemaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JsonSchemaConfig {
        &self.config
    }

    /// Build the document for `graph`, naming it `root_name` (`$id`).
    pub fn transform(
        &self,
        graph: &TypeGraph,
        root_name: &str,
    ) -> Result<JsonSchemaDefinition, TransformError> {
        let emitter = Emitter {
            graph,
            config: &self.config,
        };

        // Phase 1: one $defs entry per node, in discovery order
        let mut defs = IndexMap::with_capacity(graph.nodes.len());
        for (id, node) in &graph.nodes {
            trace!("emitting $defs/{id} ({})", node.kind_name());
            defs.insert(id.to_string(), emitter.emit_node(node)?);
        }

        // Phase 2: inject discriminator consts into the emitted subtypes
        emitter.enrich_discriminators(&mut defs)?;

        // Phase 3: root
        let body = emitter.emit_ref(&graph.root)?;

        debug!(
            "transformed '{root_name}' into JSON Schema with {} $defs",
            defs.len()
        );

        Ok(JsonSchemaDefinition {
            schema: self
                .config
                .include_schema_uri
                .then(|| DRAFT_2020_12.to_string()),
            id: Some(root_name.to_string()),
            strict: self.config.strict_schema_flag.then_some(true),
            defs,
            body,
        })
    }

    /// Same as [`Self::transform`], returned as a raw JSON object.
    pub fn transform_to_value(
        &self,
        graph: &TypeGraph,
        root_name: &str,
    ) -> Result<Map<String, Value>, TransformError> {
        self.transform(graph, root_name)?
            .to_json_object()
            .map_err(|e| TransformError::Encode(e.to_string()))
    }

    /// Emit the schema for a single use of a type, as a property would.
    pub fn transform_ref(
        &self,
        graph: &TypeGraph,
        type_ref: &TypeRef,
    ) -> Result<PropertyDefinition, TransformError> {
        Emitter {
            graph,
            config: &self.config,
        }
        .emit_ref(type_ref)
    }

    /// Make an already emitted, non-null schema for `type_ref` nullable.
    ///
    /// Named uses get wrapped in `oneOf` next to `{type: null}`; inline uses
    /// fold `null` into their own `type`. `{}` already admits `null` and is
    /// returned as is.
    pub fn wrap_nullable(
        &self,
        type_ref: &TypeRef,
        definition: PropertyDefinition,
    ) -> PropertyDefinition {
        match type_ref {
            TypeRef::Ref { .. } => nullable_use(definition),
            TypeRef::Inline { .. } => into_nullable(definition, self.null_encoding()),
        }
    }

    fn null_encoding(&self) -> NullEncoding {
        null_encoding(&self.config)
    }
}

impl SchemaTransformer for JsonSchemaTransformer {
    type Output = JsonSchemaDefinition;

    fn transform(
        &self,
        graph: &TypeGraph,
        root_name: &str,
    ) -> Result<JsonSchemaDefinition, TransformError> {
        JsonSchemaTransformer::transform(self, graph, root_name)
    }
}

fn null_encoding(config: &JsonSchemaConfig) -> NullEncoding {
    NullEncoding {
        union_type: config.use_union_types,
        nullable_flag: config.use_nullable_field,
        null_in_enum: false,
    }
}

fn nullable_use(definition: PropertyDefinition) -> PropertyDefinition {
    if is_unconstrained(&definition) {
        definition
    } else {
        PropertyDefinition::one_of(vec![definition, PropertyDefinition::null()])
    }
}

/// Per-call state of one transformation.
struct Emitter<'a> {
    graph: &'a TypeGraph,
    config: &'a JsonSchemaConfig,
}

impl Emitter<'_> {
    fn emit_node(&self, node: &TypeNode) -> Result<PropertyDefinition, TransformError> {
        Ok(match node {
            TypeNode::Primitive(primitive) => primitive_definition(primitive.kind),
            TypeNode::Enum(e) => enum_definition(e),
            TypeNode::List(list) => ArrayPropertyDefinition {
                description: list.description.clone(),
                ..ArrayPropertyDefinition::of(self.emit_ref(&list.element)?)
            }
            .into(),
            // The key schema is dropped: JSON object keys are always strings.
            TypeNode::Map(map) => ObjectPropertyDefinition {
                description: map.description.clone(),
                additional_properties: Some(AdditionalProperties::Schema(Box::new(
                    self.emit_ref(&map.value)?,
                ))),
                ..Default::default()
            }
            .into(),
            TypeNode::Object(object) => self.emit_object(object)?.into(),
            TypeNode::Polymorphic(polymorphic) => self.emit_polymorphic(polymorphic)?,
        })
    }

    fn emit_object(&self, object: &ObjectNode) -> Result<ObjectPropertyDefinition, TransformError> {
        let mut properties = IndexMap::with_capacity(object.properties.len());
        let mut required = Vec::new();
        for property in &object.properties {
            let definition = self.emit_ref(&property.type_ref)?;
            properties.insert(
                property.name.clone(),
                annotate_property(definition, property, true),
            );
            if self.config.is_required(object, property) {
                required.push(property.name.clone());
            }
        }
        Ok(ObjectPropertyDefinition {
            description: object.description.clone(),
            ..ObjectPropertyDefinition::closed(properties, required)
        })
    }

    fn emit_polymorphic(
        &self,
        polymorphic: &PolymorphicNode,
    ) -> Result<PropertyDefinition, TransformError> {
        let mut branches = Vec::with_capacity(polymorphic.subtypes.len());
        for subtype in &polymorphic.subtypes {
            if self.graph.get(subtype.id.as_str()).is_none() {
                return Err(TransformError::UnresolvedRef(subtype.id.to_string()));
            }
            branches.push(PropertyDefinition::reference(subtype.id.as_str()));
        }

        let discriminator = match polymorphic.discriminator {
            Some(ref d) if self.config.include_openapi_discriminator => {
                let entries = mapping_entries(self.graph, polymorphic, d)?;
                Some(to_schema_discriminator(d, &entries))
            }
            _ => None,
        };

        Ok(OneOfPropertyDefinition {
            one_of: branches,
            description: polymorphic.description.clone(),
            discriminator,
            default: None,
        }
        .into())
    }

    /// Schema for one use of a type. Nullability belongs to the use, not
    /// the node, so it is applied here.
    fn emit_ref(&self, type_ref: &TypeRef) -> Result<PropertyDefinition, TransformError> {
        match type_ref {
            TypeRef::Inline { node, nullable } => {
                if !node.is_inlinable() {
                    return Err(TransformError::InvalidInlineNode {
                        kind: node.kind_name(),
                    });
                }
                let definition = self.emit_node(node)?;
                Ok(if *nullable {
                    into_nullable(definition, null_encoding(self.config))
                } else {
                    definition
                })
            }
            TypeRef::Ref { id, nullable } => {
                let definition = match self.graph.get(id.as_str()) {
                    // A polymorphic use carries its own oneOf; nullable
                    // uses nest it inside a second oneOf below.
                    Some(TypeNode::Polymorphic(polymorphic)) => {
                        self.emit_polymorphic(polymorphic)?
                    }
                    Some(_) => PropertyDefinition::reference(id.as_str()),
                    None if id.is_any() => any_definition(),
                    None => return Err(TransformError::UnresolvedRef(id.to_string())),
                };
                Ok(if *nullable {
                    nullable_use(definition)
                } else {
                    definition
                })
            }
        }
    }

    /// Add the discriminator property to every subtype of a polymorphic node
    /// that asks for it. Runs once all `$defs` exist.
    fn enrich_discriminators(
        &self,
        defs: &mut IndexMap<String, PropertyDefinition>,
    ) -> Result<(), TransformError> {
        for (poly_id, node) in &self.graph.nodes {
            let TypeNode::Polymorphic(polymorphic) = node else {
                continue;
            };
            let Some(discriminator) = polymorphic.discriminator.as_ref().filter(|d| d.required)
            else {
                continue;
            };

            for (value, subtype_id) in mapping_entries(self.graph, polymorphic, discriminator)? {
                let definition = defs
                    .get_mut(subtype_id.as_str())
                    .ok_or_else(|| TransformError::UnresolvedRef(subtype_id.to_string()))?;
                let object = definition.as_object_mut().ok_or_else(|| {
                    TransformError::InvalidDiscriminatorTarget {
                        polymorphic: poly_id.to_string(),
                        subtype: subtype_id.to_string(),
                    }
                })?;
                trace!(
                    "injecting {}={value:?} into $defs/{subtype_id}",
                    discriminator.name
                );
                inject_const(object, &discriminator.name, &value);
            }
        }
        Ok(())
    }
}
