use indexmap::IndexMap;

use crate::error::TransformError;
use crate::ir::{Discriminator, PolymorphicNode, TypeGraph, TypeId, TypeNode};
use crate::schema::{ObjectPropertyDefinition, SchemaDiscriminator, StringPropertyDefinition, defs_ref};

/// Discriminator value to subtype id, in emission order.
///
/// An explicit mapping is used as-is once every target resolves. Without
/// one, each subtype is tagged with its own node name.
pub(crate) fn mapping_entries(
    graph: &TypeGraph,
    polymorphic: &PolymorphicNode,
    discriminator: &Discriminator,
) -> Result<Vec<(String, TypeId)>, TransformError> {
    if let Some(ref mapping) = discriminator.mapping {
        return mapping
            .iter()
            .map(|(value, id)| match graph.get(id.as_str()) {
                Some(_) => Ok((value.clone(), id.clone())),
                None => Err(TransformError::UnresolvedRef(id.to_string())),
            })
            .collect();
    }

    polymorphic
        .subtypes
        .iter()
        .map(|subtype| {
            let node = graph
                .get(subtype.id.as_str())
                .ok_or_else(|| TransformError::UnresolvedRef(subtype.id.to_string()))?;
            Ok((node_name(node, &subtype.id), subtype.id.clone()))
        })
        .collect()
}

fn node_name(node: &TypeNode, id: &TypeId) -> String {
    match node {
        TypeNode::Object(object) => object.name.clone(),
        TypeNode::Enum(e) => e.name.clone(),
        TypeNode::Polymorphic(p) => p.base_name.clone(),
        TypeNode::Primitive(_) | TypeNode::List(_) | TypeNode::Map(_) => id.to_string(),
    }
}

/// The discriminator value tagging `subtype`, if it has one.
pub(crate) fn value_for<'a>(entries: &'a [(String, TypeId)], subtype: &TypeId) -> Option<&'a str> {
    entries
        .iter()
        .find(|(_, id)| id == subtype)
        .map(|(value, _)| value.as_str())
}

/// Add `"<name>": {"const": "<value>"}` to a subtype schema and require it.
pub(crate) fn inject_const(object: &mut ObjectPropertyDefinition, name: &str, value: &str) {
    object.insert_required(name, StringPropertyDefinition::constant(value).into());
}

/// The wire-facing `{propertyName, mapping}` form.
pub(crate) fn to_schema_discriminator(
    discriminator: &Discriminator,
    entries: &[(String, TypeId)],
) -> SchemaDiscriminator {
    let mapping: IndexMap<String, String> = entries
        .iter()
        .map(|(value, id)| (value.clone(), defs_ref(id.as_str())))
        .collect();
    SchemaDiscriminator {
        property_name: discriminator.name.clone(),
        mapping: if mapping.is_empty() { None } else { Some(mapping) },
    }
}
