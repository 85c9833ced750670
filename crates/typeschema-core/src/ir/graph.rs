use std::borrow::Borrow;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::nodes::{PrimitiveKind, PrimitiveNode, TypeNode};
use crate::error::IntrospectError;

/// Id of the fallback node introspectors use for types they cannot
/// describe. Refs to it are allowed to dangle.
pub const ANY_TYPE_ID: &str = "Any";

/// Key naming a non-inline node within one graph. Doubles as the `$defs`
/// key and the `$ref` target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_any(&self) -> bool {
        self.0 == ANY_TYPE_ID
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TypeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TypeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A use of a type, carrying the nullability of that particular use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Ref {
        #[serde(rename = "ref")]
        id: TypeId,
        #[serde(default, skip_serializing_if = "is_false")]
        nullable: bool,
    },
    Inline {
        #[serde(rename = "inline")]
        node: Box<TypeNode>,
        #[serde(default, skip_serializing_if = "is_false")]
        nullable: bool,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TypeRef {
    /// A non-nullable reference to a named node.
    pub fn to(id: impl Into<TypeId>) -> Self {
        TypeRef::Ref {
            id: id.into(),
            nullable: false,
        }
    }

    /// A non-nullable inline node.
    pub fn inline(node: TypeNode) -> Self {
        TypeRef::Inline {
            node: Box::new(node),
            nullable: false,
        }
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::inline(TypeNode::Primitive(PrimitiveNode { kind }))
    }

    pub fn with_nullable(self, nullable: bool) -> Self {
        match self {
            TypeRef::Ref { id, .. } => TypeRef::Ref { id, nullable },
            TypeRef::Inline { node, .. } => TypeRef::Inline { node, nullable },
        }
    }

    pub fn nullable(self) -> Self {
        self.with_nullable(true)
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            TypeRef::Ref { nullable, .. } | TypeRef::Inline { nullable, .. } => *nullable,
        }
    }
}

/// The intermediate representation handed from introspectors to transformers.
///
/// `nodes` keeps discovery order, which becomes `$defs` order in the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeGraph {
    pub root: TypeRef,
    #[serde(default)]
    pub nodes: IndexMap<TypeId, TypeNode>,
}

impl TypeGraph {
    pub fn new(root: TypeRef, nodes: IndexMap<TypeId, TypeNode>) -> Self {
        Self { root, nodes }
    }

    pub fn get(&self, id: &str) -> Option<&TypeNode> {
        self.nodes.get(id)
    }

    /// Document name to use when the caller has none: the root's id.
    pub fn default_root_name(&self) -> String {
        match &self.root {
            TypeRef::Ref { id, .. } => id.to_string(),
            TypeRef::Inline { node, .. } => node.kind_name().to_string(),
        }
    }

    /// Every id referenced from the root or from any node, in discovery order.
    pub fn referenced_ids(&self) -> IndexSet<TypeId> {
        let mut ids = IndexSet::new();
        let mut visit = |type_ref: &TypeRef, _: &str| {
            if let TypeRef::Ref { id, .. } = type_ref {
                ids.insert(id.clone());
            }
        };
        self.walk_refs(&mut visit);
        for node in self.nodes.values() {
            if let TypeNode::Polymorphic(poly) = node {
                for subtype in &poly.subtypes {
                    ids.insert(subtype.id.clone());
                }
            }
        }
        ids
    }

    /// Check referential integrity, collecting every problem found.
    pub fn validate(&self) -> Result<(), IntrospectError> {
        let mut problems = Vec::new();

        let mut check = |type_ref: &TypeRef, site: &str| match type_ref {
            TypeRef::Ref { id, .. } => {
                if !id.is_any() && !self.nodes.contains_key(id) {
                    problems.push(format!("dangling reference '{id}' at {site}"));
                }
            }
            TypeRef::Inline { node, .. } => {
                if !node.is_inlinable() {
                    problems.push(format!("{} node inlined at {site}", node.kind_name()));
                }
            }
        };
        self.walk_refs(&mut check);

        for (id, node) in &self.nodes {
            if let TypeNode::Polymorphic(poly) = node {
                for subtype in &poly.subtypes {
                    if !self.nodes.contains_key(&subtype.id) {
                        problems.push(format!("dangling subtype '{}' of '{id}'", subtype.id));
                    }
                }
                let targets = poly
                    .discriminator
                    .as_ref()
                    .and_then(|d| d.mapping.as_ref())
                    .into_iter()
                    .flat_map(|m| m.values());
                for target in targets {
                    if !self.nodes.contains_key(target) {
                        problems.push(format!(
                            "discriminator of '{id}' maps to unknown type '{target}'"
                        ));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(IntrospectError::InvalidGraph { problems })
        }
    }

    /// Visit every [`TypeRef`] in the graph, nested inline refs included.
    fn walk_refs(&self, visit: &mut impl FnMut(&TypeRef, &str)) {
        walk_ref(&self.root, "root", visit);
        for (id, node) in &self.nodes {
            walk_node(node, id.as_str(), visit);
        }
    }
}

fn walk_ref(type_ref: &TypeRef, site: &str, visit: &mut impl FnMut(&TypeRef, &str)) {
    visit(type_ref, site);
    if let TypeRef::Inline { node, .. } = type_ref {
        walk_node(node, site, visit);
    }
}

fn walk_node(node: &TypeNode, site: &str, visit: &mut impl FnMut(&TypeRef, &str)) {
    match node {
        TypeNode::Primitive(_) | TypeNode::Enum(_) | TypeNode::Polymorphic(_) => {}
        TypeNode::List(list) => walk_ref(&list.element, &format!("{site}[]"), visit),
        TypeNode::Map(map) => {
            walk_ref(&map.key, &format!("{site}{{key}}"), visit);
            walk_ref(&map.value, &format!("{site}{{value}}"), visit);
        }
        TypeNode::Object(object) => {
            for property in &object.properties {
                walk_ref(
                    &property.type_ref,
                    &format!("{site}.{}", property.name),
                    visit,
                );
            }
        }
    }
}
