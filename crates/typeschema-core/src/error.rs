use thiserror::Error;

/// Errors produced while turning a type graph into a schema document.
///
/// Every variant points at a bug in the producer of the graph or in the
/// transformer itself, never at user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("unresolved type reference: {0}")]
    UnresolvedRef(String),

    #[error("root must be object for tool schema, got {0}")]
    InvalidRoot(String),

    #[error("{kind} node cannot be inlined, it must be referenced by id")]
    InvalidInlineNode { kind: &'static str },

    #[error("cyclic reference through '{0}' cannot be inlined")]
    CyclicReference(String),

    #[error("discriminator mapping of '{polymorphic}' points at '{subtype}', which is not an object")]
    InvalidDiscriminatorTarget {
        polymorphic: String,
        subtype: String,
    },

    #[error("failed to encode schema document: {0}")]
    Encode(String),
}

/// Errors raised while building or decoding schema documents.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{kind} property cannot take a default of JSON type {found}")]
    InvalidDefault {
        kind: &'static str,
        found: &'static str,
    },

    #[error("{kind} property cannot take a const of JSON type {found}")]
    InvalidConst {
        kind: &'static str,
        found: &'static str,
    },

    #[error("property definition must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("failed to decode schema document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by introspectors while producing a type graph.
#[derive(Debug, Error)]
pub enum IntrospectError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid type graph: {}", problems.join("; "))]
    InvalidGraph { problems: Vec<String> },
}

/// Errors surfaced by [`crate::SchemaGenerator`], which chains both phases.
#[derive(Debug, Error)]
pub enum GenerateError<E: std::error::Error + 'static> {
    #[error("introspection failed: {0}")]
    Introspect(#[source] E),

    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),
}
