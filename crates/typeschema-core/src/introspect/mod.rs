//! The seam through which type graphs enter the core.
//!
//! Host-language front-ends (reflection walkers, compile-time processors)
//! implement [`Introspector`]. [`SerializedGraphIntrospector`] covers graphs
//! that were produced elsewhere and written out as YAML or JSON.

use crate::error::IntrospectError;
use crate::ir::TypeGraph;

/// Produces a [`TypeGraph`] from some description of a type.
pub trait Introspector {
    type Input: ?Sized;
    type Error: std::error::Error + 'static;

    fn introspect(&self, input: &Self::Input) -> Result<TypeGraph, Self::Error>;
}

/// Text encodings a serialized type graph can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Yaml,
    Json,
}

impl GraphFormat {
    /// Guess the format from a file extension; anything but `json` is YAML.
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("json") {
            GraphFormat::Json
        } else {
            GraphFormat::Yaml
        }
    }
}

/// Reads a serialized type graph and checks its referential integrity.
#[derive(Debug, Clone, Copy)]
pub struct SerializedGraphIntrospector {
    format: GraphFormat,
}

impl SerializedGraphIntrospector {
    pub fn new(format: GraphFormat) -> Self {
        Self { format }
    }
}

impl Introspector for SerializedGraphIntrospector {
    type Input = str;
    type Error = IntrospectError;

    fn introspect(&self, input: &str) -> Result<TypeGraph, IntrospectError> {
        match self.format {
            GraphFormat::Yaml => from_yaml(input),
            GraphFormat::Json => from_json(input),
        }
    }
}

/// Parse and validate a type graph from YAML.
pub fn from_yaml(input: &str) -> Result<TypeGraph, IntrospectError> {
    let graph: TypeGraph = serde_yaml_ng::from_str(input)?;
    graph.validate()?;
    Ok(graph)
}

/// Parse and validate a type graph from JSON.
pub fn from_json(input: &str) -> Result<TypeGraph, IntrospectError> {
    let graph: TypeGraph = serde_json::from_str(input)?;
    graph.validate()?;
    Ok(graph)
}
