mod discriminator;
mod emit;
pub mod function_calling;
pub mod json_schema;

pub use function_calling::FunctionCallingTransformer;
pub use json_schema::JsonSchemaTransformer;

use crate::error::TransformError;
use crate::ir::TypeGraph;

/// A transformer from a type graph to one schema flavor.
///
/// Implementations hold only immutable configuration; all per-call state
/// lives inside `transform`, so one instance can serve many threads.
pub trait SchemaTransformer {
    type Output;

    fn transform(&self, graph: &TypeGraph, root_name: &str)
    -> Result<Self::Output, TransformError>;
}
