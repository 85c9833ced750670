pub mod config;
pub mod error;
pub mod introspect;
pub mod ir;
pub mod schema;
pub mod transform;

use serde::Serialize;

use error::{GenerateError, TransformError};
use introspect::Introspector;
use transform::SchemaTransformer;

/// Chains an [`Introspector`] with a [`SchemaTransformer`].
#[derive(Debug, Clone)]
pub struct SchemaGenerator<I, T> {
    introspector: I,
    transformer: T,
}

impl<I, T> SchemaGenerator<I, T>
where
    I: Introspector,
    T: SchemaTransformer,
{
    pub fn new(introspector: I, transformer: T) -> Self {
        Self {
            introspector,
            transformer,
        }
    }

    /// Introspect `input` and transform the resulting graph.
    pub fn generate(
        &self,
        input: &I::Input,
        root_name: &str,
    ) -> Result<T::Output, GenerateError<I::Error>> {
        let graph = self
            .introspector
            .introspect(input)
            .map_err(GenerateError::Introspect)?;
        Ok(self.transformer.transform(&graph, root_name)?)
    }

    /// Like [`Self::generate`], rendered as pretty-printed JSON.
    pub fn generate_string(
        &self,
        input: &I::Input,
        root_name: &str,
    ) -> Result<String, GenerateError<I::Error>>
    where
        T::Output: Serialize,
    {
        let output = self.generate(input, root_name)?;
        serde_json::to_string_pretty(&output)
            .map_err(|e| GenerateError::Transform(TransformError::Encode(e.to_string())))
    }
}
