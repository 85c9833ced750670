pub mod codec;
pub mod definition;
pub mod document;
pub mod function_calling;
pub mod string_or_list;

pub use codec::{ShapeKind, decode, encode, sniff_shape};
pub use definition::*;
pub use document::{DRAFT_2020_12, JsonSchemaDefinition};
pub use function_calling::{FunctionCallingSchema, ToolType};
pub use string_or_list::StringOrList;
