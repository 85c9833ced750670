pub mod graph;
pub mod nodes;

pub use graph::{ANY_TYPE_ID, TypeGraph, TypeId, TypeRef};
pub use nodes::*;
