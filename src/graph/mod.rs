//! Core graph data structures

mod edge;
mod node;
mod store;

pub use edge::{Edge, EdgeId};
pub use node::{normalize_label, Node, NodeId, NodeKind, Properties, PropertyValue};
pub use store::{GraphError, GraphResult, GraphSnapshot, KnowledgeGraph, MemoryGraph};
