//! Knowledge graph storage boundary
//!
//! The engine treats the graph as an injectable collaborator, not an owned
//! storage layer. `MemoryGraph` is the default in-process implementation;
//! callers with persistence needs implement `KnowledgeGraph` themselves.

use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from graph operations
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Node/edge CRUD boundary the research engine depends on.
///
/// Mutation happens only between search rounds, never concurrently with
/// one, so implementations need interior mutability but no transactional
/// guarantees.
pub trait KnowledgeGraph: Send + Sync {
    /// Insert a node, returning its id.
    fn add_node(&self, node: Node) -> NodeId;

    /// Insert an edge, returning its id.
    fn add_edge(&self, edge: Edge) -> EdgeId;

    /// Fetch a node by id.
    fn get_node(&self, id: &NodeId) -> Option<Node>;

    /// All nodes, in no particular order.
    fn nodes(&self) -> Vec<Node>;

    /// All edges, in no particular order.
    fn edges(&self) -> Vec<Edge>;

    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Number of edges.
    fn edge_count(&self) -> usize;
}

/// A serializable point-in-time copy of the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Capture the current state of any graph implementation.
    pub fn capture(graph: &dyn KnowledgeGraph) -> Self {
        Self {
            nodes: graph.nodes(),
            edges: graph.edges(),
        }
    }
}

/// In-memory graph store.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    nodes: DashMap<NodeId, Node>,
    edges: DashMap<EdgeId, Edge>,
}

impl MemoryGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
            edges: DashMap::new(),
        }
    }
}

impl KnowledgeGraph for MemoryGraph {
    fn add_node(&self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    fn add_edge(&self, edge: Edge) -> EdgeId {
        let id = edge.id;
        self.edges.insert(id, edge);
        id
    }

    fn get_node(&self, id: &NodeId) -> Option<Node> {
        self.nodes.get(id).map(|r| r.clone())
    }

    fn nodes(&self) -> Vec<Node> {
        self.nodes.iter().map(|r| r.value().clone()).collect()
    }

    fn edges(&self) -> Vec<Edge> {
        self.edges.iter().map(|r| r.value().clone()).collect()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
