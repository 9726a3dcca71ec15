//! Directed, labeled edges between graph nodes

use super::node::NodeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(Uuid);

impl EdgeId {
    /// Create a new random EdgeId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed relation between two nodes.
///
/// Created alongside nodes when a finding is attributed to or derived
/// from another node (e.g. finding → topic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub id: EdgeId,
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Type of relationship (e.g. "supports", "derived_from", "relates_to")
    pub label: String,
    /// When the edge was created
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Create a new edge
    pub fn new(source: NodeId, target: NodeId, label: impl Into<String>) -> Self {
        Self {
            id: EdgeId::new(),
            source,
            target,
            label: label.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether this edge connects the same pair with the same label
    pub fn same_relation(&self, source: &NodeId, target: &NodeId, label: &str) -> bool {
        &self.source == source && &self.target == target && self.label == label
    }
}
