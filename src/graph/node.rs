//! Node representation in the research knowledge graph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new random NodeId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a NodeId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node role in the research graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The research topic root. Exactly one per run.
    Topic,
    /// An abstract concept distilled from findings
    Concept,
    /// A named entity (person, organization, work)
    Entity,
    /// One retrieved finding with provenance
    Finding,
}

/// Typed property values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Get the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Properties collection
pub type Properties = HashMap<String, PropertyValue>;

/// A node in the knowledge graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Role of the node in the research graph
    pub kind: NodeKind,
    /// Human-readable label (topic name, concept phrase, finding title)
    pub label: String,
    /// Domain-specific properties
    pub properties: Properties,
    /// When the node was created
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Create a new node with the given kind and label
    pub fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            label: label.into(),
            properties: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Add a property to the node
    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Label lowered and stripped of punctuation, for similarity matching
    pub fn normalized_label(&self) -> String {
        normalize_label(&self.label)
    }
}

/// Normalize a label for fuzzy matching: lowercase, punctuation stripped,
/// whitespace collapsed.
pub fn normalize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut last_was_space = true;
    for ch in label.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_builder() {
        let node = Node::new(NodeKind::Concept, "Differential Privacy")
            .with_property("weight", PropertyValue::Float(0.8));
        assert_eq!(node.kind, NodeKind::Concept);
        assert_eq!(node.label, "Differential Privacy");
        assert_eq!(
            node.properties.get("weight"),
            Some(&PropertyValue::Float(0.8))
        );
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("AI Ethics!"), "ai ethics");
        assert_eq!(
            normalize_label("  Multi--Agent   Systems  "),
            "multi agent systems"
        );
        assert_eq!(normalize_label("GPT-4"), "gpt 4");
    }
}
