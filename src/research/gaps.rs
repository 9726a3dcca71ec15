//! Coverage gaps and graph-driven gap analysis
//!
//! Gaps are ephemeral: recomputed from the current graph every round,
//! never persisted or mutated. They drive the next round's queries.

use crate::graph::{normalize_label, KnowledgeGraph, NodeKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of deficiency a gap describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// An aspect of the topic with no substantive coverage yet
    UnexploredAspect,
    /// A node with no relations to the rest of the graph
    IsolatedNode,
    /// A whole source type that produced nothing
    SourceGap,
}

/// How urgently a gap should drive the next round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPriority {
    High,
    Medium,
    Low,
}

impl GapPriority {
    /// Lower rank sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            GapPriority::High => 0,
            GapPriority::Medium => 1,
            GapPriority::Low => 2,
        }
    }
}

/// A detected deficiency in what the graph currently represents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageGap {
    pub id: String,
    pub description: String,
    pub kind: GapKind,
    pub related_topics: Vec<String>,
    pub suggested_queries: Vec<String>,
    pub priority: GapPriority,
}

impl CoverageGap {
    pub fn new(kind: GapKind, priority: GapPriority, description: impl Into<String>) -> Self {
        Self {
            id: format!("gap:{}", Uuid::new_v4()),
            description: description.into(),
            kind,
            related_topics: Vec::new(),
            suggested_queries: Vec::new(),
            priority,
        }
    }

    pub fn with_related_topic(mut self, topic: impl Into<String>) -> Self {
        self.related_topics.push(topic.into());
        self
    }

    pub fn with_suggested_query(mut self, query: impl Into<String>) -> Self {
        self.suggested_queries.push(query.into());
        self
    }
}

/// Inspects the graph for unexplored areas.
///
/// Purely graph-local: it never reaches out to external services.
#[derive(Debug, Default)]
pub struct GapAnalyzer;

impl GapAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Ranked coverage gaps for the current graph.
    ///
    /// High-priority gaps sort before medium and low; ties keep
    /// insertion order.
    pub fn analyze(
        &self,
        graph: &dyn KnowledgeGraph,
        topic: &str,
        focus_areas: &[String],
    ) -> Vec<CoverageGap> {
        let nodes = graph.nodes();
        let edges = graph.edges();
        let mut gaps = Vec::new();

        let substantive = nodes.iter().filter(|n| n.kind != NodeKind::Topic).count();
        if substantive == 0 {
            gaps.push(
                CoverageGap::new(
                    GapKind::UnexploredAspect,
                    GapPriority::High,
                    format!("No substantive coverage of {} yet", topic),
                )
                .with_related_topic(topic)
                .with_suggested_query(format!("{} overview", topic))
                .with_suggested_query(format!("{} key concepts", topic)),
            );
        }

        // Nodes with no edges in either direction are dead ends for
        // traversal and likely under-researched.
        for node in nodes.iter().filter(|n| n.kind != NodeKind::Topic) {
            let connected = edges
                .iter()
                .any(|e| e.source == node.id || e.target == node.id);
            if !connected {
                gaps.push(
                    CoverageGap::new(
                        GapKind::IsolatedNode,
                        GapPriority::Medium,
                        format!(
                            "'{}' is isolated from the rest of the graph",
                            node.label
                        ),
                    )
                    .with_related_topic(node.label.clone())
                    .with_suggested_query(format!("{} {}", topic, node.label))
                    .with_suggested_query(format!("{} overview", node.label)),
                );
            }
        }

        // A focus area counts as represented when some node label or
        // string property mentions it.
        for focus in focus_areas {
            if !self.is_represented(graph, focus) {
                gaps.push(
                    CoverageGap::new(
                        GapKind::UnexploredAspect,
                        GapPriority::High,
                        format!("Focus area '{}' is not yet covered", focus),
                    )
                    .with_related_topic(focus.clone())
                    .with_suggested_query(format!("{} {}", topic, focus)),
                );
            }
        }

        gaps.sort_by_key(|g| g.priority.rank());
        gaps
    }

    fn is_represented(&self, graph: &dyn KnowledgeGraph, focus: &str) -> bool {
        let needle = normalize_label(focus);
        if needle.is_empty() {
            return true;
        }
        graph.nodes().iter().any(|node| {
            if node.normalized_label().contains(&needle) {
                return true;
            }
            node.properties.values().any(|value| {
                value
                    .as_str()
                    .map(|s| normalize_label(s).contains(&needle))
                    .unwrap_or(false)
            })
        })
    }
}
