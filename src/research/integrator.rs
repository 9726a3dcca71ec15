//! Folding findings into the knowledge graph
//!
//! Node identity is fuzzy: a finding merges into an existing concept or
//! entity when their normalized labels are similar enough, so the graph
//! grows by consolidation rather than duplication. Re-integrating the
//! same finding is a no-op.

use crate::agent::Finding;
use crate::graph::{Edge, KnowledgeGraph, Node, NodeId, NodeKind, PropertyValue};
use crate::scorer::jaccard;
use tracing::debug;

/// Normalized-label similarity at or above this reuses an existing node.
const LABEL_SIMILARITY_THRESHOLD: f32 = 0.6;

/// How many nodes and edges one integration pass created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrationOutcome {
    pub new_nodes: usize,
    pub new_edges: usize,
}

#[derive(Debug)]
pub struct FindingIntegrator {
    similarity_threshold: f32,
}

impl Default for FindingIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl FindingIntegrator {
    pub fn new() -> Self {
        Self {
            similarity_threshold: LABEL_SIMILARITY_THRESHOLD,
        }
    }

    /// Fold a batch of findings into the graph.
    ///
    /// Creates the topic root on first use, a finding node per novel
    /// finding, a concept node (merged by label similarity), an entity
    /// node per known author, and the connecting edges.
    pub fn integrate(
        &self,
        graph: &dyn KnowledgeGraph,
        findings: &[Finding],
        topic: &str,
    ) -> IntegrationOutcome {
        let mut outcome = IntegrationOutcome::default();
        let root = self.ensure_root(graph, topic, &mut outcome);

        for finding in findings {
            if self.already_integrated(graph, finding) {
                debug!(url = %finding.url, "finding already integrated; skipping");
                continue;
            }

            let finding_node = Node::new(NodeKind::Finding, finding.title.clone())
                .with_property("url", PropertyValue::String(finding.url.clone()))
                .with_property("summary", PropertyValue::String(finding.summary.clone()))
                .with_property(
                    "relevance",
                    PropertyValue::Float(finding.relevance_score as f64),
                )
                .with_property(
                    "credibility",
                    PropertyValue::Float(finding.credibility_score as f64),
                )
                .with_property(
                    "source_type",
                    PropertyValue::String(finding.source_type.as_str().to_string()),
                );
            let finding_id = graph.add_node(finding_node);
            outcome.new_nodes += 1;

            let concept_id =
                self.find_or_create(graph, NodeKind::Concept, &finding.title, &mut outcome);
            self.add_edge_once(graph, finding_id, concept_id, "supports", &mut outcome);
            self.add_edge_once(graph, concept_id, root, "relates_to", &mut outcome);
            self.add_edge_once(graph, finding_id, root, "derived_from", &mut outcome);

            if let Some(author) = &finding.author {
                let entity_id =
                    self.find_or_create(graph, NodeKind::Entity, author, &mut outcome);
                self.add_edge_once(graph, finding_id, entity_id, "authored_by", &mut outcome);
            }
        }

        outcome
    }

    fn ensure_root(
        &self,
        graph: &dyn KnowledgeGraph,
        topic: &str,
        outcome: &mut IntegrationOutcome,
    ) -> NodeId {
        if let Some(root) = graph
            .nodes()
            .into_iter()
            .find(|n| n.kind == NodeKind::Topic)
        {
            return root.id;
        }
        outcome.new_nodes += 1;
        graph.add_node(Node::new(NodeKind::Topic, topic))
    }

    /// A finding is a duplicate when a finding node already carries its
    /// URL or an equivalent title.
    fn already_integrated(&self, graph: &dyn KnowledgeGraph, finding: &Finding) -> bool {
        let title = crate::graph::normalize_label(&finding.title);
        graph
            .nodes()
            .iter()
            .filter(|n| n.kind == NodeKind::Finding)
            .any(|n| {
                n.properties
                    .get("url")
                    .and_then(|v| v.as_str())
                    .map(|url| url == finding.url)
                    .unwrap_or(false)
                    || n.normalized_label() == title
            })
    }

    fn find_or_create(
        &self,
        graph: &dyn KnowledgeGraph,
        kind: NodeKind,
        label: &str,
        outcome: &mut IntegrationOutcome,
    ) -> NodeId {
        let normalized = crate::graph::normalize_label(label);
        let mut best: Option<(NodeId, f32)> = None;
        for node in graph.nodes() {
            if node.kind != kind {
                continue;
            }
            let candidate = node.normalized_label();
            let similarity = if candidate == normalized {
                1.0
            } else {
                jaccard(&candidate, &normalized)
            };
            if similarity >= self.similarity_threshold
                && best.map(|(_, s)| similarity > s).unwrap_or(true)
            {
                best = Some((node.id, similarity));
            }
        }

        match best {
            Some((id, _)) => id,
            None => {
                outcome.new_nodes += 1;
                graph.add_node(Node::new(kind, label))
            }
        }
    }

    fn add_edge_once(
        &self,
        graph: &dyn KnowledgeGraph,
        source: NodeId,
        target: NodeId,
        label: &str,
        outcome: &mut IntegrationOutcome,
    ) {
        let exists = graph
            .edges()
            .iter()
            .any(|e| e.same_relation(&source, &target, label));
        if !exists {
            graph.add_edge(Edge::new(source, target, label));
            outcome.new_edges += 1;
        }
    }
}
