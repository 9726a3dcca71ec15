//! Query generation: initial, gap-driven, and expansion
//!
//! The gap-driven path returning no queries is the loop's natural
//! convergence signal: nothing left worth asking.

use super::gaps::CoverageGap;
use crate::graph::{normalize_label, KnowledgeGraph};

/// Cap on queries produced from gaps in one round.
const MAX_GAP_QUERIES: usize = 10;

#[derive(Debug, Default)]
pub struct QueryGenerator;

impl QueryGenerator {
    pub fn new() -> Self {
        Self
    }

    /// First-round queries: the topic itself, generic expansions, and one
    /// query per focus area. No duplicates.
    pub fn generate_initial(
        &self,
        topic: &str,
        focus_areas: &[String],
        context: Option<&str>,
    ) -> Vec<String> {
        let mut queries = vec![
            topic.to_string(),
            format!("{} overview", topic),
            format!("{} research", topic),
            format!("{} recent developments", topic),
        ];
        for focus in focus_areas {
            queries.push(format!("{} {}", topic, focus));
        }
        if let Some(context) = context {
            if !context.trim().is_empty() {
                queries.push(format!("{} {}", topic, context.trim()));
            }
        }
        dedupe(queries)
    }

    /// Next-round queries from coverage gaps.
    ///
    /// Gaps touching an excluded area are skipped entirely; suggestions
    /// that merely restate an existing node label are dropped; the result
    /// is capped.
    pub fn generate_from_gaps(
        &self,
        gaps: &[CoverageGap],
        graph: &dyn KnowledgeGraph,
        exclude_areas: &[String],
    ) -> Vec<String> {
        let excluded: Vec<String> = exclude_areas
            .iter()
            .map(|e| normalize_label(e))
            .filter(|e| !e.is_empty())
            .collect();
        let known_labels: Vec<String> = graph
            .nodes()
            .iter()
            .map(|n| n.normalized_label())
            .collect();

        let mut queries = Vec::new();
        for gap in gaps {
            let touches_excluded = gap.related_topics.iter().any(|topic| {
                let normalized = normalize_label(topic);
                excluded.contains(&normalized)
            });
            if touches_excluded {
                continue;
            }
            for suggestion in &gap.suggested_queries {
                if known_labels.contains(&normalize_label(suggestion)) {
                    continue;
                }
                queries.push(suggestion.clone());
            }
        }

        let mut queries = dedupe(queries);
        queries.truncate(MAX_GAP_QUERIES);
        queries
    }

    /// Variants of one query for broader recall.
    pub fn expand_query(&self, query: &str) -> Vec<String> {
        dedupe(vec![
            query.to_string(),
            format!("{} definition", query),
            format!("{} examples", query),
            format!("{} explained", query),
        ])
    }
}

fn dedupe(queries: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for query in queries {
        let trimmed = query.trim().to_string();
        if !trimmed.is_empty() && !seen.contains(&trimmed) {
            seen.push(trimmed);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryGraph, Node, NodeKind};
    use crate::research::gaps::{GapKind, GapPriority};

    #[test]
    fn test_initial_queries_contain_topic_verbatim() {
        let queries = QueryGenerator::new().generate_initial("AI ethics", &[], None);
        assert!(queries.contains(&"AI ethics".to_string()));
        assert!(queries.iter().any(|q| q.contains("overview")));
        assert!(queries.iter().any(|q| q.contains("research")));
    }

    #[test]
    fn test_initial_queries_cover_focus_areas_without_duplicates() {
        let focus = vec!["privacy".to_string(), "bias".to_string()];
        let queries = QueryGenerator::new().generate_initial("AI ethics", &focus, None);

        assert!(queries.iter().any(|q| q.contains("privacy")));
        assert!(queries.iter().any(|q| q.contains("bias")));
        let mut unique = queries.clone();
        unique.dedup();
        assert_eq!(unique.len(), queries.len());
    }

    #[test]
    fn test_gap_queries_skip_excluded_areas() {
        let graph = MemoryGraph::new();
        let gaps = vec![
            CoverageGap::new(GapKind::UnexploredAspect, GapPriority::High, "political angle")
                .with_related_topic("politics")
                .with_suggested_query("AI ethics politics"),
            CoverageGap::new(GapKind::UnexploredAspect, GapPriority::High, "technical angle")
                .with_related_topic("engineering")
                .with_suggested_query("AI ethics engineering"),
        ];

        let queries = QueryGenerator::new().generate_from_gaps(
            &gaps,
            &graph,
            &["politics".to_string()],
        );
        assert_eq!(queries, vec!["AI ethics engineering".to_string()]);
    }

    #[test]
    fn test_gap_queries_capped_at_ten() {
        let graph = MemoryGraph::new();
        let gaps: Vec<CoverageGap> = (0..20)
            .map(|i| {
                CoverageGap::new(GapKind::IsolatedNode, GapPriority::Medium, format!("gap {}", i))
                    .with_suggested_query(format!("query number {}", i))
            })
            .collect();

        let queries = QueryGenerator::new().generate_from_gaps(&gaps, &graph, &[]);
        assert_eq!(queries.len(), 10);
    }

    #[test]
    fn test_gap_queries_empty_when_no_gaps() {
        let graph = MemoryGraph::new();
        let queries = QueryGenerator::new().generate_from_gaps(&[], &graph, &[]);
        assert!(queries.is_empty());
    }

    #[test]
    fn test_gap_queries_skip_known_labels() {
        let graph = MemoryGraph::new();
        graph.add_node(Node::new(NodeKind::Concept, "Differential Privacy"));
        let gaps = vec![
            CoverageGap::new(GapKind::IsolatedNode, GapPriority::Medium, "gap")
                .with_suggested_query("differential privacy")
                .with_suggested_query("secure aggregation"),
        ];

        let queries = QueryGenerator::new().generate_from_gaps(&gaps, &graph, &[]);
        assert_eq!(queries, vec!["secure aggregation".to_string()]);
    }

    #[test]
    fn test_expand_query_includes_original_and_variants() {
        let expanded = QueryGenerator::new().expand_query("model cards");
        assert_eq!(expanded[0], "model cards");
        assert!(expanded.iter().any(|q| q.contains("definition")));
        assert!(expanded.iter().any(|q| q.contains("examples")));
    }
}
