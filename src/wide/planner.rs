//! Per-source query rewriting
//!
//! Each source type wants a differently shaped query: academic indexes
//! choke on conversational filler, encyclopedias match best on a bare
//! head phrase. The planner owns those rewrites so agents stay thin.

use super::types::WideResearchQuery;
use crate::agent::{AgentSearchQuery, SourceType};

/// Conversational filler that hurts scholarly search relevance.
const ACADEMIC_FILLERS: &[&str] = &[
    "latest", "recent", "about", "what", "is", "are", "how", "why", "the", "a", "an", "of",
];

/// Encyclopedic queries are truncated to this many leading tokens.
const ENCYCLOPEDIA_HEAD_TOKENS: usize = 3;

/// Rewrites a topic into per-source-type optimized query strings.
#[derive(Debug, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    pub fn new() -> Self {
        Self
    }

    /// The query string an agent of the given source type should run.
    pub fn plan(&self, topic: &str, source_type: SourceType) -> String {
        let topic = topic.trim();
        match source_type {
            SourceType::Web | SourceType::News => topic.to_string(),
            SourceType::Academic => strip_fillers(topic),
            SourceType::Encyclopedia => head_phrase(topic, ENCYCLOPEDIA_HEAD_TOKENS),
        }
    }

    /// Full agent query for one source within a round.
    pub fn build_agent_query(
        &self,
        round: &WideResearchQuery,
        source_type: SourceType,
    ) -> AgentSearchQuery {
        let mut query = AgentSearchQuery::new(self.plan(&round.topic, source_type));
        query.max_results = round.max_results_per_source;
        query.languages = round.languages.clone();
        query.date_range = round.date_range;
        query.timeout = round.agent_timeout;
        query
    }
}

fn strip_fillers(topic: &str) -> String {
    let kept: Vec<&str> = topic
        .split_whitespace()
        .filter(|word| {
            let lowered = word.to_lowercase();
            let bare = lowered.trim_matches(|c: char| !c.is_alphanumeric());
            !ACADEMIC_FILLERS.contains(&bare)
        })
        .collect();
    if kept.is_empty() {
        // Everything was filler; better to pass the topic through than
        // send an empty query.
        topic.to_string()
    } else {
        kept.join(" ")
    }
}

fn head_phrase(topic: &str, max_tokens: usize) -> String {
    topic
        .split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}
