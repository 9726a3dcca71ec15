//! Types for one wide-research round

use crate::agent::{DateRange, Finding, SourceStatus, SourceType};
use crate::research::CoverageGap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to the caller.
///
/// Only invalid queries and bad configuration are raised before work
/// begins; everything else is absorbed into coverage and progress data.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("research run was cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

/// How wide the search net is cast when the caller does not pick sources
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Shallow,
    #[default]
    Medium,
    Deep,
}

impl Depth {
    /// Source types implied by this depth.
    pub fn sources(&self) -> Vec<SourceType> {
        match self {
            Depth::Shallow => vec![SourceType::Web],
            Depth::Medium => vec![
                SourceType::Web,
                SourceType::News,
                SourceType::Encyclopedia,
            ],
            Depth::Deep => vec![
                SourceType::Web,
                SourceType::News,
                SourceType::Academic,
                SourceType::Encyclopedia,
            ],
        }
    }
}

impl std::str::FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shallow" => Ok(Depth::Shallow),
            "medium" => Ok(Depth::Medium),
            "deep" => Ok(Depth::Deep),
            other => Err(format!("unknown depth: {}", other)),
        }
    }
}

/// One wide-research round's input.
#[derive(Debug, Clone)]
pub struct WideResearchQuery {
    pub topic: String,
    pub depth: Depth,
    /// Explicit source selection; derived from `depth` when unset
    pub sources: Option<Vec<SourceType>>,
    pub max_parallel_agents: usize,
    pub agent_timeout: Duration,
    pub total_timeout: Duration,
    pub languages: Vec<String>,
    pub date_range: Option<DateRange>,
    pub max_results_per_source: usize,
}

impl WideResearchQuery {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            depth: Depth::default(),
            sources: None,
            max_parallel_agents: 5,
            agent_timeout: Duration::from_secs(30),
            total_timeout: Duration::from_secs(120),
            languages: Vec::new(),
            date_range: None,
            max_results_per_source: 10,
        }
    }

    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_sources(mut self, sources: Vec<SourceType>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// The source types this round will attempt.
    pub fn active_sources(&self) -> Vec<SourceType> {
        self.sources
            .clone()
            .unwrap_or_else(|| self.depth.sources())
    }

    /// Reject malformed queries and unusable configuration before any
    /// agent runs.
    pub fn validate(&self) -> Result<(), ResearchError> {
        if self.topic.trim().is_empty() {
            return Err(ResearchError::InvalidQuery("topic is empty".into()));
        }
        if let Some(range) = &self.date_range {
            if !range.is_valid() {
                return Err(ResearchError::InvalidQuery(
                    "date range starts after it ends".into(),
                ));
            }
        }
        if self.max_parallel_agents == 0 {
            return Err(ResearchError::Configuration(
                "max_parallel_agents must be at least 1".into(),
            ));
        }
        if self.max_results_per_source == 0 {
            return Err(ResearchError::Configuration(
                "max_results_per_source must be at least 1".into(),
            ));
        }
        if self.agent_timeout.is_zero() || self.total_timeout.is_zero() {
            return Err(ResearchError::Configuration(
                "timeouts must be non-zero".into(),
            ));
        }
        if let Some(sources) = &self.sources {
            if sources.is_empty() {
                return Err(ResearchError::Configuration(
                    "explicit source list is empty".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Whether a round got everything, something, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Full,
    Partial,
    Failed,
}

/// Per-agent record of what happened during a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub source_type: SourceType,
    pub status: SourceStatus,
    pub error: Option<String>,
    pub findings_count: usize,
    pub processing_time_ms: u64,
}

/// Statistics over a round's de-duplicated findings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundStats {
    pub average_relevance: f32,
    pub average_credibility: f32,
    pub results_by_source: HashMap<SourceType, usize>,
    pub duplicates_removed: usize,
}

/// Publication-recency spread of a round's findings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemporalSpread {
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    /// Findings published within the last 30 days
    pub recent_count: usize,
    /// Findings published within the last year (including recent)
    pub past_year_count: usize,
    /// Findings with no known publication date
    pub undated_count: usize,
}

/// Coverage report for one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Fraction of attempted source types that succeeded
    pub coverage_rate: f32,
    /// Entropy-like spread across source types and recency buckets, in [0, 1]
    pub perspective_diversity: f32,
    pub temporal: TemporalSpread,
    /// Whole-source failures, phrased as coverage gaps
    pub gaps: Vec<CoverageGap>,
}

/// Everything one wide-research round produced.
#[derive(Debug, Clone)]
pub struct WideResearchResult {
    pub topic: String,
    pub findings: Vec<Finding>,
    pub outcomes: Vec<SourceOutcome>,
    pub stats: RoundStats,
    pub coverage: CoverageReport,
    pub status: CompletionStatus,
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_source_sets_nest() {
        let shallow = Depth::Shallow.sources();
        let medium = Depth::Medium.sources();
        let deep = Depth::Deep.sources();

        assert_eq!(shallow, vec![SourceType::Web]);
        assert!(medium.iter().all(|s| deep.contains(s)));
        assert!(shallow.iter().all(|s| medium.contains(s)));
        assert_eq!(deep.len(), 4);
    }

    #[test]
    fn test_validate_rejects_empty_topic() {
        let query = WideResearchQuery::new("   ");
        assert!(matches!(
            query.validate(),
            Err(ResearchError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_parallelism() {
        let mut query = WideResearchQuery::new("AI ethics");
        query.max_parallel_agents = 0;
        assert!(matches!(
            query.validate(),
            Err(ResearchError::Configuration(_))
        ));
    }

    #[test]
    fn test_explicit_sources_override_depth() {
        let query = WideResearchQuery::new("AI ethics")
            .with_depth(Depth::Deep)
            .with_sources(vec![SourceType::Academic]);
        assert_eq!(query.active_sources(), vec![SourceType::Academic]);
    }
}
