//! Types for the deep-research iteration loop

use super::gaps::CoverageGap;
use crate::agent::{DateRange, Finding, SourceType};
use crate::graph::GraphSnapshot;
use crate::wide::{Depth, ResearchError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Where the loop currently is within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Searching,
    Integrating,
    Analyzing,
    WaitingGuidance,
    Completed,
}

/// Transient progress event. Emitted, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchProgress {
    pub iteration: usize,
    pub phase: Phase,
    pub current_query: Option<String>,
    pub total_findings: usize,
    pub novelty_rate: Option<f32>,
    pub convergence_score: Option<f32>,
    pub gaps: Vec<CoverageGap>,
    pub elapsed_ms: u64,
}

/// One completed round. Append-only; immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub queries: Vec<String>,
    pub findings_count: usize,
    pub new_nodes_count: usize,
    pub new_edges_count: usize,
    pub novelty_rate: f32,
    pub duration_ms: u64,
}

/// Whether to keep going after a guidance suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceAction {
    Continue,
    Stop,
}

/// Mid-run steering supplied at a `WaitingGuidance` suspension point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGuidance {
    pub action: GuidanceAction,
    /// Focus areas to add for subsequent rounds
    #[serde(default)]
    pub add_focus_areas: Vec<String>,
    /// Areas to exclude from subsequent query generation
    #[serde(default)]
    pub exclude_areas: Vec<String>,
}

impl UserGuidance {
    pub fn proceed() -> Self {
        Self {
            action: GuidanceAction::Continue,
            add_focus_areas: Vec::new(),
            exclude_areas: Vec::new(),
        }
    }

    pub fn stop() -> Self {
        Self {
            action: GuidanceAction::Stop,
            add_focus_areas: Vec::new(),
            exclude_areas: Vec::new(),
        }
    }
}

/// Why the loop ended. Every exit path sets exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    Converged,
    MaxIterations,
    Timeout,
    UserStopped,
}

/// Whole-run statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchStatistics {
    pub total_queries: usize,
    pub total_findings: usize,
    pub total_nodes_created: usize,
    pub total_edges_created: usize,
    pub findings_by_source: HashMap<SourceType, usize>,
    pub duration_ms: u64,
}

/// A cited source in the final report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub source_type: SourceType,
}

/// The terminal artifact of a research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepResearchResult {
    pub topic: String,
    pub graph: GraphSnapshot,
    pub summary: String,
    /// At most ten findings, ranked by relevance and credibility
    pub key_findings: Vec<Finding>,
    pub sources: Vec<SourceRef>,
    pub iterations: Vec<IterationRecord>,
    pub remaining_gaps: Vec<CoverageGap>,
    pub statistics: ResearchStatistics,
    pub completion_reason: CompletionReason,
}

/// Input to a deep-research run.
#[derive(Debug, Clone)]
pub struct DeepResearchQuery {
    pub topic: String,
    pub focus_areas: Vec<String>,
    pub exclude_areas: Vec<String>,
    /// Optional free-text context appended to initial query generation
    pub context: Option<String>,
    pub depth: Depth,
    /// Explicit source selection; derived from `depth` when unset
    pub sources: Option<Vec<SourceType>>,
    pub max_iterations: usize,
    /// Allowed residual novelty; lower demands more saturation
    pub convergence_threshold: f32,
    /// Suspend for guidance between rounds while gaps remain
    pub interactive: bool,
    /// Run-level wall-clock budget
    pub total_timeout: Duration,
    /// Soft per-round budget; sizes each round's internal timeouts
    pub iteration_timeout: Duration,
    pub agent_timeout: Duration,
    pub max_parallel_agents: usize,
    pub languages: Vec<String>,
    pub date_range: Option<DateRange>,
    pub max_results_per_source: usize,
}

impl DeepResearchQuery {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            focus_areas: Vec::new(),
            exclude_areas: Vec::new(),
            context: None,
            depth: Depth::default(),
            sources: None,
            max_iterations: 5,
            convergence_threshold: 0.2,
            interactive: false,
            total_timeout: Duration::from_secs(600),
            iteration_timeout: Duration::from_secs(60),
            agent_timeout: Duration::from_secs(30),
            max_parallel_agents: 5,
            languages: Vec::new(),
            date_range: None,
            max_results_per_source: 10,
        }
    }

    pub fn with_focus_areas(mut self, areas: Vec<String>) -> Self {
        self.focus_areas = areas;
        self
    }

    pub fn with_exclude_areas(mut self, areas: Vec<String>) -> Self {
        self.exclude_areas = areas;
        self
    }

    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_convergence_threshold(mut self, threshold: f32) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Reject malformed queries and unusable configuration before the
    /// first round.
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
        if self.max_iterations == 0 {
            return Err(ResearchError::Configuration(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.convergence_threshold) {
            return Err(ResearchError::Configuration(
                "convergence_threshold must be within [0, 1]".into(),
            ));
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
        if self.total_timeout.is_zero()
            || self.iteration_timeout.is_zero()
            || self.agent_timeout.is_zero()
        {
            return Err(ResearchError::Configuration(
                "timeouts must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
