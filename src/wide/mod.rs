//! Wide multi-agent search: one round across heterogeneous sources

mod aggregate;
mod coverage;
mod engine;
mod planner;
mod types;

pub use aggregate::ResultAggregator;
pub use coverage::CoverageAnalyzer;
pub use engine::WideResearchEngine;
pub use planner::QueryPlanner;
pub use types::{
    CompletionStatus, CoverageReport, Depth, ResearchError, RoundStats, SourceOutcome,
    TemporalSpread, WideResearchQuery, WideResearchResult,
};
