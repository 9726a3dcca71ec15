//! The deep-research orchestration loop and its analytic components

mod convergence;
mod gaps;
mod integrator;
mod orchestrator;
mod queries;
mod types;

pub use convergence::ConvergenceDetector;
pub use gaps::{CoverageGap, GapAnalyzer, GapKind, GapPriority};
pub use integrator::{FindingIntegrator, IntegrationOutcome};
pub use orchestrator::{DeepResearchOrchestrator, ResearchSession};
pub use queries::QueryGenerator;
pub use types::{
    CompletionReason, DeepResearchQuery, DeepResearchResult, GuidanceAction, IterationRecord,
    Phase, ResearchProgress, ResearchStatistics, SourceRef, UserGuidance,
};
