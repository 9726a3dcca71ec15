//! Scry: Iterative Multi-Source Deep Research Engine
//!
//! Given a topic, scry repeatedly searches heterogeneous source types
//! (web, news, academic, encyclopedia), integrates findings into a
//! growing knowledge graph, analyzes the graph for unexplored areas,
//! and stops when novelty converges, a budget runs out, or the user
//! says stop.
//!
//! # Core Concepts
//!
//! - **Findings**: atomic retrieved facts with provenance and quality scores
//! - **Knowledge graph**: topic root, concepts, entities, and findings,
//!   merged by fuzzy label identity
//! - **Convergence**: a scalar over the novelty-rate history that ends
//!   the loop once new rounds stop teaching anything
//!
//! # Example
//!
//! ```no_run
//! use scry::{AgentRegistry, DeepResearchOrchestrator, DeepResearchQuery,
//!            LexicalScorer, MemoryGraph, WideResearchEngine};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), scry::ResearchError> {
//! let scorer = Arc::new(LexicalScorer::new());
//! let registry = AgentRegistry::with_stock_agents(reqwest::Client::new(), scorer);
//! let engine = Arc::new(WideResearchEngine::new(Arc::new(registry)));
//! let graph = Arc::new(MemoryGraph::new());
//!
//! let orchestrator = DeepResearchOrchestrator::new(engine, graph);
//! let result = orchestrator
//!     .run_to_completion(DeepResearchQuery::new("AI ethics"))
//!     .await?;
//! println!("{}", result.summary);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cancel;
pub mod graph;
pub mod research;
pub mod scorer;
pub mod wide;

pub use agent::{
    AgentError, AgentRegistry, AgentSearchQuery, AgentSearchResult, DateRange, Finding,
    FindingId, SearchAgent, SourceStatus, SourceType,
};
pub use cancel::CancellationToken;
pub use graph::{
    Edge, EdgeId, GraphSnapshot, KnowledgeGraph, MemoryGraph, Node, NodeId, NodeKind,
    PropertyValue,
};
pub use research::{
    CompletionReason, ConvergenceDetector, CoverageGap, DeepResearchOrchestrator,
    DeepResearchQuery, DeepResearchResult, FindingIntegrator, GapAnalyzer, GapKind,
    GapPriority, Phase, QueryGenerator, ResearchProgress, ResearchSession, UserGuidance,
};
pub use scorer::{LexicalScorer, RelevanceScorer};
pub use wide::{
    CompletionStatus, CoverageReport, Depth, QueryPlanner, ResearchError, ResultAggregator,
    WideResearchEngine, WideResearchQuery, WideResearchResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
