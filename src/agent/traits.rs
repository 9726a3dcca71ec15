//! Search agent trait and registry
//!
//! One agent per source type. Agents are independent and swappable; the
//! engine depends only on this contract, never on a particular network API.

use super::types::{AgentError, AgentSearchQuery, AgentSearchResult, SourceType};
use async_trait::async_trait;
use std::sync::Arc;

/// The single capability a search agent provides.
///
/// # Example
///
/// ```ignore
/// struct FixtureAgent;
///
/// #[async_trait]
/// impl SearchAgent for FixtureAgent {
///     fn id(&self) -> &str { "fixture-web" }
///     fn name(&self) -> &str { "Fixture Web Search" }
///     fn source_type(&self) -> SourceType { SourceType::Web }
///
///     async fn search(&self, query: &AgentSearchQuery)
///         -> Result<AgentSearchResult, AgentError> {
///         Ok(AgentSearchResult::succeeded(vec![], Duration::ZERO))
///     }
/// }
/// ```
#[async_trait]
pub trait SearchAgent: Send + Sync {
    /// Unique identifier for this agent
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Which source type this agent serves
    fn source_type(&self) -> SourceType;

    /// Execute one query against this agent's source.
    ///
    /// A failure here is local to the round: the caller records it in
    /// coverage and moves on.
    async fn search(&self, query: &AgentSearchQuery) -> Result<AgentSearchResult, AgentError>;
}

/// Registry of available agents, keyed by source type.
#[derive(Default)]
pub struct AgentRegistry {
    agents: Vec<Arc<dyn SearchAgent>>,
}

impl AgentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { agents: Vec::new() }
    }

    /// Register an agent
    pub fn register<A: SearchAgent + 'static>(&mut self, agent: A) {
        self.agents.push(Arc::new(agent));
    }

    /// Register an already-shared agent
    pub fn register_arc(&mut self, agent: Arc<dyn SearchAgent>) {
        self.agents.push(agent);
    }

    /// The agent serving a source type, if one is registered.
    ///
    /// When several agents claim the same source type, the first
    /// registered wins.
    pub fn agent_for(&self, source_type: SourceType) -> Option<Arc<dyn SearchAgent>> {
        self.agents
            .iter()
            .find(|a| a.source_type() == source_type)
            .cloned()
    }

    /// Source types with at least one registered agent.
    pub fn source_types(&self) -> Vec<SourceType> {
        let mut seen = Vec::new();
        for agent in &self.agents {
            if !seen.contains(&agent.source_type()) {
                seen.push(agent.source_type());
            }
        }
        seen
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
