//! Search agents, one per source type
//!
//! Agents are polymorphic over a single capability: `search(query)`.
//! The stock implementations call public JSON APIs; callers can register
//! their own implementations for any source type.

mod academic;
mod encyclopedia;
mod news;
mod traits;
mod types;
mod web;

pub use academic::AcademicSearchAgent;
pub use encyclopedia::EncyclopediaSearchAgent;
pub use news::NewsSearchAgent;
pub use traits::{AgentRegistry, SearchAgent};
pub use types::{
    AgentError, AgentSearchQuery, AgentSearchResult, DateRange, Finding, FindingId, SourceStatus,
    SourceType,
};
pub use web::WebSearchAgent;

use crate::scorer::RelevanceScorer;
use std::sync::Arc;

impl AgentRegistry {
    /// Registry with the four stock HTTP agents sharing one client and
    /// one scorer.
    pub fn with_stock_agents(
        client: reqwest::Client,
        scorer: Arc<dyn RelevanceScorer>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(WebSearchAgent::new(client.clone(), scorer.clone()));
        registry.register(NewsSearchAgent::new(client.clone(), scorer.clone()));
        registry.register(AcademicSearchAgent::new(client.clone(), scorer.clone()));
        registry.register(EncyclopediaSearchAgent::new(client, scorer));
        registry
    }
}
