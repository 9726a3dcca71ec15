//! Shared helpers for integration tests
//!
//! `ScriptedAgent` maps query text (plus a call counter) to canned
//! findings or failures, so loop scenarios are fully deterministic.

use async_trait::async_trait;
use scry::{
    AgentError, AgentSearchQuery, AgentSearchResult, Finding, SearchAgent, SourceType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Responder =
    Box<dyn Fn(&str, usize) -> Result<Vec<Finding>, String> + Send + Sync + 'static>;

pub struct ScriptedAgent {
    source: SourceType,
    responder: Responder,
    calls: AtomicUsize,
}

impl ScriptedAgent {
    pub fn new(
        source: SourceType,
        responder: impl Fn(&str, usize) -> Result<Vec<Finding>, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            source,
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SearchAgent for ScriptedAgent {
    fn id(&self) -> &str {
        "scripted"
    }

    fn name(&self) -> &str {
        "Scripted Agent"
    }

    fn source_type(&self) -> SourceType {
        self.source
    }

    async fn search(&self, query: &AgentSearchQuery) -> Result<AgentSearchResult, AgentError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match (self.responder)(&query.query, call) {
            Ok(findings) => Ok(AgentSearchResult::succeeded(
                findings,
                Duration::from_millis(1),
            )),
            Err(message) => Err(AgentError::Unavailable(message)),
        }
    }
}

/// A web finding with a distinct URL derived from the title.
pub fn web_finding(title: &str) -> Finding {
    let slug: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    Finding::new(
        SourceType::Web,
        title,
        format!("https://example.org/{}", slug.to_lowercase()),
    )
    .with_summary(title)
    .with_relevance(0.7)
    .with_credibility(0.6)
}
