//! One wide-research round
//!
//! Plans per-source queries, fans agents out under bounded parallelism,
//! and aggregates only after every agent has settled or the round
//! deadline fires. Agent failure degrades coverage; it never aborts the
//! round.

use super::aggregate::ResultAggregator;
use super::coverage::CoverageAnalyzer;
use super::planner::QueryPlanner;
use super::types::{
    CompletionStatus, ResearchError, SourceOutcome, WideResearchQuery, WideResearchResult,
};
use crate::agent::{AgentRegistry, Finding, SourceStatus, SourceType};
use crate::cancel::CancellationToken;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

type AgentOutcome = (SourceType, SourceStatus, Option<String>, Duration, Vec<Finding>);

pub struct WideResearchEngine {
    registry: Arc<AgentRegistry>,
    planner: QueryPlanner,
    aggregator: ResultAggregator,
    analyzer: CoverageAnalyzer,
}

impl WideResearchEngine {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            registry,
            planner: QueryPlanner::new(),
            aggregator: ResultAggregator::new(),
            analyzer: CoverageAnalyzer::new(),
        }
    }

    /// Source types with a registered agent.
    pub fn available_sources(&self) -> Vec<SourceType> {
        self.registry.source_types()
    }

    /// Run one round to completion.
    pub async fn research(
        &self,
        query: &WideResearchQuery,
    ) -> Result<WideResearchResult, ResearchError> {
        self.research_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// Run one round under an externally owned cancellation token.
    ///
    /// Cancellation aborts in-flight agent calls and returns
    /// `ResearchError::Cancelled`; a round timeout instead truncates the
    /// round and returns what settled in time.
    pub async fn research_with_cancel(
        &self,
        query: &WideResearchQuery,
        token: &CancellationToken,
    ) -> Result<WideResearchResult, ResearchError> {
        query.validate()?;
        if token.is_cancelled() {
            return Err(ResearchError::Cancelled);
        }

        let mut sources: Vec<SourceType> = Vec::new();
        for source in query.active_sources() {
            if !sources.contains(&source) && self.registry.agent_for(source).is_some() {
                sources.push(source);
            }
        }
        if sources.is_empty() {
            return Err(ResearchError::Configuration(
                "no agents registered for the requested sources".into(),
            ));
        }

        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(query.max_parallel_agents));
        let mut tasks: JoinSet<AgentOutcome> = JoinSet::new();

        for source in &sources {
            let Some(agent) = self.registry.agent_for(*source) else {
                continue;
            };
            let agent_query = self.planner.build_agent_query(query, *source);
            let semaphore = semaphore.clone();
            let token = token.clone();
            let source = *source;

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            source,
                            SourceStatus::Failed,
                            Some("scheduler shut down".to_string()),
                            Duration::ZERO,
                            Vec::new(),
                        )
                    }
                };
                if token.is_cancelled() {
                    return (
                        source,
                        SourceStatus::Failed,
                        Some("cancelled before start".to_string()),
                        Duration::ZERO,
                        Vec::new(),
                    );
                }

                let call_started = Instant::now();
                match tokio::time::timeout(agent_query.timeout, agent.search(&agent_query)).await
                {
                    Ok(Ok(result)) => (
                        source,
                        result.status,
                        result.error,
                        result.processing_time,
                        result.findings,
                    ),
                    Ok(Err(e)) => {
                        warn!(source = %source, error = %e, "search agent failed");
                        (
                            source,
                            SourceStatus::Failed,
                            Some(e.to_string()),
                            call_started.elapsed(),
                            Vec::new(),
                        )
                    }
                    Err(_) => {
                        warn!(source = %source, "search agent timed out");
                        (source, SourceStatus::TimedOut, None, call_started.elapsed(), Vec::new())
                    }
                }
            });
        }

        let mut outcomes: Vec<SourceOutcome> = Vec::with_capacity(sources.len());
        let mut batches: Vec<Vec<Finding>> = Vec::new();
        let mut round_timed_out = false;

        let round_deadline = tokio::time::sleep(query.total_timeout);
        tokio::pin!(round_deadline);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tasks.abort_all();
                    return Err(ResearchError::Cancelled);
                }
                _ = &mut round_deadline => {
                    warn!(topic = %query.topic, "round timeout; cancelling outstanding agents");
                    tasks.abort_all();
                    round_timed_out = true;
                    break;
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((source, status, error, processing_time, findings))) => {
                        outcomes.push(SourceOutcome {
                            source_type: source,
                            status,
                            error,
                            findings_count: findings.len(),
                            processing_time_ms: processing_time.as_millis() as u64,
                        });
                        batches.push(findings);
                    }
                    Some(Err(join_error)) => {
                        warn!(error = %join_error, "agent task ended abnormally");
                    }
                }
            }
        }

        // Agents cut off by the round deadline are recorded as timed out.
        for source in &sources {
            if !outcomes.iter().any(|o| o.source_type == *source) {
                outcomes.push(SourceOutcome {
                    source_type: *source,
                    status: SourceStatus::TimedOut,
                    error: Some("round timeout".to_string()),
                    findings_count: 0,
                    processing_time_ms: query.total_timeout.as_millis() as u64,
                });
            }
        }

        // Aggregation is a single step strictly after all agents settled.
        let (findings, stats) = self.aggregator.aggregate(batches);
        let coverage = self.analyzer.analyze(&query.topic, &outcomes, &findings);

        let succeeded = outcomes
            .iter()
            .filter(|o| o.status == SourceStatus::Succeeded)
            .count();
        let status = if succeeded == 0 {
            CompletionStatus::Failed
        } else if succeeded == outcomes.len() && !round_timed_out {
            CompletionStatus::Full
        } else {
            CompletionStatus::Partial
        };

        debug!(
            topic = %query.topic,
            findings = findings.len(),
            status = ?status,
            "wide research round complete"
        );

        Ok(WideResearchResult {
            topic: query.topic.clone(),
            findings,
            outcomes,
            stats,
            coverage,
            status,
            duration: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{
        AgentError, AgentSearchQuery, AgentSearchResult, SearchAgent,
    };
    use async_trait::async_trait;

    struct StaticAgent {
        source: SourceType,
        titles: Vec<&'static str>,
    }

    #[async_trait]
    impl SearchAgent for StaticAgent {
        fn id(&self) -> &str {
            "static"
        }
        fn name(&self) -> &str {
            "Static Agent"
        }
        fn source_type(&self) -> SourceType {
            self.source
        }
        async fn search(
            &self,
            _query: &AgentSearchQuery,
        ) -> Result<AgentSearchResult, AgentError> {
            let findings = self
                .titles
                .iter()
                .map(|t| {
                    Finding::new(self.source, *t, format!("https://example.org/{}", t))
                        .with_summary(*t)
                })
                .collect();
            Ok(AgentSearchResult::succeeded(findings, Duration::from_millis(5)))
        }
    }

    struct FailingAgent {
        source: SourceType,
    }

    #[async_trait]
    impl SearchAgent for FailingAgent {
        fn id(&self) -> &str {
            "failing"
        }
        fn name(&self) -> &str {
            "Failing Agent"
        }
        fn source_type(&self) -> SourceType {
            self.source
        }
        async fn search(
            &self,
            _query: &AgentSearchQuery,
        ) -> Result<AgentSearchResult, AgentError> {
            Err(AgentError::Unavailable("backend offline".into()))
        }
    }

    struct HangingAgent {
        source: SourceType,
    }

    #[async_trait]
    impl SearchAgent for HangingAgent {
        fn id(&self) -> &str {
            "hanging"
        }
        fn name(&self) -> &str {
            "Hanging Agent"
        }
        fn source_type(&self) -> SourceType {
            self.source
        }
        async fn search(
            &self,
            _query: &AgentSearchQuery,
        ) -> Result<AgentSearchResult, AgentError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(AgentSearchResult::succeeded(Vec::new(), Duration::ZERO))
        }
    }

    fn query_for(sources: Vec<SourceType>) -> WideResearchQuery {
        WideResearchQuery::new("AI ethics").with_sources(sources)
    }

    #[tokio::test]
    async fn test_round_with_one_failed_source_is_partial() {
        let mut registry = AgentRegistry::new();
        registry.register(StaticAgent {
            source: SourceType::Web,
            titles: vec!["Fairness metrics overview"],
        });
        registry.register(FailingAgent {
            source: SourceType::News,
        });
        let engine = WideResearchEngine::new(Arc::new(registry));

        let result = engine
            .research(&query_for(vec![SourceType::Web, SourceType::News]))
            .await
            .unwrap();

        assert_eq!(result.status, CompletionStatus::Partial);
        assert_eq!(result.findings.len(), 1);
        let failed = result
            .outcomes
            .iter()
            .find(|o| o.source_type == SourceType::News)
            .unwrap();
        assert_eq!(failed.status, SourceStatus::Failed);
        assert!(failed.error.as_deref().unwrap().contains("backend offline"));
    }

    #[tokio::test]
    async fn test_all_sources_failing_is_failed_not_error() {
        let mut registry = AgentRegistry::new();
        registry.register(FailingAgent {
            source: SourceType::Web,
        });
        let engine = WideResearchEngine::new(Arc::new(registry));

        let result = engine.research(&query_for(vec![SourceType::Web])).await.unwrap();
        assert_eq!(result.status, CompletionStatus::Failed);
        assert!(result.findings.is_empty());
    }

    #[tokio::test]
    async fn test_all_sources_succeeding_is_full() {
        let mut registry = AgentRegistry::new();
        registry.register(StaticAgent {
            source: SourceType::Web,
            titles: vec!["Fairness metrics overview"],
        });
        registry.register(StaticAgent {
            source: SourceType::Encyclopedia,
            titles: vec!["History of machine ethics"],
        });
        let engine = WideResearchEngine::new(Arc::new(registry));

        let result = engine
            .research(&query_for(vec![SourceType::Web, SourceType::Encyclopedia]))
            .await
            .unwrap();
        assert_eq!(result.status, CompletionStatus::Full);
        assert_eq!(result.findings.len(), 2);
        assert!((result.coverage.coverage_rate - 1.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_agent_timeout_recorded_not_fatal() {
        let mut registry = AgentRegistry::new();
        registry.register(StaticAgent {
            source: SourceType::Web,
            titles: vec!["Fairness metrics overview"],
        });
        registry.register(HangingAgent {
            source: SourceType::News,
        });
        let engine = WideResearchEngine::new(Arc::new(registry));

        let mut query = query_for(vec![SourceType::Web, SourceType::News]);
        query.agent_timeout = Duration::from_secs(1);

        let result = engine.research(&query).await.unwrap();
        assert_eq!(result.status, CompletionStatus::Partial);
        let hung = result
            .outcomes
            .iter()
            .find(|o| o.source_type == SourceType::News)
            .unwrap();
        assert_eq!(hung.status, SourceStatus::TimedOut);
    }

    #[tokio::test]
    async fn test_invalid_query_rejected_before_running() {
        let registry = AgentRegistry::new();
        let engine = WideResearchEngine::new(Arc::new(registry));

        let err = engine
            .research(&WideResearchQuery::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_no_agents_is_configuration_error() {
        let registry = AgentRegistry::new();
        let engine = WideResearchEngine::new(Arc::new(registry));

        let err = engine
            .research(&query_for(vec![SourceType::Web]))
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_pre_cancelled_round_aborts() {
        let mut registry = AgentRegistry::new();
        registry.register(StaticAgent {
            source: SourceType::Web,
            titles: vec!["anything"],
        });
        let engine = WideResearchEngine::new(Arc::new(registry));

        let token = CancellationToken::new();
        token.cancel();
        let err = engine
            .research_with_cancel(&query_for(vec![SourceType::Web]), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::Cancelled));
    }
}
