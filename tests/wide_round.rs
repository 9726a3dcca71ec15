//! Single-round scenarios for the wide research engine

mod common;

use common::{web_finding, ScriptedAgent};
use scry::{
    AgentRegistry, CompletionStatus, Finding, GapKind, SourceStatus, SourceType,
    WideResearchEngine, WideResearchQuery,
};
use std::sync::Arc;

fn engine_with(agents: Vec<ScriptedAgent>) -> WideResearchEngine {
    let mut registry = AgentRegistry::new();
    for agent in agents {
        registry.register(agent);
    }
    WideResearchEngine::new(Arc::new(registry))
}

// === Scenario: one agent failing degrades coverage, not the round ===
#[tokio::test]
async fn test_partial_failure_keeps_other_findings() {
    let engine = engine_with(vec![
        ScriptedAgent::new(SourceType::Web, |_, _| {
            Ok(vec![web_finding("Fairness metrics in automated lending")])
        }),
        ScriptedAgent::new(SourceType::News, |_, _| Err("connection reset".to_string())),
        ScriptedAgent::new(SourceType::Encyclopedia, |_, _| {
            Ok(vec![Finding::new(
                SourceType::Encyclopedia,
                "Machine ethics",
                "https://en.wikipedia.org/wiki/Machine_ethics",
            )
            .with_summary("Moral behavior of artificial agents")
            .with_credibility(0.85)])
        }),
    ]);

    let query = WideResearchQuery::new("AI ethics").with_sources(vec![
        SourceType::Web,
        SourceType::News,
        SourceType::Encyclopedia,
    ]);
    let result = engine.research(&query).await.unwrap();

    assert_eq!(result.status, CompletionStatus::Partial);
    assert_eq!(result.findings.len(), 2);
    assert!((result.coverage.coverage_rate - 2.0 / 3.0).abs() < 1e-6);

    let news = result
        .outcomes
        .iter()
        .find(|o| o.source_type == SourceType::News)
        .unwrap();
    assert_eq!(news.status, SourceStatus::Failed);
    assert!(result
        .coverage
        .gaps
        .iter()
        .any(|g| g.kind == GapKind::SourceGap && g.description.contains("news")));
}

// === Scenario: the same story from two sources collapses to one finding ===
#[tokio::test]
async fn test_cross_source_deduplication_keeps_credible_copy() {
    let engine = engine_with(vec![
        ScriptedAgent::new(SourceType::Web, |_, _| {
            Ok(vec![Finding::new(
                SourceType::Web,
                "Landmark policy on model transparency",
                "https://shared.example/story",
            )
            .with_summary("Regulators adopt transparency rules")
            .with_credibility(0.6)])
        }),
        ScriptedAgent::new(SourceType::News, |_, _| {
            Ok(vec![Finding::new(
                SourceType::News,
                "Landmark policy on model transparency",
                "https://shared.example/story/",
            )
            .with_summary("Regulators adopt transparency rules")
            .with_credibility(0.8)])
        }),
    ]);

    let query = WideResearchQuery::new("model transparency")
        .with_sources(vec![SourceType::Web, SourceType::News]);
    let result = engine.research(&query).await.unwrap();

    assert_eq!(result.status, CompletionStatus::Full);
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].credibility_score, 0.8);
    assert_eq!(result.stats.duplicates_removed, 1);
}

// === Scenario: every agent failing is a zero-finding round, not an error ===
#[tokio::test]
async fn test_all_agents_failing_yields_failed_round() {
    let engine = engine_with(vec![
        ScriptedAgent::new(SourceType::Web, |_, _| Err("offline".to_string())),
        ScriptedAgent::new(SourceType::News, |_, _| Err("offline".to_string())),
    ]);

    let query = WideResearchQuery::new("anything")
        .with_sources(vec![SourceType::Web, SourceType::News]);
    let result = engine.research(&query).await.unwrap();

    assert_eq!(result.status, CompletionStatus::Failed);
    assert!(result.findings.is_empty());
    assert_eq!(result.coverage.coverage_rate, 0.0);
    assert_eq!(result.coverage.gaps.len(), 2);
}
