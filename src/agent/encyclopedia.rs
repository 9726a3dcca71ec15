//! Encyclopedic search via the Wikipedia search API

use super::traits::SearchAgent;
use super::types::{
    strip_markup, AgentError, AgentSearchQuery, AgentSearchResult, Finding, SourceType,
};
use crate::scorer::RelevanceScorer;
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Curated reference content; high default credibility.
const ENCYCLOPEDIA_CREDIBILITY: f32 = 0.85;

const DEFAULT_LANGUAGE: &str = "en";

pub struct EncyclopediaSearchAgent {
    client: reqwest::Client,
    scorer: Arc<dyn RelevanceScorer>,
}

impl EncyclopediaSearchAgent {
    pub fn new(client: reqwest::Client, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { client, scorer }
    }
}

#[async_trait]
impl SearchAgent for EncyclopediaSearchAgent {
    fn id(&self) -> &str {
        "encyclopedia-wikipedia"
    }

    fn name(&self) -> &str {
        "Wikipedia Search"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Encyclopedia
    }

    async fn search(&self, query: &AgentSearchQuery) -> Result<AgentSearchResult, AgentError> {
        let started = Instant::now();
        let language = language_for(query);
        let endpoint = format!("https://{}.wikipedia.org/w/api.php", language);
        let limit = query.max_results.to_string();

        let body: Value = self
            .client
            .get(&endpoint)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query.query.as_str()),
                ("format", "json"),
                ("srlimit", limit.as_str()),
            ])
            .timeout(query.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let findings = parse_search(&body, &language, query, self.scorer.as_ref());
        Ok(AgentSearchResult::succeeded(findings, started.elapsed()))
    }
}

fn language_for(query: &AgentSearchQuery) -> String {
    query
        .languages
        .first()
        .map(|l| l.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

fn parse_search(
    body: &Value,
    language: &str,
    query: &AgentSearchQuery,
    scorer: &dyn RelevanceScorer,
) -> Vec<Finding> {
    let Some(results) = body["query"]["search"].as_array() else {
        return Vec::new();
    };

    let mut findings = Vec::new();
    for result in results.iter().take(query.max_results) {
        let Some(title) = result["title"].as_str() else {
            continue;
        };
        let summary = result["snippet"].as_str().map(strip_markup).unwrap_or_default();
        let url = format!(
            "https://{}.wikipedia.org/wiki/{}",
            language,
            title.replace(' ', "_")
        );

        let relevance = scorer.score(&format!("{} {}", title, summary), &query.query);
        let mut finding = Finding::new(SourceType::Encyclopedia, title, url)
            .with_summary(summary)
            .with_source_name("Wikipedia")
            .with_relevance(relevance)
            .with_credibility(ENCYCLOPEDIA_CREDIBILITY);

        if let Some(edited) = result["timestamp"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            finding = finding.with_published_at(edited.to_utc());
        }

        findings.push(finding);
    }
    findings
}
