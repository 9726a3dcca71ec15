//! News search via the Hacker News Algolia API

use super::traits::SearchAgent;
use super::types::{
    AgentError, AgentSearchQuery, AgentSearchResult, Finding, SourceType,
};
use crate::scorer::RelevanceScorer;
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

const ENDPOINT: &str = "https://hn.algolia.com/api/v1/search";

pub struct NewsSearchAgent {
    client: reqwest::Client,
    scorer: Arc<dyn RelevanceScorer>,
}

impl NewsSearchAgent {
    pub fn new(client: reqwest::Client, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { client, scorer }
    }
}

#[async_trait]
impl SearchAgent for NewsSearchAgent {
    fn id(&self) -> &str {
        "news-hn-algolia"
    }

    fn name(&self) -> &str {
        "Hacker News Search"
    }

    fn source_type(&self) -> SourceType {
        SourceType::News
    }

    async fn search(&self, query: &AgentSearchQuery) -> Result<AgentSearchResult, AgentError> {
        let started = Instant::now();
        let per_page = query.max_results.to_string();
        let mut params = vec![
            ("query", query.query.clone()),
            ("tags", "story".to_string()),
            ("hitsPerPage", per_page),
        ];
        if let Some(filters) = date_filters(query) {
            params.push(("numericFilters", filters));
        }

        let body: Value = self
            .client
            .get(ENDPOINT)
            .query(&params)
            .timeout(query.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let findings = parse_hits(&body, query, self.scorer.as_ref());
        Ok(AgentSearchResult::succeeded(findings, started.elapsed()))
    }
}

/// Algolia filters on the integer `created_at_i` field.
fn date_filters(query: &AgentSearchQuery) -> Option<String> {
    let range = query.date_range?;
    let mut parts = Vec::new();
    if let Some(from) = range.from {
        parts.push(format!("created_at_i>={}", from.timestamp()));
    }
    if let Some(to) = range.to {
        parts.push(format!("created_at_i<={}", to.timestamp()));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

fn parse_hits(body: &Value, query: &AgentSearchQuery, scorer: &dyn RelevanceScorer) -> Vec<Finding> {
    let Some(hits) = body["hits"].as_array() else {
        return Vec::new();
    };

    let mut findings = Vec::new();
    for hit in hits.iter().take(query.max_results) {
        let Some(title) = hit["title"].as_str() else {
            continue;
        };
        if title.is_empty() {
            continue;
        }
        let url = match hit["url"].as_str() {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => match hit["objectID"].as_str() {
                Some(id) => format!("https://news.ycombinator.com/item?id={}", id),
                None => continue,
            },
        };

        let points = hit["points"].as_u64().unwrap_or(0);
        let relevance = scorer.score(title, &query.query);
        let mut finding = Finding::new(SourceType::News, title, url)
            .with_summary(title)
            .with_source_name("Hacker News")
            .with_relevance(relevance)
            .with_credibility(credibility_from_points(points))
            .with_metadata("points", points.to_string());

        if let Some(author) = hit["author"].as_str() {
            finding = finding.with_author(author);
        }
        if let Some(created) = hit["created_at"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            finding = finding.with_published_at(created.to_utc());
        }

        findings.push(finding);
    }
    findings
}

/// Community score as a weak credibility proxy: 0.4 floor, 0.8 ceiling.
fn credibility_from_points(points: u64) -> f32 {
    0.4 + (points.min(1000) as f32 / 1000.0) * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::DateRange;
    use crate::scorer::LexicalScorer;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_parse_hits_maps_fields() {
        let body = json!({
            "hits": [
                {
                    "title": "AI ethics board dissolved",
                    "url": "https://example.org/story",
                    "points": 250,
                    "author": "pg",
                    "created_at": "2024-03-01T12:00:00Z",
                    "objectID": "1"
                },
                {
                    "title": "Show HN: ethics linter",
                    "url": "",
                    "points": 10,
                    "objectID": "42"
                }
            ]
        });

        let findings = parse_hits(
            &body,
            &AgentSearchQuery::new("AI ethics"),
            &LexicalScorer::new(),
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].author.as_deref(), Some("pg"));
        assert!(findings[0].published_at.is_some());
        assert!(findings[0].credibility_score > findings[1].credibility_score);
        // Story without an external URL falls back to the HN item page
        assert_eq!(
            findings[1].url,
            "https://news.ycombinator.com/item?id=42"
        );
    }

    #[test]
    fn test_date_filters() {
        let mut query = AgentSearchQuery::new("ai");
        assert!(date_filters(&query).is_none());

        query.date_range = Some(DateRange {
            from: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            to: None,
        });
        let filters = date_filters(&query).unwrap();
        assert!(filters.starts_with("created_at_i>="));
    }

    #[test]
    fn test_credibility_bounds() {
        assert_eq!(credibility_from_points(0), 0.4);
        assert_eq!(credibility_from_points(1000), 0.8);
        assert_eq!(credibility_from_points(100_000), 0.8);
    }
}
