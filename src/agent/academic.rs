//! Academic search via the Crossref works API

use super::traits::SearchAgent;
use super::types::{
    strip_markup, AgentError, AgentSearchQuery, AgentSearchResult, Finding, SourceType,
};
use crate::scorer::RelevanceScorer;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

const ENDPOINT: &str = "https://api.crossref.org/works";

/// Peer-reviewed metadata; high default credibility.
const ACADEMIC_CREDIBILITY: f32 = 0.9;

pub struct AcademicSearchAgent {
    client: reqwest::Client,
    scorer: Arc<dyn RelevanceScorer>,
}

impl AcademicSearchAgent {
    pub fn new(client: reqwest::Client, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { client, scorer }
    }
}

#[async_trait]
impl SearchAgent for AcademicSearchAgent {
    fn id(&self) -> &str {
        "academic-crossref"
    }

    fn name(&self) -> &str {
        "Crossref Academic Search"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Academic
    }

    async fn search(&self, query: &AgentSearchQuery) -> Result<AgentSearchResult, AgentError> {
        let started = Instant::now();
        let rows = query.max_results.to_string();
        let body: Value = self
            .client
            .get(ENDPOINT)
            .query(&[("query", query.query.as_str()), ("rows", rows.as_str())])
            .timeout(query.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let findings = parse_works(&body, query, self.scorer.as_ref());
        Ok(AgentSearchResult::succeeded(findings, started.elapsed()))
    }
}

fn parse_works(body: &Value, query: &AgentSearchQuery, scorer: &dyn RelevanceScorer) -> Vec<Finding> {
    let Some(items) = body["message"]["items"].as_array() else {
        return Vec::new();
    };

    let mut findings = Vec::new();
    for item in items.iter().take(query.max_results) {
        let Some(title) = item["title"]
            .as_array()
            .and_then(|t| t.first())
            .and_then(|t| t.as_str())
        else {
            continue;
        };
        let Some(doi) = item["DOI"].as_str() else {
            continue;
        };

        let summary = item["abstract"]
            .as_str()
            .map(strip_markup)
            .unwrap_or_else(|| title.to_string());
        let venue = item["container-title"]
            .as_array()
            .and_then(|c| c.first())
            .and_then(|c| c.as_str())
            .unwrap_or("Crossref");

        let relevance = scorer.score(&format!("{} {}", title, summary), &query.query);
        let mut finding = Finding::new(
            SourceType::Academic,
            title,
            format!("https://doi.org/{}", doi),
        )
        .with_summary(summary)
        .with_source_name(venue)
        .with_relevance(relevance)
        .with_credibility(ACADEMIC_CREDIBILITY)
        .with_metadata("doi", doi.to_string());

        if let Some(author) = first_author(item) {
            finding = finding.with_author(author);
        }
        if let Some(published) = issued_date(item) {
            finding = finding.with_published_at(published);
        }

        findings.push(finding);
    }
    findings
}

fn first_author(item: &Value) -> Option<String> {
    let author = item["author"].as_array()?.first()?;
    let family = author["family"].as_str()?;
    match author["given"].as_str() {
        Some(given) => Some(format!("{} {}", given, family)),
        None => Some(family.to_string()),
    }
}

/// Crossref dates are year/month/day arrays with optional tail parts.
fn issued_date(item: &Value) -> Option<chrono::DateTime<Utc>> {
    let parts = item["issued"]["date-parts"].as_array()?.first()?.as_array()?;
    let year = parts.first()?.as_i64()? as i32;
    let month = parts.get(1).and_then(|m| m.as_u64()).unwrap_or(1) as u32;
    let day = parts.get(2).and_then(|d| d.as_u64()).unwrap_or(1) as u32;
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::LexicalScorer;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_parse_works_maps_fields() {
        let body = json!({
            "message": {
                "items": [
                    {
                        "title": ["Fairness in Machine Learning"],
                        "DOI": "10.1000/xyz123",
                        "abstract": "<jats:p>A survey of fairness.</jats:p>",
                        "container-title": ["Journal of AI Research"],
                        "author": [{"given": "Ada", "family": "Lovelace"}],
                        "issued": {"date-parts": [[2023, 6]]}
                    }
                ]
            }
        });

        let findings = parse_works(
            &body,
            &AgentSearchQuery::new("fairness machine learning"),
            &LexicalScorer::new(),
        );
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.url, "https://doi.org/10.1000/xyz123");
        assert_eq!(f.summary, "A survey of fairness.");
        assert_eq!(f.source_name, "Journal of AI Research");
        assert_eq!(f.author.as_deref(), Some("Ada Lovelace"));
        let published = f.published_at.unwrap();
        assert_eq!(published.year(), 2023);
        assert_eq!(published.month(), 6);
        assert_eq!(f.credibility_score, ACADEMIC_CREDIBILITY);
    }

    #[test]
    fn test_parse_works_skips_untitled() {
        let body = json!({
            "message": {
                "items": [
                    {"DOI": "10.1000/untitled"},
                    {"title": [], "DOI": "10.1000/empty"}
                ]
            }
        });
        let findings = parse_works(
            &body,
            &AgentSearchQuery::new("anything"),
            &LexicalScorer::new(),
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_issued_date_year_only() {
        let item = json!({"issued": {"date-parts": [[2020]]}});
        let date = issued_date(&item).unwrap();
        assert_eq!(date.year(), 2020);
        assert_eq!(date.month(), 1);
    }
}
