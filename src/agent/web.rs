//! General web search via the DuckDuckGo instant-answer API

use super::traits::SearchAgent;
use super::types::{
    AgentError, AgentSearchQuery, AgentSearchResult, Finding, SourceType,
};
use crate::scorer::RelevanceScorer;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

const ENDPOINT: &str = "https://api.duckduckgo.com/";

/// Instant answers carry no per-result authority signal; everything gets
/// the same middling credibility.
const WEB_CREDIBILITY: f32 = 0.6;

pub struct WebSearchAgent {
    client: reqwest::Client,
    scorer: Arc<dyn RelevanceScorer>,
}

impl WebSearchAgent {
    pub fn new(client: reqwest::Client, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { client, scorer }
    }
}

#[async_trait]
impl SearchAgent for WebSearchAgent {
    fn id(&self) -> &str {
        "web-duckduckgo"
    }

    fn name(&self) -> &str {
        "DuckDuckGo Web Search"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Web
    }

    async fn search(&self, query: &AgentSearchQuery) -> Result<AgentSearchResult, AgentError> {
        let started = Instant::now();
        let body: Value = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("q", query.query.as_str()),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .timeout(query.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let findings = parse_instant_answer(&body, query, self.scorer.as_ref());
        Ok(AgentSearchResult::succeeded(findings, started.elapsed()))
    }
}

/// Map a DuckDuckGo instant-answer body to findings.
///
/// The abstract (when present) comes first; related topics follow, with
/// one level of category nesting flattened.
fn parse_instant_answer(
    body: &Value,
    query: &AgentSearchQuery,
    scorer: &dyn RelevanceScorer,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let abstract_text = body["AbstractText"].as_str().unwrap_or_default();
    let abstract_url = body["AbstractURL"].as_str().unwrap_or_default();
    if !abstract_text.is_empty() && !abstract_url.is_empty() {
        let title = body["Heading"].as_str().unwrap_or(&query.query);
        findings.push(build_finding(
            title,
            abstract_text,
            abstract_url,
            body["AbstractSource"].as_str().unwrap_or("DuckDuckGo"),
            query,
            scorer,
        ));
    }

    let mut related = Vec::new();
    collect_related(&body["RelatedTopics"], &mut related);
    for topic in related {
        if findings.len() >= query.max_results {
            break;
        }
        let (Some(text), Some(url)) = (topic["Text"].as_str(), topic["FirstURL"].as_str())
        else {
            continue;
        };
        if text.is_empty() || url.is_empty() {
            continue;
        }
        // "Title - description" is the usual Text shape
        let (title, summary) = match text.split_once(" - ") {
            Some((t, s)) => (t, s),
            None => (text, text),
        };
        findings.push(build_finding(title, summary, url, "DuckDuckGo", query, scorer));
    }

    findings.truncate(query.max_results);
    findings
}

/// Related topics mix plain entries with category objects holding a
/// nested `Topics` array.
fn collect_related<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    let Some(entries) = value.as_array() else {
        return;
    };
    for entry in entries {
        if entry.get("FirstURL").is_some() {
            out.push(entry);
        } else if let Some(nested) = entry.get("Topics") {
            collect_related(nested, out);
        }
    }
}

fn build_finding(
    title: &str,
    summary: &str,
    url: &str,
    source_name: &str,
    query: &AgentSearchQuery,
    scorer: &dyn RelevanceScorer,
) -> Finding {
    let relevance = scorer.score(&format!("{} {}", title, summary), &query.query);
    Finding::new(SourceType::Web, title, url)
        .with_summary(summary)
        .with_source_name(source_name)
        .with_relevance(relevance)
        .with_credibility(WEB_CREDIBILITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::LexicalScorer;
    use serde_json::json;

    fn query(text: &str) -> AgentSearchQuery {
        AgentSearchQuery::new(text)
    }

    #[test]
    fn test_parse_abstract_and_related() {
        let body = json!({
            "Heading": "AI ethics",
            "AbstractText": "AI ethics concerns the moral behavior of machines.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Ethics_of_AI",
            "AbstractSource": "Wikipedia",
            "RelatedTopics": [
                {
                    "Text": "Machine ethics - a branch of AI ethics",
                    "FirstURL": "https://duckduckgo.com/Machine_ethics"
                },
                {
                    "Name": "Related",
                    "Topics": [
                        {
                            "Text": "Algorithmic bias - systematic unfairness",
                            "FirstURL": "https://duckduckgo.com/Algorithmic_bias"
                        }
                    ]
                }
            ]
        });

        let findings =
            parse_instant_answer(&body, &query("AI ethics"), &LexicalScorer::new());
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].title, "AI ethics");
        assert_eq!(findings[0].source_name, "Wikipedia");
        assert_eq!(findings[1].title, "Machine ethics");
        assert_eq!(findings[2].title, "Algorithmic bias");
        assert!(findings.iter().all(|f| f.source_type == SourceType::Web));
    }

    #[test]
    fn test_parse_respects_max_results() {
        let topics: Vec<Value> = (0..20)
            .map(|i| {
                json!({
                    "Text": format!("Topic {} - description", i),
                    "FirstURL": format!("https://duckduckgo.com/t{}", i)
                })
            })
            .collect();
        let body = json!({ "RelatedTopics": topics });

        let mut q = query("topic");
        q.max_results = 5;
        let findings = parse_instant_answer(&body, &q, &LexicalScorer::new());
        assert_eq!(findings.len(), 5);
    }

    #[test]
    fn test_parse_empty_body() {
        let body = json!({});
        let findings =
            parse_instant_answer(&body, &query("anything"), &LexicalScorer::new());
        assert!(findings.is_empty());
    }
}
