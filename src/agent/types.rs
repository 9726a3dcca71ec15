//! Core types for search agents and their results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// A category of information provider, each with its own agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Web,
    News,
    Academic,
    Encyclopedia,
}

impl SourceType {
    /// All known source types.
    pub fn all() -> [SourceType; 4] {
        [
            SourceType::Web,
            SourceType::News,
            SourceType::Academic,
            SourceType::Encyclopedia,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Web => "web",
            SourceType::News => "news",
            SourceType::Academic => "academic",
            SourceType::Encyclopedia => "encyclopedia",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "web" => Ok(SourceType::Web),
            "news" => Ok(SourceType::News),
            "academic" => Ok(SourceType::Academic),
            "encyclopedia" | "wiki" => Ok(SourceType::Encyclopedia),
            other => Err(format!("unknown source type: {}", other)),
        }
    }
}

/// Unique identifier for a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindingId(Uuid);

impl FindingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FindingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One atomic piece of retrieved information with provenance.
///
/// Immutable after creation: agents produce findings, aggregation and
/// integration only read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: FindingId,
    pub title: String,
    pub summary: String,
    pub content: Option<String>,
    pub url: String,
    pub source_type: SourceType,
    pub source_name: String,
    /// How relevant the finding is to the query, in [0, 1]
    pub relevance_score: f32,
    /// How trustworthy the source is considered, in [0, 1]
    pub credibility_score: f32,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl Finding {
    /// Create a finding with neutral scores; use the builders to fill in
    /// the rest.
    pub fn new(
        source_type: SourceType,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: FindingId::new(),
            title: title.into(),
            summary: String::new(),
            content: None,
            url: url.into(),
            source_type,
            source_name: source_type.as_str().to_string(),
            relevance_score: 0.5,
            credibility_score: 0.5,
            published_at: None,
            author: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn with_relevance(mut self, score: f32) -> Self {
        self.relevance_score = score.clamp(0.0, 1.0);
        self
    }

    pub fn with_credibility(mut self, score: f32) -> Self {
        self.credibility_score = score.clamp(0.0, 1.0);
        self
    }

    pub fn with_published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Inclusive publication-date window for a search.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// A range is valid when `from` does not come after `to`.
    pub fn is_valid(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }
}

/// One query as handed to a single agent, already rewritten for its
/// source type.
#[derive(Debug, Clone)]
pub struct AgentSearchQuery {
    pub query: String,
    pub max_results: usize,
    pub languages: Vec<String>,
    pub date_range: Option<DateRange>,
    pub timeout: Duration,
}

impl AgentSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 10,
            languages: Vec::new(),
            date_range: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Terminal status of one agent call within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Succeeded,
    Failed,
    TimedOut,
}

/// What one agent returned for one query.
#[derive(Debug, Clone)]
pub struct AgentSearchResult {
    pub findings: Vec<Finding>,
    pub status: SourceStatus,
    pub error: Option<String>,
    pub processing_time: Duration,
}

impl AgentSearchResult {
    pub fn succeeded(findings: Vec<Finding>, processing_time: Duration) -> Self {
        Self {
            findings,
            status: SourceStatus::Succeeded,
            error: None,
            processing_time,
        }
    }
}

/// Errors from a single agent call. Never propagated past the round that
/// issued the call; recorded in its coverage instead.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    Parse(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Remove markup tags and collapse the result to plain text.
///
/// Good enough for search snippets (Wikipedia highlights, JATS
/// abstracts); not a general HTML parser.
pub(crate) fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
