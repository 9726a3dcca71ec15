//! Coverage analysis for one round
//!
//! From aggregated findings and per-agent outcomes, computes which source
//! types delivered, how diverse the perspectives are, and where whole
//! source types fell out.

use super::types::{CoverageReport, SourceOutcome, TemporalSpread};
use crate::agent::{Finding, SourceStatus, SourceType};
use crate::research::{CoverageGap, GapKind, GapPriority};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;

/// Source-type entropy counts for this share of the diversity score.
const SOURCE_DIVERSITY_WEIGHT: f32 = 0.6;
const RECENCY_DIVERSITY_WEIGHT: f32 = 0.4;

#[derive(Debug, Default)]
pub struct CoverageAnalyzer;

impl CoverageAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        topic: &str,
        outcomes: &[SourceOutcome],
        findings: &[Finding],
    ) -> CoverageReport {
        let attempted = outcomes.len();
        let succeeded = outcomes
            .iter()
            .filter(|o| o.status == SourceStatus::Succeeded)
            .count();
        let coverage_rate = if attempted == 0 {
            0.0
        } else {
            succeeded as f32 / attempted as f32
        };

        CoverageReport {
            coverage_rate,
            perspective_diversity: self.perspective_diversity(findings),
            temporal: self.temporal_spread(findings),
            gaps: self.source_gaps(topic, outcomes),
        }
    }

    /// Entropy over source types, blended with entropy over publication
    /// recency buckets. 0 when every finding looks alike, 1 at a perfectly
    /// even spread.
    fn perspective_diversity(&self, findings: &[Finding]) -> f32 {
        if findings.is_empty() {
            return 0.0;
        }

        let mut by_source: HashMap<SourceType, usize> = HashMap::new();
        let mut by_recency: HashMap<u8, usize> = HashMap::new();
        let now = Utc::now();
        for finding in findings {
            *by_source.entry(finding.source_type).or_insert(0) += 1;
            let bucket = match finding.published_at {
                Some(at) if at > now - ChronoDuration::days(30) => 0,
                Some(at) if at > now - ChronoDuration::days(365) => 1,
                Some(_) => 2,
                None => 3,
            };
            *by_recency.entry(bucket).or_insert(0) += 1;
        }

        let source_entropy = normalized_entropy(by_source.values(), SourceType::all().len());
        let recency_entropy = normalized_entropy(by_recency.values(), 4);
        SOURCE_DIVERSITY_WEIGHT * source_entropy + RECENCY_DIVERSITY_WEIGHT * recency_entropy
    }

    fn temporal_spread(&self, findings: &[Finding]) -> TemporalSpread {
        let mut spread = TemporalSpread::default();
        let now = Utc::now();
        for finding in findings {
            match finding.published_at {
                Some(at) => {
                    spread.oldest = Some(spread.oldest.map_or(at, |o| o.min(at)));
                    spread.newest = Some(spread.newest.map_or(at, |n| n.max(at)));
                    if at > now - ChronoDuration::days(30) {
                        spread.recent_count += 1;
                    }
                    if at > now - ChronoDuration::days(365) {
                        spread.past_year_count += 1;
                    }
                }
                None => spread.undated_count += 1,
            }
        }
        spread
    }

    /// A whole source type failing is a coverage gap of its own.
    fn source_gaps(&self, topic: &str, outcomes: &[SourceOutcome]) -> Vec<CoverageGap> {
        outcomes
            .iter()
            .filter(|o| o.status != SourceStatus::Succeeded)
            .map(|o| {
                let verb = match o.status {
                    SourceStatus::TimedOut => "timed out",
                    _ => "failed",
                };
                CoverageGap::new(
                    GapKind::SourceGap,
                    GapPriority::Medium,
                    format!("{} search {} for this round", o.source_type, verb),
                )
                .with_related_topic(o.source_type.as_str())
                .with_suggested_query(topic)
            })
            .collect()
    }
}

/// Shannon entropy of the counts, normalized by the maximum for
/// `categories` buckets.
fn normalized_entropy<'a>(counts: impl Iterator<Item = &'a usize>, categories: usize) -> f32 {
    let counts: Vec<usize> = counts.copied().filter(|c| *c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 || categories < 2 {
        return 0.0;
    }
    let entropy: f32 = counts
        .iter()
        .map(|&c| {
            let p = c as f32 / total as f32;
            -p * p.ln()
        })
        .sum();
    (entropy / (categories as f32).ln()).clamp(0.0, 1.0)
}
