//! Merging and de-duplicating one round's findings
//!
//! De-duplication is two-tiered: exact URL match, then token-overlap
//! near-duplication on title + summary. The highest-credibility copy
//! wins in both cases.

use super::types::RoundStats;
use crate::agent::Finding;
use crate::scorer::jaccard;

/// Token-overlap similarity at or above this marks two findings as the
/// same content.
const NEAR_DUPLICATE_THRESHOLD: f32 = 0.8;

#[derive(Debug)]
pub struct ResultAggregator {
    similarity_threshold: f32,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            similarity_threshold: NEAR_DUPLICATE_THRESHOLD,
        }
    }

    /// Merge per-agent batches into a de-duplicated list plus round stats.
    ///
    /// Runs strictly after all agents have settled; order of the output
    /// is not guaranteed to follow the input.
    pub fn aggregate(&self, batches: Vec<Vec<Finding>>) -> (Vec<Finding>, RoundStats) {
        let mut kept: Vec<Finding> = Vec::new();
        let mut duplicates_removed = 0;

        for finding in batches.into_iter().flatten() {
            match kept.iter().position(|k| self.is_duplicate(k, &finding)) {
                Some(index) => {
                    duplicates_removed += 1;
                    if finding.credibility_score > kept[index].credibility_score {
                        kept[index] = finding;
                    }
                }
                None => kept.push(finding),
            }
        }

        let stats = self.stats(&kept, duplicates_removed);
        (kept, stats)
    }

    fn is_duplicate(&self, a: &Finding, b: &Finding) -> bool {
        if normalize_url(&a.url) == normalize_url(&b.url) {
            return true;
        }
        let text_a = format!("{} {}", a.title, a.summary);
        let text_b = format!("{} {}", b.title, b.summary);
        jaccard(&text_a, &text_b) >= self.similarity_threshold
    }

    fn stats(&self, findings: &[Finding], duplicates_removed: usize) -> RoundStats {
        let mut stats = RoundStats {
            duplicates_removed,
            ..RoundStats::default()
        };
        if findings.is_empty() {
            return stats;
        }

        let n = findings.len() as f32;
        stats.average_relevance =
            findings.iter().map(|f| f.relevance_score).sum::<f32>() / n;
        stats.average_credibility =
            findings.iter().map(|f| f.credibility_score).sum::<f32>() / n;
        for finding in findings {
            *stats.results_by_source.entry(finding.source_type).or_insert(0) += 1;
        }
        stats
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_lowercase()
}
