//! Relevance scoring boundary
//!
//! Any relevance or credibility judgment may be delegated to an external
//! scorer; the engine only requires `score(text, context) -> [0, 1]`.
//! `LexicalScorer` is the deterministic default. Callers with an LLM or
//! embedding service implement `RelevanceScorer` themselves.

use std::collections::HashSet;

/// Scores how relevant a piece of text is to a context string.
pub trait RelevanceScorer: Send + Sync {
    /// Return a relevance score in [0, 1].
    fn score(&self, text: &str, context: &str) -> f32;
}

/// Token-overlap scorer. No external dependencies, stable across runs.
#[derive(Debug, Default)]
pub struct LexicalScorer;

impl LexicalScorer {
    pub fn new() -> Self {
        Self
    }
}

impl RelevanceScorer for LexicalScorer {
    fn score(&self, text: &str, context: &str) -> f32 {
        let context_tokens = tokenize(context);
        if context_tokens.is_empty() {
            return 0.0;
        }
        let text_tokens = tokenize(text);
        let overlap = context_tokens
            .iter()
            .filter(|t| text_tokens.contains(*t))
            .count();
        // Fraction of the context covered by the text, floored so any
        // overlap at all registers above zero.
        let coverage = overlap as f32 / context_tokens.len() as f32;
        if overlap > 0 {
            coverage.max(0.2).min(1.0)
        } else {
            0.0
        }
    }
}

/// Lowercased alphanumeric tokens of a string.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Jaccard similarity of the token sets of two strings.
pub fn jaccard(a: &str, b: &str) -> f32 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_overlap_scores_high() {
        let scorer = LexicalScorer::new();
        let score = scorer.score("AI ethics and fairness", "AI ethics");
        assert!((score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let scorer = LexicalScorer::new();
        assert_eq!(scorer.score("quantum chromodynamics", "AI ethics"), 0.0);
    }

    #[test]
    fn test_partial_overlap_between() {
        let scorer = LexicalScorer::new();
        let score = scorer.score("the ethics of machines", "AI ethics");
        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn test_jaccard_identical() {
        assert!((jaccard("AI ethics", "ai ethics!") - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_jaccard_disjoint() {
        assert_eq!(jaccard("alpha beta", "gamma delta"), 0.0);
    }
}
