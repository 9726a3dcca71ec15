//! Convergence detection over the novelty-rate history
//!
//! Turns noisy per-round novelty rates into a scalar saturation score.
//! Two ingredients over a sliding window: how low novelty has gotten
//! (saturation) and how fast it is still falling (trend).

/// Rounds considered when scoring, counting the current one.
const WINDOW: usize = 3;

/// Weight of the saturation term. Dominates so that uniformly lower
/// novelty always raises the score.
const SATURATION_WEIGHT: f32 = 0.8;

/// Weight of the declining-trend term.
const TREND_WEIGHT: f32 = 0.2;

#[derive(Debug, Default)]
pub struct ConvergenceDetector;

impl ConvergenceDetector {
    pub fn new() -> Self {
        Self
    }

    /// Convergence score in [0, 1]. With no history the score is 0: a
    /// single round can never claim saturation.
    pub fn calculate(&self, history: &[f32], current: f32) -> f32 {
        if history.is_empty() {
            return 0.0;
        }

        let mut sequence: Vec<f32> = history.iter().map(|n| n.clamp(0.0, 1.0)).collect();
        sequence.push(current.clamp(0.0, 1.0));
        let start = sequence.len().saturating_sub(WINDOW);
        let recent = &sequence[start..];

        let average = recent.iter().sum::<f32>() / recent.len() as f32;
        let saturation = 1.0 - average;

        // Mean decline per step; rising novelty contributes nothing.
        let declines: Vec<f32> = recent.windows(2).map(|w| w[0] - w[1]).collect();
        let trend = if declines.is_empty() {
            0.0
        } else {
            (declines.iter().sum::<f32>() / declines.len() as f32).clamp(-1.0, 1.0)
        };

        (SATURATION_WEIGHT * saturation + TREND_WEIGHT * trend.max(0.0)).clamp(0.0, 1.0)
    }

    /// True when research has saturated. `threshold` is the allowed
    /// residual novelty, not the raw score.
    pub fn has_converged(&self, history: &[f32], current: f32, threshold: f32) -> bool {
        self.calculate(history, current) >= 1.0 - threshold.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_history_scores_zero() {
        let detector = ConvergenceDetector::new();
        for current in [0.0, 0.2, 0.5, 1.0] {
            assert_eq!(detector.calculate(&[], current), 0.0);
        }
    }

    #[test]
    fn test_lower_history_never_scores_lower() {
        let detector = ConvergenceDetector::new();
        let current = 0.3;

        let high = detector.calculate(&[0.9, 0.8], current);
        let low = detector.calculate(&[0.4, 0.3], current);
        assert!(low >= high);

        let high_single = detector.calculate(&[0.5], 0.4);
        let low_single = detector.calculate(&[0.45], 0.4);
        assert!(low_single >= high_single);
    }

    #[test]
    fn test_decreasing_beats_increasing() {
        let detector = ConvergenceDetector::new();
        let decreasing = detector.calculate(&[0.9, 0.5], 0.1);
        let increasing = detector.calculate(&[0.1, 0.5], 0.9);
        assert!(decreasing > increasing);
    }

    #[test]
    fn test_has_converged_matches_score_and_threshold() {
        let detector = ConvergenceDetector::new();
        let history = [0.2_f32, 0.1];
        let current = 0.05;
        let score = detector.calculate(&history, current);

        for threshold in [0.05_f32, 0.1, 0.2, 0.3, 0.5] {
            assert_eq!(
                detector.has_converged(&history, current, threshold),
                score >= 1.0 - threshold
            );
        }
    }

    #[test]
    fn test_sustained_low_novelty_converges_at_modest_threshold() {
        let detector = ConvergenceDetector::new();
        assert!(detector.has_converged(&[0.1, 0.05], 0.0, 0.3));
    }

    #[test]
    fn test_sustained_high_novelty_does_not_converge() {
        let detector = ConvergenceDetector::new();
        assert!(!detector.has_converged(&[0.9, 0.8], 0.7, 0.3));
    }

    #[test]
    fn test_score_stays_in_unit_interval() {
        let detector = ConvergenceDetector::new();
        for history in [vec![0.0, 0.0], vec![1.0, 1.0], vec![1.0, 0.0]] {
            for current in [0.0, 0.5, 1.0] {
                let score = detector.calculate(&history, current);
                assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
            }
        }
    }

    #[test]
    fn test_window_ignores_ancient_history() {
        let detector = ConvergenceDetector::new();
        // Identical recent windows; only values beyond the window differ
        let long_high = detector.calculate(&[1.0, 1.0, 1.0, 0.1, 0.05], 0.02);
        let long_low = detector.calculate(&[0.0, 0.0, 0.0, 0.1, 0.05], 0.02);
        assert!((long_high - long_low).abs() < 1e-6);
    }
}
