//! Global score aggregation.

use crate::domain::{DimensionScores, ExamType};
use crate::modules::clamp_score;

/// Scores below this incur a critical penalty.
const CRITICAL_THRESHOLD: f64 = 30.0;
/// Spread of the six scores below which a consistency bonus is granted.
const CONSISTENCY_SPREAD: f64 = 20.0;
/// Midpoint of the logistic rescaling.
const MIDPOINT: f64 = 50.0;
/// Steepness of the logistic rescaling.
const STEEPNESS: f64 = 0.1;

/// Half a point per point below 30, summed over every dimension.
#[must_use]
pub fn critical_penalty(scores: &DimensionScores) -> f64 {
    scores
        .iter()
        .filter(|&(_, score)| score < CRITICAL_THRESHOLD)
        .map(|(_, score)| (CRITICAL_THRESHOLD - score) * 0.5)
        .sum()
}

/// `max(0, 20 - std) * 0.1` over the six scores.
#[must_use]
pub fn consistency_bonus(scores: &DimensionScores) -> f64 {
    (CONSISTENCY_SPREAD - scores.std_dev()).max(0.0) * 0.1
}

/// `100 / (1 + e^(-0.1 (x - 50)))`.
#[must_use]
pub fn logistic(x: f64) -> f64 {
    100.0 / (1.0 + (-STEEPNESS * (x - MIDPOINT)).exp())
}

/// Combines the six dimension scores into the global score.
///
/// The exam-weighted sum is reduced by the critical penalty, raised by the
/// consistency bonus, and passed through [`logistic`]. The result is
/// clamped to `[0, 100]`.
#[must_use]
pub fn global_score(scores: &DimensionScores, exam: ExamType) -> f64 {
    let weighted = exam.weights().weighted_sum(scores);
    let intermediate = weighted - critical_penalty(scores) + consistency_bonus(scores);
    clamp_score(logistic(intermediate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logistic_midpoint() {
        assert!((logistic(50.0) - 50.0).abs() < 1e-12);
        assert!(logistic(100.0) > 99.0);
        assert!(logistic(0.0) < 1.0);
    }

    #[test]
    fn test_perfect_scores() {
        // weighted 100, no penalty, full bonus of 2
        let scores = DimensionScores::uniform(100.0);
        assert!(critical_penalty(&scores).abs() < f64::EPSILON);
        assert!((consistency_bonus(&scores) - 2.0).abs() < 1e-12);
        let expected = logistic(102.0);
        assert!((global_score(&scores, ExamType::Fundoscopy) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_critical_penalty_sums_low_dimensions() {
        let mut scores = DimensionScores::uniform(80.0);
        scores.sharpness = 10.0;
        scores.contrast = 20.0;
        assert!((critical_penalty(&scores) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_bonus_for_spread_scores() {
        let mut scores = DimensionScores::uniform(100.0);
        scores.sharpness = 0.0;
        scores.exposure = 0.0;
        scores.contrast = 0.0;
        // population std of three 0s and three 100s is 50
        assert!(consistency_bonus(&scores).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weights_depend_on_exam() {
        let mut scores = DimensionScores::uniform(60.0);
        scores.sharpness = 95.0;
        let fundus = global_score(&scores, ExamType::Fundoscopy);
        let oct = global_score(&scores, ExamType::Oct);
        // OCT weights sharpness at 0.30 against 0.25
        assert!(oct > fundus);
    }

    #[test]
    fn test_uniform_gray_scenario() {
        let scores = DimensionScores {
            sharpness: 0.0,
            exposure: 52.5,
            contrast: 0.0,
            noise_level: 98.84,
            artifacts: 100.0,
            clinical_adequacy: 44.2,
        };
        let score = global_score(&scores, ExamType::Fundoscopy);
        assert!(score > 1.0 && score < 5.0, "score={score}");
    }
}
