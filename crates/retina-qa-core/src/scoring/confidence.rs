//! Confidence estimation.

use crate::domain::DimensionScores;
use crate::modules::clamp_score;
use crate::preprocess::GrayPlane;

/// Short side at which the resolution factor saturates.
const REFERENCE_SIDE: f64 = 512.0;
/// Tonal range at which the dynamic factor saturates.
const REFERENCE_RANGE: f64 = 0.8;
/// Calibration exponent; values below 1 lift mid-range confidence.
const CALIBRATION: f64 = 0.8;

/// Trust in the global score, in `[0, 100]`.
///
/// Blends score consistency (0.4), mean score (0.3), resolution (0.15) and
/// tonal range (0.15), then applies `x^0.8`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn confidence(scores: &DimensionScores, plane: &GrayPlane) -> f64 {
    let consistency = 1.0 - scores.std_dev() / 100.0;
    let quality = (scores.mean() / 100.0).min(1.0);
    let resolution = (plane.min_side() as f64 / REFERENCE_SIDE).min(1.0);
    let dynamic = (plane.dynamic_range() / REFERENCE_RANGE).min(1.0);

    let weighted = 0.4 * consistency + 0.3 * quality + 0.15 * resolution + 0.15 * dynamic;
    clamp_score(weighted.max(0.0).powf(CALIBRATION) * 100.0)
}
