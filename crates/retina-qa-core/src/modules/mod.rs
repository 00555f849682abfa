//! Dimension analyzer implementations.
//!
//! Five analyzers implement [`DimensionAnalyzer`] directly over the
//! grayscale plane. Clinical adequacy combines their scores with structure
//! visibility and lives in [`clinical`].

mod artifacts;
pub mod clinical;
mod contrast;
mod exposure;
mod noise;
mod sharpness;

pub use artifacts::{ArtifactAnalysis, ArtifactAnalyzer};
pub use clinical::{ClinicalAdequacyAnalyzer, StructureVisibility};
pub use contrast::{ContrastAnalysis, ContrastAnalyzer};
pub use exposure::{ExposureAnalysis, ExposureAnalyzer};
pub use noise::{NoiseAnalysis, NoiseAnalyzer};
pub use sharpness::{SharpnessAnalysis, SharpnessAnalyzer};

use crate::domain::DimensionAnalyzer;

/// The five pixel-level analyzers in canonical dimension order.
#[must_use]
pub fn default_analyzers() -> Vec<Box<dyn DimensionAnalyzer>> {
    vec![
        Box::new(SharpnessAnalyzer),
        Box::new(ExposureAnalyzer),
        Box::new(ContrastAnalyzer),
        Box::new(NoiseAnalyzer),
        Box::new(ArtifactAnalyzer),
    ]
}

/// `min(value / scale, 1)`, with non-finite ratios mapped to 0.
fn normalized(value: f64, scale: f64) -> f64 {
    let ratio = value / scale;
    if ratio.is_finite() {
        ratio.min(1.0)
    } else {
        0.0
    }
}

/// Weighted sum of unit metrics, scaled to `[0, 100]`.
fn weighted_score(weights: &[f64; 4], metrics: &[f64; 4]) -> f64 {
    let sum: f64 = weights.iter().zip(metrics).map(|(w, m)| w * m).sum();
    clamp_score(sum * 100.0)
}

/// Clamps a score to `[0, 100]`, mapping non-finite values to 0.
pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
