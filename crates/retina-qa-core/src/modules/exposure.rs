//! Exposure analysis.
//!
//! Scores how close the brightness distribution sits to a mid-gray target
//! with healthy spread and tonal range, penalizing clipped shadows and
//! highlights.

use tracing::trace;

use super::{clamp_score, normalized};
use crate::domain::{Dimension, DimensionAnalyzer};
use crate::preprocess::GrayPlane;

/// Pixels below this are counted as clipped shadows.
const SHADOW_CLIP: f64 = 0.05;
/// Pixels above this are counted as clipped highlights.
const HIGHLIGHT_CLIP: f64 = 0.95;
/// Center of the ideal mean range (0.3, 0.7).
const TARGET_MEAN: f64 = 0.5;
/// Center of the ideal spread range (0.15, 0.4).
const TARGET_STD: f64 = 0.275;

/// Exposure analysis results.
#[derive(Debug, Clone, Copy)]
pub struct ExposureAnalysis {
    /// Mean intensity.
    pub mean: f64,
    /// Population standard deviation of intensity.
    pub std_dev: f64,
    /// 5th percentile.
    pub p5: f64,
    /// 95th percentile.
    pub p95: f64,
    /// Fraction of pixels below the shadow clip level.
    pub shadow_fraction: f64,
    /// Fraction of pixels above the highlight clip level.
    pub highlight_fraction: f64,
}

impl ExposureAnalysis {
    /// Analyze exposure from the grayscale plane.
    #[must_use]
    pub fn analyze(plane: &GrayPlane) -> Self {
        Self {
            mean: plane.mean(),
            std_dev: plane.std_dev(),
            p5: plane.percentile(5.0),
            p95: plane.percentile(95.0),
            shadow_fraction: plane.fraction(|v| v < SHADOW_CLIP),
            highlight_fraction: plane.fraction(|v| v > HIGHLIGHT_CLIP),
        }
    }

    /// Twice the clipped fraction; may exceed 1.
    #[must_use]
    pub fn clipping_penalty(&self) -> f64 {
        (self.shadow_fraction + self.highlight_fraction) * 2.0
    }

    /// Exposure score in `[0, 100]`.
    #[must_use]
    pub fn score(&self) -> f64 {
        let mean_score = 1.0 - (self.mean - TARGET_MEAN).abs() / 0.5;
        let std_score = 1.0 - (self.std_dev - TARGET_STD).abs() / 0.3;
        let dynamic_score = normalized(self.p95 - self.p5, 0.8);

        let combined = 0.4 * mean_score
            + 0.3 * std_score
            + 0.2 * dynamic_score
            + 0.1 * (1.0 - self.clipping_penalty());
        clamp_score(combined * 100.0)
    }
}

/// Exposure dimension analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExposureAnalyzer;

impl DimensionAnalyzer for ExposureAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Exposure
    }

    fn analyze(&self, plane: &GrayPlane) -> f64 {
        let analysis = ExposureAnalysis::analyze(plane);
        trace!(
            mean = analysis.mean,
            std_dev = analysis.std_dev,
            p5 = analysis.p5,
            p95 = analysis.p95,
            clipping_penalty = analysis.clipping_penalty(),
            "exposure metrics"
        );
        analysis.score()
    }
}
