//! Noise analysis.
//!
//! Higher scores mean a cleaner image. Four estimators are inverted into
//! unit "cleanliness" metrics: a robust median-residual estimate, the
//! residual against a Gaussian blur, the residual against a float median
//! filter, and a coarse texture homogeneity measure.

use tracing::trace;

use super::{normalized, weighted_score};
use crate::domain::{Dimension, DimensionAnalyzer};
use crate::imaging::filters::{gaussian_blur, median3, median_blur_u8};
use crate::imaging::stats;
use crate::preprocess::GrayPlane;

const WEIGHTS: [f64; 4] = [0.4, 0.3, 0.2, 0.1];

/// Normal-consistency constant for the median absolute deviation.
const MAD_SCALE: f64 = 0.6745;
/// Number of gray levels used by the texture measure.
const GRAY_LEVELS: i64 = 16;

/// Raw noise metrics.
#[derive(Debug, Clone, Copy)]
pub struct NoiseAnalysis {
    /// Median absolute residual against the 8-bit median blur, over 0.6745.
    pub robust_estimate: f64,
    /// Mean absolute residual against a sigma-1 Gaussian blur.
    pub high_frequency: f64,
    /// Mean absolute residual against a 3x3 float median filter.
    pub impulse: f64,
    /// `1 - mean |q(x) - q(x+1)| / 16` on 16-level quantized values.
    pub texture_homogeneity: f64,
}

impl NoiseAnalysis {
    /// Computes noise metrics for a plane.
    #[must_use]
    pub fn analyze(plane: &GrayPlane) -> Self {
        let data = plane.data();

        let median_u8 = median_blur_u8(&plane.to_luma8());
        let residuals: Vec<f64> = data
            .iter()
            .zip(median_u8.pixels())
            .map(|(&v, p)| (v - f64::from(p.0[0]) / 255.0).abs())
            .collect();
        let robust_estimate = stats::median(&residuals) / MAD_SCALE;

        let blurred = gaussian_blur(data, plane.width(), plane.height(), 1.0);
        let high_frequency = mean_abs_diff(data, &blurred);

        let impulse = mean_abs_diff(data, &median3(plane));

        Self {
            robust_estimate,
            high_frequency,
            impulse,
            texture_homogeneity: texture_homogeneity(plane),
        }
    }

    /// Inverted metrics in weight order; 1 means clean.
    #[must_use]
    pub fn normalized(&self) -> [f64; 4] {
        [
            1.0 - normalized(self.robust_estimate, 0.1),
            1.0 - normalized(self.high_frequency, 0.05),
            1.0 - normalized(self.impulse, 0.03),
            self.texture_homogeneity,
        ]
    }

    /// Noise score in `[0, 100]`, higher is cleaner.
    #[must_use]
    pub fn score(&self) -> f64 {
        weighted_score(&WEIGHTS, &self.normalized())
    }
}

fn mean_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| (x - y).abs()).collect();
    stats::mean(&diffs)
}

/// Horizontal-neighbor homogeneity on `trunc(v * 15)` levels.
///
/// Pairs where either level is 16 or more are skipped; with no pairs the
/// measure is 1.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn texture_homogeneity(plane: &GrayPlane) -> f64 {
    let quantize = |v: f64| (v * (GRAY_LEVELS - 1) as f64) as i64;
    let mut sum = 0i64;
    let mut count = 0i64;
    for y in 0..plane.height() {
        for pair in plane.row(y).windows(2) {
            let (a, b) = (quantize(pair[0]), quantize(pair[1]));
            if a < GRAY_LEVELS && b < GRAY_LEVELS {
                sum += (a - b).abs();
                count += 1;
            }
        }
    }
    1.0 - (sum as f64 / count.max(1) as f64) / GRAY_LEVELS as f64
}

/// Noise dimension analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseAnalyzer;

impl DimensionAnalyzer for NoiseAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::NoiseLevel
    }

    fn analyze(&self, plane: &GrayPlane) -> f64 {
        let analysis = NoiseAnalysis::analyze(plane);
        trace!(
            robust_estimate = analysis.robust_estimate,
            high_frequency = analysis.high_frequency,
            impulse = analysis.impulse,
            texture_homogeneity = analysis.texture_homogeneity,
            "noise metrics"
        );
        analysis.score()
    }
}
