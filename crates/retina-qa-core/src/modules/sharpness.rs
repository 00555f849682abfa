//! Sharpness analysis.
//!
//! Combines four focus measures: Laplacian variance, mean Sobel gradient
//! magnitude, high-frequency spectral energy and Canny edge density.

use imageproc::edges::canny;
use tracing::trace;

use super::{normalized, weighted_score};
use crate::domain::{Dimension, DimensionAnalyzer};
use crate::imaging::filters::{laplacian, sobel_x, sobel_y};
use crate::imaging::spectrum::Spectrum;
use crate::imaging::stats;
use crate::preprocess::GrayPlane;

const WEIGHTS: [f64; 4] = [0.3, 0.25, 0.25, 0.2];

/// Raw sharpness metrics.
#[derive(Debug, Clone, Copy)]
pub struct SharpnessAnalysis {
    /// Variance of the Laplacian response.
    pub laplacian_variance: f64,
    /// Mean Sobel gradient magnitude.
    pub mean_gradient: f64,
    /// Mean spectral magnitude outside the low-frequency disk.
    pub high_frequency_energy: f64,
    /// Fraction of Canny edge pixels.
    pub edge_density: f64,
}

impl SharpnessAnalysis {
    /// Computes sharpness metrics for a plane.
    #[must_use]
    pub fn analyze(plane: &GrayPlane) -> Self {
        let laplacian_variance = stats::variance(&laplacian(plane));

        let gradient: Vec<f64> = sobel_x(plane)
            .iter()
            .zip(sobel_y(plane))
            .map(|(gx, gy)| gx.hypot(gy))
            .collect();
        let mean_gradient = stats::mean(&gradient);

        let high_frequency_energy = Spectrum::from_plane(plane).high_frequency_energy();

        let edges = canny(&plane.to_luma8(), 50.0, 150.0);
        #[allow(clippy::cast_precision_loss)]
        let edge_density =
            edges.pixels().filter(|p| p.0[0] > 0).count() as f64 / plane.len() as f64;

        Self {
            laplacian_variance,
            mean_gradient,
            high_frequency_energy,
            edge_density,
        }
    }

    /// Normalized metrics in weight order.
    #[must_use]
    pub fn normalized(&self) -> [f64; 4] {
        [
            normalized(self.laplacian_variance, 1000.0),
            normalized(self.mean_gradient, 0.5),
            normalized(self.high_frequency_energy, 1000.0),
            normalized(self.edge_density, 0.1),
        ]
    }

    /// Sharpness score in `[0, 100]`.
    #[must_use]
    pub fn score(&self) -> f64 {
        weighted_score(&WEIGHTS, &self.normalized())
    }
}

/// Sharpness dimension analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharpnessAnalyzer;

impl DimensionAnalyzer for SharpnessAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Sharpness
    }

    fn analyze(&self, plane: &GrayPlane) -> f64 {
        let analysis = SharpnessAnalysis::analyze(plane);
        trace!(
            laplacian_variance = analysis.laplacian_variance,
            mean_gradient = analysis.mean_gradient,
            high_frequency_energy = analysis.high_frequency_energy,
            edge_density = analysis.edge_density,
            "sharpness metrics"
        );
        analysis.score()
    }
}
