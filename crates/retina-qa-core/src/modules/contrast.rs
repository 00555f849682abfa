//! Contrast analysis.

use imageproc::edges::canny;
use tracing::trace;

use super::{normalized, weighted_score};
use crate::domain::{Dimension, DimensionAnalyzer};
use crate::imaging::filters::unsharp_mask;
use crate::imaging::peaks::local_maxima;
use crate::imaging::stats;
use crate::preprocess::GrayPlane;

const WEIGHTS: [f64; 4] = [0.3, 0.25, 0.25, 0.2];

/// Minimum spacing between sampled extrema of the sharpened plane.
const PEAK_SPACING: usize = 20;
/// Side of the local-contrast window.
const WINDOW: usize = 32;
/// Step between local-contrast windows.
const STRIDE: usize = WINDOW / 2;

/// Raw contrast metrics.
#[derive(Debug, Clone, Copy)]
pub struct ContrastAnalysis {
    /// Population standard deviation of the plane.
    pub rms: f64,
    /// Michelson-style contrast between local extrema of the sharpened plane.
    pub michelson: f64,
    /// Mean standard deviation over sliding windows.
    pub mean_local: f64,
    /// Mean intensity difference between edge and non-edge pixels.
    pub edge: f64,
}

impl ContrastAnalysis {
    /// Computes contrast metrics for a plane.
    #[must_use]
    pub fn analyze(plane: &GrayPlane) -> Self {
        Self {
            rms: plane.std_dev(),
            michelson: michelson_contrast(plane),
            mean_local: mean_local_contrast(plane),
            edge: edge_contrast(plane),
        }
    }

    /// Normalized metrics in weight order.
    #[must_use]
    pub fn normalized(&self) -> [f64; 4] {
        [
            normalized(self.rms, 0.3),
            normalized(self.michelson.abs(), 0.5),
            normalized(self.mean_local, 0.2),
            normalized(self.edge, 0.3),
        ]
    }

    /// Contrast score in `[0, 100]`.
    #[must_use]
    pub fn score(&self) -> f64 {
        weighted_score(&WEIGHTS, &self.normalized())
    }
}

/// `|mean(max) - mean(min)| / (mean(max) + mean(min) + 1e-8)` over local
/// extrema of the unsharp-masked plane; 0 when either set is empty.
fn michelson_contrast(plane: &GrayPlane) -> f64 {
    let (w, h) = (plane.width(), plane.height());
    let sharpened = unsharp_mask(plane, 2.0, 1.0);
    let negated: Vec<f64> = sharpened.iter().map(|v| -v).collect();

    let sample = |points: &[(usize, usize)]| -> Vec<f64> {
        points.iter().map(|&(x, y)| sharpened[y * w + x]).collect()
    };
    let maxima = sample(&local_maxima(&sharpened, w, h, PEAK_SPACING));
    let minima = sample(&local_maxima(&negated, w, h, PEAK_SPACING));
    if maxima.is_empty() || minima.is_empty() {
        return 0.0;
    }

    let (max_mean, min_mean) = (stats::mean(&maxima), stats::mean(&minima));
    (max_mean - min_mean).abs() / (max_mean + min_mean + 1e-8)
}

/// Mean of per-window standard deviations; 0 when the plane is too small for
/// any window.
fn mean_local_contrast(plane: &GrayPlane) -> f64 {
    let (w, h) = (plane.width(), plane.height());
    let mut window = Vec::with_capacity(WINDOW * WINDOW);
    let mut contrasts = Vec::new();
    for y in (0..h.saturating_sub(WINDOW)).step_by(STRIDE) {
        for x in (0..w.saturating_sub(WINDOW)).step_by(STRIDE) {
            window.clear();
            for row in y..y + WINDOW {
                window.extend_from_slice(&plane.row(row)[x..x + WINDOW]);
            }
            contrasts.push(stats::std_dev(&window));
        }
    }
    stats::mean(&contrasts)
}

/// Mean intensity gap between Canny edge pixels and the rest; 0 when either
/// set is empty.
fn edge_contrast(plane: &GrayPlane) -> f64 {
    let edges = canny(&plane.to_luma8(), 50.0, 150.0);
    let (mut on, mut off) = (Vec::new(), Vec::new());
    for (pixel, &v) in edges.pixels().zip(plane.data()) {
        if pixel.0[0] > 0 {
            on.push(v);
        } else {
            off.push(v);
        }
    }
    if on.is_empty() || off.is_empty() {
        return 0.0;
    }
    (stats::mean(&on) - stats::mean(&off)).abs()
}

/// Contrast dimension analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContrastAnalyzer;

impl DimensionAnalyzer for ContrastAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Contrast
    }

    fn analyze(&self, plane: &GrayPlane) -> f64 {
        let analysis = ContrastAnalysis::analyze(plane);
        trace!(
            rms = analysis.rms,
            michelson = analysis.michelson,
            mean_local = analysis.mean_local,
            edge = analysis.edge,
            "contrast metrics"
        );
        analysis.score()
    }
}

#[cfg(test)]
#[allow(clippy::cast_precision_loss)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension() {
        assert_eq!(ContrastAnalyzer.dimension(), Dimension::Contrast);
    }

    #[test]
    fn test_uniform_plane_has_no_contrast() {
        let plane = GrayPlane::from_fn(96, 96, |_, _| 0.4);
        let analysis = ContrastAnalysis::analyze(&plane);
        assert!(analysis.rms.abs() < 1e-12);
        assert!(analysis.michelson.abs() < f64::EPSILON);
        assert!(analysis.mean_local.abs() < 1e-12);
        assert!(analysis.edge.abs() < f64::EPSILON);
        assert!(analysis.score().abs() < 1e-9);
    }

    #[test]
    fn test_small_plane_has_no_windows() {
        let plane = GrayPlane::from_fn(32, 32, |x, _| (x % 2) as f32);
        assert!(mean_local_contrast(&plane).abs() < f64::EPSILON);
    }

    #[test]
    fn test_window_origins_exclude_last_full_window() {
        // 48 rows and columns admit origins 0 only: range(0, 16, 16)
        let plane = GrayPlane::from_fn(48, 48, |x, y| if x >= 32 || y >= 32 { 1.0 } else { 0.0 });
        assert!(mean_local_contrast(&plane).abs() < f64::EPSILON);
    }

    #[test]
    fn test_half_split_edge_contrast() {
        let plane = GrayPlane::from_fn(64, 64, |x, _| if x < 32 { 0.2 } else { 0.8 });
        let analysis = ContrastAnalysis::analyze(&plane);
        assert!((analysis.rms - 0.3).abs() < 1e-6);
        assert!(analysis.edge > 0.0);
    }

    #[test]
    fn test_blobs_give_michelson_contrast() {
        // Period-64 blobs leave several extrema of each sign inside the border
        let plane = GrayPlane::from_fn(192, 192, |x, y| {
            let fx = (x as f32 / 64.0 * std::f32::consts::TAU).sin();
            let fy = (y as f32 / 64.0 * std::f32::consts::TAU).sin();
            0.5 + 0.3 * fx * fy
        });
        let analysis = ContrastAnalysis::analyze(&plane);
        assert!(analysis.michelson > 0.3, "michelson={}", analysis.michelson);
        let score = ContrastAnalyzer.analyze(&plane);
        assert!(score > 30.0 && score <= 100.0, "score={score}");
    }
}
