//! Artifact detection.
//!
//! Starts from a perfect score and subtracts capped penalties for motion
//! blur, 8x8 block discontinuities, saturated pixels and small specular
//! reflections.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::trace;

use super::clamp_score;
use crate::domain::{Dimension, DimensionAnalyzer};
use crate::imaging::spectrum::Spectrum;
use crate::preprocess::GrayPlane;

/// Coefficient of variation in the low-frequency disk below which the
/// spectrum is considered smeared by motion.
const MOTION_VARIATION: f64 = 0.3;
const MOTION_PENALTY: f64 = 20.0;

const BLOCK: usize = 8;
/// Mean absolute step across a block boundary that counts as a violation.
const BLOCK_STEP: f64 = 0.1;
const BLOCKING_PENALTY: f64 = 30.0;

const SATURATION_HIGH: f64 = 0.98;
const SATURATION_LOW: f64 = 0.02;
const SATURATION_PENALTY: f64 = 50.0;

/// Pixels above this form candidate reflection regions.
const BRIGHT: f64 = 0.9;
/// Regions smaller than this, with a mean above `REFLECTION_MEAN`, count.
const REFLECTION_MAX_AREA: usize = 100;
const REFLECTION_MEAN: f64 = 0.95;
const REFLECTION_EACH: f64 = 5.0;
const REFLECTION_CAP: f64 = 25.0;

/// Raw artifact measurements.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactAnalysis {
    /// Whether the low-frequency spectrum looks motion-smeared.
    pub motion_blur: bool,
    /// Block boundary violations over twice the number of full blocks.
    pub blocking_ratio: f64,
    /// Fraction of pixels above 0.98 or below 0.02.
    pub saturation_fraction: f64,
    /// Uncapped reflection penalty, 5 per qualifying region.
    pub reflection_penalty: f64,
}

impl ArtifactAnalysis {
    /// Measures artifacts in a plane.
    #[must_use]
    pub fn analyze(plane: &GrayPlane) -> Self {
        let motion_blur = Spectrum::from_plane(plane)
            .low_frequency_variation()
            .is_some_and(|variation| variation < MOTION_VARIATION);

        Self {
            motion_blur,
            blocking_ratio: blocking_ratio(plane),
            saturation_fraction: plane.fraction(|v| v > SATURATION_HIGH || v < SATURATION_LOW),
            reflection_penalty: reflection_penalty(plane),
        }
    }

    /// Sum of the capped penalties.
    #[must_use]
    pub fn total_penalty(&self) -> f64 {
        let motion = if self.motion_blur { MOTION_PENALTY } else { 0.0 };
        motion
            + (self.blocking_ratio * BLOCKING_PENALTY).min(BLOCKING_PENALTY)
            + (self.saturation_fraction * SATURATION_PENALTY).min(SATURATION_PENALTY)
            + self.reflection_penalty.min(REFLECTION_CAP)
    }

    /// Artifact score in `[0, 100]`, higher is cleaner.
    #[must_use]
    pub fn score(&self) -> f64 {
        clamp_score(100.0 - self.total_penalty())
    }
}

/// Counts top and left block-boundary violations.
///
/// Block origins step by 8 while strictly below `side - 8`, so the last full
/// block along each axis is never an origin.
#[allow(clippy::cast_precision_loss)]
fn blocking_ratio(plane: &GrayPlane) -> f64 {
    let (w, h) = (plane.width(), plane.height());
    let mut violations = 0usize;
    for i in (0..h.saturating_sub(BLOCK)).step_by(BLOCK) {
        for j in (0..w.saturating_sub(BLOCK)).step_by(BLOCK) {
            if i > 0 {
                let step: f64 = (j..j + BLOCK)
                    .map(|x| (plane.get(x, i) - plane.get(x, i - 1)).abs())
                    .sum::<f64>()
                    / BLOCK as f64;
                if step > BLOCK_STEP {
                    violations += 1;
                }
            }
            if j > 0 {
                let step: f64 = (i..i + BLOCK)
                    .map(|y| (plane.get(j, y) - plane.get(j - 1, y)).abs())
                    .sum::<f64>()
                    / BLOCK as f64;
                if step > BLOCK_STEP {
                    violations += 1;
                }
            }
        }
    }
    let total_blocks = (h / BLOCK) * (w / BLOCK);
    violations as f64 / (total_blocks * 2).max(1) as f64
}

/// Five points for every small, very bright 8-connected region.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn reflection_penalty(plane: &GrayPlane) -> f64 {
    let (w, h) = (plane.width() as u32, plane.height() as u32);
    let mask = GrayImage::from_fn(w, h, |x, y| {
        if plane.get(x as usize, y as usize) > BRIGHT {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    let labels = connected_components(&mask, Connectivity::Eight, Luma([0]));

    let regions = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
    let mut area = vec![0usize; regions + 1];
    let mut sum = vec![0.0f64; regions + 1];
    for (label, &value) in labels.pixels().zip(plane.data()) {
        let label = label.0[0] as usize;
        if label > 0 {
            area[label] += 1;
            sum[label] += value;
        }
    }

    let qualifying = area
        .iter()
        .zip(&sum)
        .skip(1)
        .filter(|&(&a, &s)| a > 0 && a < REFLECTION_MAX_AREA && s / a as f64 > REFLECTION_MEAN)
        .count();
    qualifying as f64 * REFLECTION_EACH
}

/// Artifacts dimension analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactAnalyzer;

impl DimensionAnalyzer for ArtifactAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Artifacts
    }

    fn analyze(&self, plane: &GrayPlane) -> f64 {
        let analysis = ArtifactAnalysis::analyze(plane);
        trace!(
            motion_blur = analysis.motion_blur,
            blocking_ratio = analysis.blocking_ratio,
            saturation_fraction = analysis.saturation_fraction,
            reflection_penalty = analysis.reflection_penalty,
            "artifact metrics"
        );
        analysis.score()
    }
}
