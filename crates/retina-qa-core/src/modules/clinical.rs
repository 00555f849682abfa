//! Clinical adequacy.
//!
//! Unlike the other dimensions this one depends on the five pixel-level
//! scores and the exam type, so it does not implement
//! [`DimensionAnalyzer`](crate::domain::DimensionAnalyzer). It blends the
//! exam-weighted pixel score with resolution, tonal range and a per-exam
//! anatomical structure detector.

use imageproc::edges::canny;
use tracing::trace;

use super::clamp_score;
use crate::domain::{ClinicalStandards, ExamType, PixelDimensionScores};
use crate::imaging::corners::{good_features, CornerParams};
use crate::imaging::filters::sobel_y;
use crate::imaging::hough::{detect_circles, detect_segments, CircleParams, SegmentParams};
use crate::imaging::peaks::find_peaks;
use crate::imaging::stats;
use crate::preprocess::GrayPlane;

/// Tonal range (p95 - p5) considered fully adequate.
const TARGET_DYNAMIC_RANGE: f64 = 0.6;

/// Anatomical structure detectors, one per exam type.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureVisibility;

impl StructureVisibility {
    /// Structure score in `[0, 100]` for the given exam type.
    #[must_use]
    pub fn assess(plane: &GrayPlane, exam: ExamType) -> f64 {
        match exam {
            ExamType::Fundoscopy => Self::fundus(plane),
            ExamType::Oct => Self::oct_layers(plane),
            ExamType::Angiography => Self::generic(plane),
        }
    }

    /// Optic disc and vessel cues.
    ///
    /// 50 points base, 30 for any circle of radius 20-100, 20 for more than
    /// five line segments on the Canny edges.
    #[must_use]
    pub fn fundus(plane: &GrayPlane) -> f64 {
        let gray = plane.to_luma8();
        let mut score = 50.0;

        let circles = detect_circles(&gray, &CircleParams::default(), 1);
        if !circles.is_empty() {
            score += 30.0;
        }

        let edges = canny(&gray, 50.0, 150.0);
        let segments = detect_segments(&edges, &SegmentParams::default());
        if segments.len() > 5 {
            score += 20.0;
        }

        trace!(circles = circles.len(), segments = segments.len(), "fundus structures");
        f64::min(score, 100.0)
    }

    /// Retinal layer interfaces: 15 points per peak of the row-wise mean
    /// vertical gradient that reaches the profile mean.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn oct_layers(plane: &GrayPlane) -> f64 {
        let gradient = sobel_y(plane);
        let width = plane.width();
        let profile: Vec<f64> = gradient
            .chunks_exact(width.max(1))
            .map(|row| row.iter().map(|v| v.abs()).sum::<f64>() / width as f64)
            .collect();
        let layers = find_peaks(&profile, stats::mean(&profile)).len();
        trace!(layers, "oct layers");
        f64::min(layers as f64 * 15.0, 100.0)
    }

    /// Feature density from corner detection; 20 when nothing is found.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn generic(plane: &GrayPlane) -> f64 {
        let corners = good_features(&plane.to_luma8(), &CornerParams::default());
        trace!(corners = corners.len(), "generic structures");
        if corners.is_empty() {
            return 20.0;
        }
        let density = corners.len() as f64 / plane.len() as f64 * 1000.0;
        f64::min(density * 20.0, 100.0)
    }
}

/// Scores clinical adequacy against a set of [`ClinicalStandards`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ClinicalAdequacyAnalyzer {
    standards: ClinicalStandards,
}

impl ClinicalAdequacyAnalyzer {
    /// Creates an analyzer bound to the given standards.
    #[must_use]
    pub const fn new(standards: ClinicalStandards) -> Self {
        Self { standards }
    }

    /// Returns the standards in use.
    #[must_use]
    pub const fn standards(&self) -> &ClinicalStandards {
        &self.standards
    }

    /// `0.6 base + 15 resolution + 15 dynamic + 0.1 structure`, clamped.
    ///
    /// `base` is the exam-weighted sum of the five pixel scores without
    /// renormalization.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn assess(&self, plane: &GrayPlane, exam: ExamType, pixel: &PixelDimensionScores) -> f64 {
        let base = exam.weights().pixel_weighted_sum(pixel);
        let min_resolution = f64::from(self.standards.min_resolution.max(1));
        let resolution = (plane.min_side() as f64 / min_resolution).min(1.0);
        let dynamic = (plane.dynamic_range() / TARGET_DYNAMIC_RANGE).min(1.0);
        let structure = StructureVisibility::assess(plane, exam);

        trace!(base, resolution, dynamic, structure, "clinical factors");
        clamp_score(0.6 * base + 0.15 * resolution * 100.0 + 0.15 * dynamic * 100.0 + 0.1 * structure)
    }
}
