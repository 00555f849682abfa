//! Exam types, weight profiles and clinical standards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Dimension, DimensionScores, PixelDimensionScores, UnknownExamType};

/// Capture modality of an ophthalmic image.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    /// Fundus photography.
    #[default]
    Fundoscopy,
    /// Optical coherence tomography B-scan.
    Oct,
    /// Fluorescein / ICG angiography frame.
    Angiography,
}

impl ExamType {
    /// All exam types, in declaration order.
    pub const ALL: [Self; 3] = [Self::Fundoscopy, Self::Oct, Self::Angiography];

    /// Returns the wire tag of this exam type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fundoscopy => "fundoscopy",
            Self::Oct => "oct",
            Self::Angiography => "angiography",
        }
    }

    /// Parses a tag, falling back to [`ExamType::Fundoscopy`] for anything
    /// unrecognized.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            warn!("Unknown exam type '{tag}', using fundoscopy profile");
            Self::Fundoscopy
        })
    }

    /// Returns the fixed weight profile for this exam type.
    #[must_use]
    pub const fn weights(self) -> &'static ExamWeightProfile {
        match self {
            Self::Fundoscopy => &ExamWeightProfile::FUNDOSCOPY,
            Self::Oct => &ExamWeightProfile::OCT,
            Self::Angiography => &ExamWeightProfile::ANGIOGRAPHY,
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamType {
    type Err = UnknownExamType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|exam| exam.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| UnknownExamType(s.to_string()))
    }
}

/// Per-dimension weights for one exam type. Weights sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExamWeightProfile {
    /// Sharpness weight.
    pub sharpness: f64,
    /// Exposure weight.
    pub exposure: f64,
    /// Contrast weight.
    pub contrast: f64,
    /// Noise level weight.
    pub noise_level: f64,
    /// Artifacts weight.
    pub artifacts: f64,
    /// Clinical adequacy weight.
    pub clinical_adequacy: f64,
}

impl ExamWeightProfile {
    /// Fundoscopy profile.
    pub const FUNDOSCOPY: Self = Self {
        sharpness: 0.25,
        exposure: 0.20,
        contrast: 0.15,
        noise_level: 0.15,
        artifacts: 0.15,
        clinical_adequacy: 0.10,
    };

    /// OCT profile.
    pub const OCT: Self = Self {
        sharpness: 0.30,
        exposure: 0.15,
        contrast: 0.20,
        noise_level: 0.20,
        artifacts: 0.10,
        clinical_adequacy: 0.05,
    };

    /// Angiography profile.
    pub const ANGIOGRAPHY: Self = Self {
        sharpness: 0.20,
        exposure: 0.25,
        contrast: 0.25,
        noise_level: 0.15,
        artifacts: 0.10,
        clinical_adequacy: 0.05,
    };

    /// Returns the weight of a single dimension.
    #[must_use]
    pub const fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Sharpness => self.sharpness,
            Dimension::Exposure => self.exposure,
            Dimension::Contrast => self.contrast,
            Dimension::NoiseLevel => self.noise_level,
            Dimension::Artifacts => self.artifacts,
            Dimension::ClinicalAdequacy => self.clinical_adequacy,
        }
    }

    /// Weighted sum over all six dimensions, accumulated in dimension order.
    #[must_use]
    pub fn weighted_sum(&self, scores: &DimensionScores) -> f64 {
        scores
            .iter()
            .fold(0.0, |acc, (dim, score)| acc + self.weight(dim) * score)
    }

    /// Weighted sum over the five pixel-level dimensions only.
    ///
    /// The clinical adequacy weight is not applied and the result is not
    /// renormalized, so the maximum is `100 * (1 - clinical_adequacy)`.
    #[must_use]
    pub fn pixel_weighted_sum(&self, scores: &PixelDimensionScores) -> f64 {
        scores
            .iter()
            .fold(0.0, |acc, (dim, score)| acc + self.weight(dim) * score)
    }
}

/// Clinical thresholds for ophthalmic imaging.
///
/// Only `min_resolution` feeds a formula (the clinical adequacy resolution
/// term); the remaining values are carried for reporting and consistency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalStandards {
    /// Minimum acceptable short side in pixels.
    pub min_resolution: u32,
    /// Optimal short side in pixels.
    pub optimal_resolution: u32,
    /// Minimum contrast.
    pub contrast_threshold: f64,
    /// Maximum noise level.
    pub noise_threshold: f64,
    /// Minimum sharpness.
    pub sharpness_threshold: f64,
    /// Acceptable exposure range.
    pub exposure_range: (f64, f64),
}

impl Default for ClinicalStandards {
    fn default() -> Self {
        Self {
            min_resolution: 512,
            optimal_resolution: 1024,
            contrast_threshold: 0.3,
            noise_threshold: 0.15,
            sharpness_threshold: 0.7,
            exposure_range: (0.2, 0.8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_sum_to_one() {
        for exam in ExamType::ALL {
            let profile = exam.weights();
            let total: f64 = Dimension::ALL.iter().map(|d| profile.weight(*d)).sum();
            assert!((total - 1.0).abs() < 1e-9, "{exam} weights sum to {total}");
        }
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("oct".parse::<ExamType>(), Ok(ExamType::Oct));
        assert_eq!(" Angiography ".parse::<ExamType>(), Ok(ExamType::Angiography));
        assert!("ultrasound".parse::<ExamType>().is_err());
    }

    #[test]
    fn test_lenient_tag_falls_back_to_fundoscopy() {
        assert_eq!(ExamType::from_tag("ultrasound"), ExamType::Fundoscopy);
        assert_eq!(ExamType::from_tag(""), ExamType::Fundoscopy);
        assert_eq!(ExamType::from_tag("OCT"), ExamType::Oct);
    }

    #[test]
    fn test_pixel_weighted_sum_ignores_clinical_weight() {
        let scores = PixelDimensionScores {
            sharpness: 100.0,
            exposure: 100.0,
            contrast: 100.0,
            noise_level: 100.0,
            artifacts: 100.0,
        };
        let sum = ExamWeightProfile::FUNDOSCOPY.pixel_weighted_sum(&scores);
        assert!((sum - 90.0).abs() < 1e-9, "got {sum}");

        let sum = ExamWeightProfile::OCT.pixel_weighted_sum(&scores);
        assert!((sum - 95.0).abs() < 1e-9, "got {sum}");
    }

    #[test]
    fn test_default_standards() {
        let standards = ClinicalStandards::default();
        assert_eq!(standards.min_resolution, 512);
        assert_eq!(standards.optimal_resolution, 1024);
        assert!((standards.exposure_range.0 - 0.2).abs() < f64::EPSILON);
    }
}
