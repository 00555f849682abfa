//! Score types produced by the quality analysis.

use serde::{Deserialize, Serialize};

/// Opaque caller-supplied metadata, copied verbatim into the result.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One of the six quality axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Focus and edge definition.
    Sharpness,
    /// Brightness distribution and clipping.
    Exposure,
    /// Global and local contrast.
    Contrast,
    /// Absence of noise (higher is cleaner).
    NoiseLevel,
    /// Absence of motion, compression, saturation and reflection artifacts.
    Artifacts,
    /// Suitability for clinical reading.
    ClinicalAdequacy,
}

impl Dimension {
    /// All dimensions in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Sharpness,
        Self::Exposure,
        Self::Contrast,
        Self::NoiseLevel,
        Self::Artifacts,
        Self::ClinicalAdequacy,
    ];

    /// Returns the wire name of this dimension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sharpness => "sharpness",
            Self::Exposure => "exposure",
            Self::Contrast => "contrast",
            Self::NoiseLevel => "noise_level",
            Self::Artifacts => "artifacts",
            Self::ClinicalAdequacy => "clinical_adequacy",
        }
    }
}

/// Scores of the five dimensions computed directly from pixels.
///
/// Clinical adequacy is derived from these, so it is kept out of this type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelDimensionScores {
    /// Sharpness score (0-100).
    pub sharpness: f64,
    /// Exposure score (0-100).
    pub exposure: f64,
    /// Contrast score (0-100).
    pub contrast: f64,
    /// Noise score (0-100, higher is cleaner).
    pub noise_level: f64,
    /// Artifact score (0-100, higher is cleaner).
    pub artifacts: f64,
}

impl PixelDimensionScores {
    /// Sets one dimension's score. Clinical adequacy has no slot here and is
    /// ignored.
    pub fn set(&mut self, dimension: Dimension, score: f64) {
        match dimension {
            Dimension::Sharpness => self.sharpness = score,
            Dimension::Exposure => self.exposure = score,
            Dimension::Contrast => self.contrast = score,
            Dimension::NoiseLevel => self.noise_level = score,
            Dimension::Artifacts => self.artifacts = score,
            Dimension::ClinicalAdequacy => {}
        }
    }

    /// Iterates `(dimension, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> {
        [
            (Dimension::Sharpness, self.sharpness),
            (Dimension::Exposure, self.exposure),
            (Dimension::Contrast, self.contrast),
            (Dimension::NoiseLevel, self.noise_level),
            (Dimension::Artifacts, self.artifacts),
        ]
        .into_iter()
    }

    /// Completes the map with the clinical adequacy score.
    #[must_use]
    pub const fn with_clinical_adequacy(self, clinical_adequacy: f64) -> DimensionScores {
        DimensionScores {
            sharpness: self.sharpness,
            exposure: self.exposure,
            contrast: self.contrast,
            noise_level: self.noise_level,
            artifacts: self.artifacts,
            clinical_adequacy,
        }
    }
}

/// Scores for all six dimensions. Every key is always present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    /// Sharpness score (0-100).
    pub sharpness: f64,
    /// Exposure score (0-100).
    pub exposure: f64,
    /// Contrast score (0-100).
    pub contrast: f64,
    /// Noise score (0-100, higher is cleaner).
    pub noise_level: f64,
    /// Artifact score (0-100, higher is cleaner).
    pub artifacts: f64,
    /// Clinical adequacy score (0-100).
    pub clinical_adequacy: f64,
}

impl DimensionScores {
    /// Builds a map with every dimension set to `score`.
    #[must_use]
    pub const fn uniform(score: f64) -> Self {
        Self {
            sharpness: score,
            exposure: score,
            contrast: score,
            noise_level: score,
            artifacts: score,
            clinical_adequacy: score,
        }
    }

    /// Returns the score of one dimension.
    #[must_use]
    pub const fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Sharpness => self.sharpness,
            Dimension::Exposure => self.exposure,
            Dimension::Contrast => self.contrast,
            Dimension::NoiseLevel => self.noise_level,
            Dimension::Artifacts => self.artifacts,
            Dimension::ClinicalAdequacy => self.clinical_adequacy,
        }
    }

    /// Iterates `(dimension, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(|dim| (dim, self.get(dim)))
    }

    /// Scores as an array in canonical order.
    #[must_use]
    pub const fn values(&self) -> [f64; 6] {
        [
            self.sharpness,
            self.exposure,
            self.contrast,
            self.noise_level,
            self.artifacts,
            self.clinical_adequacy,
        ]
    }

    /// Whether every dimension scores at least `threshold`.
    #[must_use]
    pub fn all_at_least(&self, threshold: f64) -> bool {
        self.values().iter().all(|&score| score >= threshold)
    }

    /// Arithmetic mean of the six scores.
    #[must_use]
    pub fn mean(&self) -> f64 {
        crate::imaging::stats::mean(&self.values())
    }

    /// Population standard deviation of the six scores.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        crate::imaging::stats::std_dev(&self.values())
    }
}

/// Suitability of an image as machine-learning training input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MlReadiness {
    /// Research-grade training data.
    Excellent,
    /// Suitable for clinical ML.
    Good,
    /// Usable with preprocessing.
    Fair,
    /// Not recommended for ML.
    Poor,
}

impl MlReadiness {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

/// Suitability of an image for human clinical use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalAdequacy {
    /// Adequate for diagnosis.
    Diagnostic,
    /// Adequate for screening only.
    Screening,
    /// Not adequate for clinical use.
    Inadequate,
}

impl ClinicalAdequacy {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Diagnostic => "diagnostic",
            Self::Screening => "screening",
            Self::Inadequate => "inadequate",
        }
    }
}

/// Complete quality assessment for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// Aggregate score (0-100).
    pub global_score: f64,
    /// Per-dimension scores.
    pub dimension_scores: DimensionScores,
    /// Trust in the global score (0-100).
    pub confidence: f64,
    /// ML readiness category.
    pub ml_readiness: MlReadiness,
    /// Clinical adequacy category.
    pub clinical_adequacy: ClinicalAdequacy,
    /// Ordered remediation advice, never empty.
    pub recommendations: Vec<String>,
    /// Caller metadata, copied verbatim.
    pub metadata: Metadata,
}
