//! The scoring pipeline: preprocess, run the analyzers, aggregate.

use std::fmt;

use image::DynamicImage;
use tracing::debug;

use crate::domain::{
    ClinicalStandards, DimensionAnalyzer, ExamType, ImageBuffer, InputError, Metadata,
    PixelDimensionScores, QualityScore, MIN_DIMENSION,
};
use crate::modules::{clamp_score, default_analyzers, ClinicalAdequacyAnalyzer};
use crate::preprocess::GrayPlane;
use crate::scoring;

/// Multi-dimensional quality scorer for ophthalmic images.
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads and reused for any number of images.
pub struct QualityScorer {
    clinical: ClinicalAdequacyAnalyzer,
    analyzers: Vec<Box<dyn DimensionAnalyzer>>,
}

impl QualityScorer {
    /// Creates a scorer bound to the given clinical standards.
    #[must_use]
    pub fn new(standards: ClinicalStandards) -> Self {
        Self {
            clinical: ClinicalAdequacyAnalyzer::new(standards),
            analyzers: default_analyzers(),
        }
    }

    /// Returns the clinical standards in use.
    #[must_use]
    pub const fn standards(&self) -> &ClinicalStandards {
        self.clinical.standards()
    }

    /// Scores one image buffer.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::TooSmall`] when either side is below
    /// [`MIN_DIMENSION`]. Buffer construction already rejected the other
    /// input errors.
    pub fn analyze(
        &self,
        buffer: &ImageBuffer,
        exam: ExamType,
        metadata: Metadata,
    ) -> Result<QualityScore, InputError> {
        let (width, height) = (buffer.width(), buffer.height());
        if width < MIN_DIMENSION || height < MIN_DIMENSION {
            return Err(InputError::TooSmall { width, height });
        }

        let plane = GrayPlane::from_buffer(buffer);

        let mut pixel = PixelDimensionScores::default();
        for analyzer in &self.analyzers {
            let dimension = analyzer.dimension();
            let score = clamp_score(analyzer.analyze(&plane));
            debug!(dimension = dimension.as_str(), score, "dimension scored");
            pixel.set(dimension, score);
        }

        let clinical = self.clinical.assess(&plane, exam, &pixel);
        debug!(dimension = "clinical_adequacy", score = clinical, "dimension scored");
        let scores = pixel.with_clinical_adequacy(clinical);

        let global_score = scoring::global_score(&scores, exam);
        let confidence = scoring::confidence(&scores, &plane);
        let ml_readiness = scoring::ml_readiness(global_score, &scores);
        let clinical_adequacy = scoring::clinical_adequacy(global_score, &scores);
        debug!(
            exam = exam.as_str(),
            global_score,
            confidence,
            ml_readiness = ml_readiness.as_str(),
            clinical_adequacy = clinical_adequacy.as_str(),
            "image scored"
        );

        Ok(QualityScore {
            global_score,
            dimension_scores: scores,
            confidence,
            ml_readiness,
            clinical_adequacy,
            recommendations: scoring::recommendations(&scores, exam),
            metadata,
        })
    }

    /// Scores a decoded image.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if the image cannot be converted or is too
    /// small.
    pub fn analyze_image(
        &self,
        image: &DynamicImage,
        exam: ExamType,
        metadata: Metadata,
    ) -> Result<QualityScore, InputError> {
        let buffer = ImageBuffer::from_dynamic(image)?;
        self.analyze(&buffer, exam, metadata)
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(ClinicalStandards::default())
    }
}

impl fmt::Debug for QualityScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dimensions: Vec<_> = self.analyzers.iter().map(|a| a.dimension()).collect();
        f.debug_struct("QualityScorer")
            .field("standards", self.standards())
            .field("analyzers", &dimensions)
            .finish()
    }
}

/// Scores a buffer with default standards.
///
/// Unknown exam tags fall back to fundoscopy with a warning.
///
/// # Errors
///
/// See [`QualityScorer::analyze`].
pub fn analyze_image_quality(
    buffer: &ImageBuffer,
    exam_type: &str,
    metadata: Metadata,
) -> Result<QualityScore, InputError> {
    QualityScorer::default().analyze(buffer, ExamType::from_tag(exam_type), metadata)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
mod tests {
    use super::*;
    use crate::domain::{ClinicalAdequacy, MlReadiness};

    fn gray(size: u32, value: u8) -> ImageBuffer {
        ImageBuffer::gray_u8(size, size, vec![value; (size * size) as usize]).unwrap()
    }

    fn textured(size: u32) -> ImageBuffer {
        let samples = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    200
                } else {
                    40
                }
            })
            .collect();
        ImageBuffer::gray_u8(size, size, samples).unwrap()
    }

    #[test]
    fn test_too_small_rejected() {
        let err = QualityScorer::default()
            .analyze(&gray(4, 128), ExamType::Fundoscopy, Metadata::new())
            .unwrap_err();
        assert_eq!(err, InputError::TooSmall { width: 4, height: 4 });
    }

    #[test]
    fn test_minimum_size_accepted() {
        let score = QualityScorer::default()
            .analyze(&gray(MIN_DIMENSION, 128), ExamType::Oct, Metadata::new())
            .unwrap();
        assert!((0.0..=100.0).contains(&score.global_score));
    }

    #[test]
    fn test_scores_in_range_and_recommendations_present() {
        let scorer = QualityScorer::default();
        for exam in ExamType::ALL {
            let score = scorer.analyze(&textured(64), exam, Metadata::new()).unwrap();
            assert!((0.0..=100.0).contains(&score.global_score));
            assert!((0.0..=100.0).contains(&score.confidence));
            for (_, value) in score.dimension_scores.iter() {
                assert!((0.0..=100.0).contains(&value), "{exam}: {value}");
            }
            assert!(!score.recommendations.is_empty());
        }
    }

    #[test]
    fn test_deterministic() {
        let scorer = QualityScorer::default();
        let a = scorer.analyze(&textured(64), ExamType::Oct, Metadata::new()).unwrap();
        let b = scorer.analyze(&textured(64), ExamType::Oct, Metadata::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_exam_matches_fundoscopy() {
        let buffer = textured(64);
        let unknown = analyze_image_quality(&buffer, "xray", Metadata::new()).unwrap();
        let fundus = analyze_image_quality(&buffer, "fundoscopy", Metadata::new()).unwrap();
        assert_eq!(unknown, fundus);
    }

    #[test]
    fn test_metadata_copied_verbatim() {
        let mut metadata = Metadata::new();
        metadata.insert("patient".into(), serde_json::json!({"id": 7, "eye": "OD"}));
        let score = QualityScorer::default()
            .analyze(&gray(32, 128), ExamType::Fundoscopy, metadata.clone())
            .unwrap();
        assert_eq!(score.metadata, metadata);
    }

    #[test]
    fn test_u8_and_float_inputs_agree() {
        let bytes = gray(32, 128);
        let floats =
            ImageBuffer::gray_f32(32, 32, vec![128.0 / 255.0; 32 * 32]).unwrap();
        let scorer = QualityScorer::default();
        let a = scorer.analyze(&bytes, ExamType::Fundoscopy, Metadata::new()).unwrap();
        let b = scorer.analyze(&floats, ExamType::Fundoscopy, Metadata::new()).unwrap();
        assert_eq!(a.dimension_scores, b.dimension_scores);
    }

    #[test]
    fn test_flat_gray_is_inadequate() {
        let score = QualityScorer::default()
            .analyze(&gray(64, 128), ExamType::Fundoscopy, Metadata::new())
            .unwrap();
        assert!(score.dimension_scores.sharpness < 30.0);
        assert!((score.dimension_scores.artifacts - 100.0).abs() < f64::EPSILON);
        assert_eq!(score.ml_readiness, MlReadiness::Poor);
        assert_eq!(score.clinical_adequacy, ClinicalAdequacy::Inadequate);
    }

    #[test]
    fn test_analyze_image_converts() {
        let image = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            32,
            32,
            image::Luma([128]),
        ));
        let from_image = QualityScorer::default()
            .analyze_image(&image, ExamType::Fundoscopy, Metadata::new())
            .unwrap();
        let from_buffer = QualityScorer::default()
            .analyze(&gray(32, 128), ExamType::Fundoscopy, Metadata::new())
            .unwrap();
        assert_eq!(from_image, from_buffer);
    }

    #[test]
    fn test_custom_standards() {
        let standards = ClinicalStandards {
            min_resolution: 64,
            ..ClinicalStandards::default()
        };
        let scorer = QualityScorer::new(standards);
        assert_eq!(scorer.standards().min_resolution, 64);
        let strict = QualityScorer::default()
            .analyze(&gray(64, 128), ExamType::Fundoscopy, Metadata::new())
            .unwrap();
        let lenient = scorer
            .analyze(&gray(64, 128), ExamType::Fundoscopy, Metadata::new())
            .unwrap();
        assert!(
            lenient.dimension_scores.clinical_adequacy > strict.dimension_scores.clinical_adequacy
        );
    }
}
