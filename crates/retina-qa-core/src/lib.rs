//! Retina QA Core - Quality scoring for ophthalmic diagnostic images
//!
//! This crate contains the domain types, the six dimension analyzers
//! (sharpness, exposure, contrast, noise, artifacts, clinical adequacy),
//! and the aggregation stage that turns them into a [`QualityScore`].
//!
//! All analysis is deterministic and stateless: a [`QualityScorer`] only
//! holds immutable [`ClinicalStandards`] and can be shared across threads.

pub mod domain;
mod imaging;
pub mod modules;
pub mod ports;
pub mod preprocess;
mod scorer;
pub mod scoring;

pub use domain::{
    BatchAccumulator, BatchStatistics, Channels, ClinicalAdequacy, ClinicalStandards, Dimension,
    DimensionAnalyzer, DimensionScores, ExamType, ExamWeightProfile, ImageBuffer, ImageDimensions,
    ImageReport, InputError, LoadedImage, Metadata, MlReadiness, PixelDimensionScores,
    QualityScore, Samples, UnknownExamType, MIN_DIMENSION,
};
pub use ports::{ImageSource, ProgressEvent, ProgressSink, ResultOutput};
pub use preprocess::GrayPlane;
pub use scorer::{analyze_image_quality, QualityScorer};
