//! Core domain types for ophthalmic image quality scoring.

mod batch;
mod buffer;
mod dimension_analyzer;
mod error;
mod exam;
mod report;
mod score;

pub use batch::{BatchAccumulator, BatchStatistics};
pub use buffer::{Channels, ImageBuffer, LoadedImage, Samples, MIN_DIMENSION};
pub use dimension_analyzer::DimensionAnalyzer;
pub use error::{InputError, UnknownExamType};
pub use exam::{ClinicalStandards, ExamType, ExamWeightProfile};
pub use report::{ImageDimensions, ImageReport};
pub use score::{
    ClinicalAdequacy, Dimension, DimensionScores, Metadata, MlReadiness, PixelDimensionScores,
    QualityScore,
};
