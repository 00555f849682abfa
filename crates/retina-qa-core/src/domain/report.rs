//! Per-image report records.

use serde::{Deserialize, Serialize};

use super::{ExamType, QualityScore};

/// Complete report for a single analyzed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    /// Path to the analyzed image.
    pub path: String,
    /// Timestamp of analysis (ISO 8601).
    pub timestamp: String,
    /// Image dimensions.
    pub dimensions: ImageDimensions,
    /// Exam profile the image was scored with.
    pub exam_type: ExamType,
    /// Quality assessment.
    #[serde(flatten)]
    pub score: QualityScore,
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}
