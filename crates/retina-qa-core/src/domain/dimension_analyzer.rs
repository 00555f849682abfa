//! Analyzer trait for the pixel-level quality dimensions.

use super::Dimension;
use crate::preprocess::GrayPlane;

/// Trait for implementing a single quality dimension.
///
/// Each analyzer is a pure function of the preprocessed grayscale plane and
/// returns a score in `[0, 100]`, where higher is better.
pub trait DimensionAnalyzer: Send + Sync {
    /// Returns the dimension this analyzer scores.
    fn dimension(&self) -> Dimension;

    /// Scores the plane.
    ///
    /// # Arguments
    ///
    /// * `plane` - Normalized grayscale plane produced by the preprocessor
    ///
    /// # Returns
    ///
    /// A finite score clamped to `[0, 100]`.
    fn analyze(&self, plane: &GrayPlane) -> f64;
}
