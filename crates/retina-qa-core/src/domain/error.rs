//! Error types raised at the input boundary.

use thiserror::Error;

use super::MIN_DIMENSION;

/// Rejection of an image buffer before any statistic is computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The buffer has a zero width or height.
    #[error("image buffer is empty ({width}x{height})")]
    Empty {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// The buffer is below the minimum analyzable size.
    #[error("image is {width}x{height}, minimum analyzable size is {min}x{min}", min = MIN_DIMENSION)]
    TooSmall {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// The sample vector does not match `width * height * channels`.
    #[error("expected {expected} samples, got {actual}")]
    SampleCountMismatch {
        /// Expected number of samples.
        expected: usize,
        /// Actual number of samples.
        actual: usize,
    },
    /// A floating-point sample is NaN or infinite.
    #[error("sample {index} is not finite")]
    NonFiniteSample {
        /// Index of the first offending sample.
        index: usize,
    },
}

/// Strict exam-type parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown exam type '{0}' (expected fundoscopy, oct or angiography)")]
pub struct UnknownExamType(pub String);
