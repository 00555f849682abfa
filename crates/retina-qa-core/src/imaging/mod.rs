//! Image-processing primitives shared by the dimension analyzers.

pub mod corners;
pub mod filters;
pub mod hough;
pub mod peaks;
pub mod spectrum;
pub mod stats;
