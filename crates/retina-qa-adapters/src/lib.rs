//! Retina QA Adapters - External adapters for retina-qa.
//!
//! This crate provides the filesystem image source used by the CLI.

pub mod fs;

pub use fs::{is_supported_image, FsImageSource};
