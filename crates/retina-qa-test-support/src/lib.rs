//! Test support utilities for retina-qa.
//!
//! Provides synthetic ophthalmic images and mocks of the core ports.
//!
//! # Example
//!
//! ```
//! use retina_qa_test_support::{MockImageSource, SyntheticImageBuilder};
//!
//! let fundus = SyntheticImageBuilder::fundus(256);
//! let flat = SyntheticImageBuilder::uniform_gray(128, 128, 128);
//! let noisy = SyntheticImageBuilder::with_gaussian_noise(&flat, 0.05, 7);
//!
//! let source = MockImageSource::new(vec![fundus, flat, noisy]);
//! ```

mod builders;
mod mocks;

pub use builders::SyntheticImageBuilder;
pub use mocks::{MockImageSource, MockProgressSink, MockResultOutput};
