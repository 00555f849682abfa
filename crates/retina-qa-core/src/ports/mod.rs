//! Port definitions for hexagonal architecture.
//!
//! The scoring engine itself never touches the filesystem or a terminal;
//! batch drivers plug image sources, progress displays and result writers
//! in through these traits.

mod image_source;
mod progress;
mod result_output;

pub use image_source::ImageSource;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
