//! Output formatting for CLI.

mod json;
mod progress;

pub use json::{round_floats, JsonOutput, OutputFormat};
pub use progress::{BatchProgress, ProgressMode};
