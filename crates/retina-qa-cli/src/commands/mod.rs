//! CLI command definitions and handlers.

pub mod check;

use clap::{Parser, Subcommand};

/// Retina QA - Quality scoring for ophthalmic images
#[derive(Parser)]
#[command(name = "retina-qa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, exam type, output flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Score images for quality
    Check(check::CheckArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every analyzed image is at least screening grade, or none was analyzed.
    Success = 0,
    /// At least one image was classified clinically inadequate.
    InadequateFound = 1,
    /// The run failed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
