//! Progress reporting port.

use crate::domain::ImageReport;

/// Events emitted while a batch is scored.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Scoring started for an image.
    Started {
        /// Path to the image.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Batch size, if known.
        total: Option<usize>,
    },
    /// An image was scored.
    Completed {
        /// The per-image report.
        report: Box<ImageReport>,
    },
    /// An image could not be loaded or scored.
    Skipped {
        /// Path to the image, or a placeholder when unknown.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// The batch is done.
    Finished {
        /// Images scored.
        processed: usize,
        /// Images skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called for every event, in order.
    fn on_event(&self, event: ProgressEvent);
}
