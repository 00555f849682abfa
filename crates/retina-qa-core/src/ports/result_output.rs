//! Result output port.

use crate::domain::ImageReport;

/// Port for writing per-image reports.
pub trait ResultOutput: Send + Sync {
    /// Writes one report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &ImageReport) -> anyhow::Result<()>;

    /// Flushes buffered output, finishing any enclosing structure.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
