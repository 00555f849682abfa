//! Batch progress display on stderr.

use indicatif::{ProgressBar, ProgressStyle};
use retina_qa_core::{ClinicalAdequacy, ImageReport, ProgressEvent, ProgressSink};
use std::sync::atomic::{AtomicUsize, Ordering};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} scored ({eta}) {msg}";

/// How scoring progress is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Nothing is printed.
    Silent,
    /// One stderr line per inadequate or skipped image.
    Notices,
    /// An indicatif bar with a running inadequate count.
    Bar,
}

impl ProgressMode {
    /// Picks the mode from the `--quiet` and `--progress` switches.
    #[must_use]
    pub const fn select(quiet: bool, show_bar: bool) -> Self {
        match (quiet, show_bar) {
            (true, _) => Self::Silent,
            (false, true) => Self::Bar,
            (false, false) => Self::Notices,
        }
    }
}

/// Progress sink for a scoring batch.
///
/// Counts inadequate images as reports arrive so the final line can state
/// how much of the batch needs recapture.
pub struct BatchProgress {
    mode: ProgressMode,
    bar: Option<ProgressBar>,
    inadequate: AtomicUsize,
}

impl BatchProgress {
    /// Creates the display for a batch of `total` images, if known.
    #[must_use]
    pub fn new(total: Option<u64>, mode: ProgressMode) -> Self {
        let bar = (mode == ProgressMode::Bar).then(|| {
            let bar = total.map_or_else(ProgressBar::new_spinner, ProgressBar::new);
            if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        });

        Self {
            mode,
            bar,
            inadequate: AtomicUsize::new(0),
        }
    }

    /// Inadequate images seen so far.
    #[must_use]
    pub fn inadequate_count(&self) -> usize {
        self.inadequate.load(Ordering::Relaxed)
    }

    fn record(&self, report: &ImageReport) {
        let inadequate = report.score.clinical_adequacy == ClinicalAdequacy::Inadequate;
        let count = if inadequate {
            self.inadequate.fetch_add(1, Ordering::Relaxed) + 1
        } else {
            self.inadequate_count()
        };

        match (&self.bar, self.mode) {
            (Some(bar), _) => {
                bar.inc(1);
                if inadequate {
                    bar.set_message(format!("{count} inadequate"));
                }
            }
            (None, ProgressMode::Notices) if inadequate => eprintln!(
                "{}: inadequate (global score {:.1})",
                report.path, report.score.global_score
            ),
            _ => {}
        }
    }
}

impl ProgressSink for BatchProgress {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { path, index, total } => {
                if let Some(bar) = &self.bar {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(path);
                }
            }
            ProgressEvent::Completed { report } => self.record(&report),
            ProgressEvent::Skipped { path, reason } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                if self.mode != ProgressMode::Silent {
                    eprintln!("warning: Skipping {path}: {reason}");
                }
            }
            ProgressEvent::Finished { processed, skipped } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "{processed} images scored, {} inadequate, {skipped} skipped",
                        self.inadequate_count()
                    ));
                }
            }
        }
    }
}
