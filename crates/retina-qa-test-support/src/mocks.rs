//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use retina_qa_core::ports::{ImageSource, ProgressEvent, ProgressSink, ResultOutput};
use retina_qa_core::{ImageReport, LoadedImage};

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images, then one error per registered failure, and
/// tracks iteration for assertions.
pub struct MockImageSource {
    images: Vec<LoadedImage>,
    failures: Vec<String>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<LoadedImage>) -> Self {
        Self {
            images,
            failures: Vec::new(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Adds an item that fails to load with the given message.
    #[must_use]
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failures.push(message.into());
        self
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<LoadedImage>> + Send + '_> {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        let loaded = self.images.iter().cloned().map(Ok);
        let failed = self
            .failures
            .iter()
            .map(|message| Err(anyhow::anyhow!("{message}")));
        Box::new(loaded.chain(failed))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len() + self.failures.len())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockResultOutput {
    reports: Arc<Mutex<Vec<ImageReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<ImageReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, report: &ImageReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn count(&self, pred: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::SyntheticImageBuilder;
    use retina_qa_core::{ExamType, ImageDimensions, Metadata, QualityScorer};

    #[test]
    fn test_mock_image_source_empty() {
        let source = MockImageSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.images().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_image_source_with_failure() {
        let source = MockImageSource::new(vec![SyntheticImageBuilder::uniform_gray(16, 16, 9)])
            .with_failure("corrupt.png: bad header");
        assert_eq!(source.count_hint(), Some(2));
        let items: Vec<_> = source.images().collect();
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("bad header"));
    }

    #[test]
    fn test_mock_result_output() {
        let output = MockResultOutput::new();
        let image = SyntheticImageBuilder::uniform_gray(16, 16, 128);
        let score = QualityScorer::default()
            .analyze(&image.to_buffer().unwrap(), ExamType::Fundoscopy, Metadata::new())
            .unwrap();
        let report = ImageReport {
            path: "eye.png".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            dimensions: ImageDimensions {
                width: 16,
                height: 16,
            },
            exam_type: ExamType::Fundoscopy,
            score,
        };

        output.write(&report).unwrap();
        output.flush().unwrap();

        assert_eq!(output.reports().len(), 1);
        assert_eq!(output.reports()[0].path, "eye.png");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();
        sink.on_event(ProgressEvent::Started {
            path: "eye.png".into(),
            index: 0,
            total: Some(1),
        });
        sink.on_event(ProgressEvent::Skipped {
            path: "bad.png".into(),
            reason: "unreadable".into(),
        });
        sink.on_event(ProgressEvent::Finished {
            processed: 1,
            skipped: 1,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.skipped_count(), 1);
        assert_eq!(sink.completed_count(), 0);
        assert_eq!(sink.finished_counts(), Some((1, 1)));
    }
}
