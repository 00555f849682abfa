//! Aggregate statistics over a batch of analyzed images.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{ClinicalAdequacy, MlReadiness, QualityScore};
use crate::imaging::stats;

/// Summary of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStatistics {
    /// Images attempted.
    pub total: usize,
    /// Images scored.
    pub successful: usize,
    /// Images that failed to load or were rejected.
    pub failed: usize,
    /// Mean global score over successful images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_score: Option<f64>,
    /// Population standard deviation of the global scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_score: Option<f64>,
    /// Lowest global score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    /// Highest global score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    /// Image count per ML readiness category.
    pub ml_readiness: BTreeMap<MlReadiness, usize>,
    /// Image count per clinical adequacy category.
    pub clinical_adequacy: BTreeMap<ClinicalAdequacy, usize>,
}

/// Incrementally collects results into [`BatchStatistics`].
#[derive(Debug, Clone, Default)]
pub struct BatchAccumulator {
    scores: Vec<f64>,
    failed: usize,
    ml_readiness: BTreeMap<MlReadiness, usize>,
    clinical_adequacy: BTreeMap<ClinicalAdequacy, usize>,
}

impl BatchAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scored image.
    pub fn record(&mut self, score: &QualityScore) {
        self.scores.push(score.global_score);
        *self.ml_readiness.entry(score.ml_readiness).or_default() += 1;
        *self
            .clinical_adequacy
            .entry(score.clinical_adequacy)
            .or_default() += 1;
    }

    /// Records an image that could not be scored.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of images classified as clinically inadequate so far.
    #[must_use]
    pub fn inadequate_count(&self) -> usize {
        self.clinical_adequacy
            .get(&ClinicalAdequacy::Inadequate)
            .copied()
            .unwrap_or(0)
    }

    /// Produces the summary.
    #[must_use]
    pub fn finish(&self) -> BatchStatistics {
        let successful = self.scores.len();
        let (mean_score, std_score, min_score, max_score) = if self.scores.is_empty() {
            (None, None, None, None)
        } else {
            (
                Some(stats::mean(&self.scores)),
                Some(stats::std_dev(&self.scores)),
                self.scores.iter().copied().reduce(f64::min),
                self.scores.iter().copied().reduce(f64::max),
            )
        };

        BatchStatistics {
            total: successful + self.failed,
            successful,
            failed: self.failed,
            mean_score,
            std_score,
            min_score,
            max_score,
            ml_readiness: self.ml_readiness.clone(),
            clinical_adequacy: self.clinical_adequacy.clone(),
        }
    }
}
