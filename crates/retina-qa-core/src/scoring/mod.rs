//! Aggregation stage: global score, confidence, classification and
//! recommendations, all derived from the six dimension scores.

mod aggregate;
mod classify;
mod confidence;
mod recommend;

pub use aggregate::{consistency_bonus, critical_penalty, global_score, logistic};
pub use classify::{clinical_adequacy, ml_readiness};
pub use confidence::confidence;
pub use recommend::recommendations;
