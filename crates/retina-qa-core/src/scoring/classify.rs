//! Category assignment from the global and per-dimension scores.

use crate::domain::{ClinicalAdequacy, DimensionScores, MlReadiness};

/// ML readiness; the first tier whose global and per-dimension floors are
/// both met wins.
#[must_use]
pub fn ml_readiness(global: f64, scores: &DimensionScores) -> MlReadiness {
    const TIERS: [(MlReadiness, f64, f64); 3] = [
        (MlReadiness::Excellent, 85.0, 80.0),
        (MlReadiness::Good, 70.0, 60.0),
        (MlReadiness::Fair, 50.0, 40.0),
    ];
    TIERS
        .iter()
        .find(|&&(_, min_global, min_dimension)| {
            global >= min_global && scores.all_at_least(min_dimension)
        })
        .map_or(MlReadiness::Poor, |&(tier, _, _)| tier)
}

/// Clinical adequacy; only sharpness and the clinical adequacy dimension
/// gate the tiers.
#[must_use]
pub fn clinical_adequacy(global: f64, scores: &DimensionScores) -> ClinicalAdequacy {
    let critical = scores.sharpness.min(scores.clinical_adequacy);
    if global >= 80.0 && critical >= 75.0 {
        ClinicalAdequacy::Diagnostic
    } else if global >= 60.0 && critical >= 50.0 {
        ClinicalAdequacy::Screening
    } else {
        ClinicalAdequacy::Inadequate
    }
}
