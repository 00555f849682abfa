//! Remediation advice keyed on low-scoring dimensions.

use crate::domain::{Dimension, DimensionScores, ExamType};

/// Per-dimension rules, evaluated in this order.
const DIMENSION_RULES: [(Dimension, f64, &str); 5] = [
    (
        Dimension::Sharpness,
        70.0,
        "Check the instrument focus and stabilize the capture to improve sharpness",
    ),
    (
        Dimension::Exposure,
        60.0,
        "Adjust exposure - the image is too dark or too bright for reliable analysis",
    ),
    (
        Dimension::Contrast,
        65.0,
        "Improve contrast by adjusting illumination or instrument settings",
    ),
    (
        Dimension::NoiseLevel,
        70.0,
        "Reduce noise with a lower ISO or better illumination",
    ),
    (
        Dimension::Artifacts,
        75.0,
        "Check for motion or compression artifacts that may affect diagnosis",
    ),
];

const CLINICAL_THRESHOLD: f64 = 70.0;
const FUNDOSCOPY_NOTE: &str =
    "For fundoscopy: ensure the optic disc and vascular structures are clearly visible";
const OCT_NOTE: &str = "For OCT: sharpness is critical for visualizing the retinal layers";
const MEETS_STANDARDS: &str = "Image meets quality standards";

/// Ordered recommendations for a scored image; never empty.
#[must_use]
pub fn recommendations(scores: &DimensionScores, exam: ExamType) -> Vec<String> {
    let mut advice: Vec<String> = DIMENSION_RULES
        .iter()
        .filter(|&&(dimension, threshold, _)| scores.get(dimension) < threshold)
        .map(|&(_, _, message)| message.to_string())
        .collect();

    if scores.clinical_adequacy < CLINICAL_THRESHOLD {
        advice.push(format!(
            "Image may not meet clinical standards for {exam} - consider recapturing"
        ));
    }

    match exam {
        ExamType::Fundoscopy if scores.clinical_adequacy < 80.0 => {
            advice.push(FUNDOSCOPY_NOTE.to_string());
        }
        ExamType::Oct if scores.sharpness < 80.0 => advice.push(OCT_NOTE.to_string()),
        _ => {}
    }

    if advice.is_empty() {
        advice.push(MEETS_STANDARDS.to_string());
    }
    advice
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_image() {
        let advice = recommendations(&DimensionScores::uniform(90.0), ExamType::Fundoscopy);
        assert_eq!(advice, vec![MEETS_STANDARDS.to_string()]);
    }

    #[test]
    fn test_everything_low_fundoscopy() {
        let advice = recommendations(&DimensionScores::uniform(10.0), ExamType::Fundoscopy);
        assert_eq!(advice.len(), 7);
        assert!(advice[0].contains("focus"));
        assert!(advice[1].contains("exposure"));
        assert!(advice[2].contains("contrast"));
        assert!(advice[3].contains("noise"));
        assert!(advice[4].contains("artifacts"));
        assert!(advice[5].contains("clinical standards for fundoscopy"));
        assert_eq!(advice[6], FUNDOSCOPY_NOTE);
    }

    #[test]
    fn test_oct_note_follows_sharpness() {
        let mut scores = DimensionScores::uniform(90.0);
        scores.sharpness = 75.0;
        let advice = recommendations(&scores, ExamType::Oct);
        assert_eq!(advice, vec![OCT_NOTE.to_string()]);
    }

    #[test]
    fn test_angiography_has_no_exam_note() {
        let mut scores = DimensionScores::uniform(90.0);
        scores.clinical_adequacy = 65.0;
        let advice = recommendations(&scores, ExamType::Angiography);
        assert_eq!(advice.len(), 1);
        assert!(advice[0].ends_with("for angiography - consider recapturing"));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let scores = DimensionScores {
            sharpness: 80.0,
            exposure: 60.0,
            contrast: 65.0,
            noise_level: 70.0,
            artifacts: 75.0,
            clinical_adequacy: 80.0,
        };
        let advice = recommendations(&scores, ExamType::Fundoscopy);
        assert_eq!(advice, vec![MEETS_STANDARDS.to_string()]);
    }
}
