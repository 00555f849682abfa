//! Pipeline integration tests using synthetic images.
//!
//! Tests the full scoring pipeline with programmatically generated test images.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    deprecated
)]

use assert_cmd::Command;
use retina_qa_test_support::SyntheticImageBuilder;
use serde_json::Value;

/// Create a temporary directory with synthetic test images.
fn create_test_images(images: Vec<(&str, image::DynamicImage)>) -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();

    for (name, img) in images {
        let path = temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        img.save(&path).unwrap();
    }

    temp_dir
}

fn retina_qa() -> Command {
    let mut cmd = Command::cargo_bin("retina-qa").unwrap();
    cmd.env("XDG_CONFIG_HOME", std::env::temp_dir().join("retina-qa-no-config"))
        .arg("-q");
    cmd
}

fn reports(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("valid JSONL"))
        .collect()
}

fn score(report: &Value, dimension: &str) -> f64 {
    report["dimension_scores"][dimension].as_f64().unwrap()
}

// === Classification Tests ===

#[test]
fn test_flat_image_is_inadequate() {
    let temp_dir = create_test_images(vec![(
        "flat.png",
        SyntheticImageBuilder::uniform_gray(128, 128, 128).image,
    )]);

    let output = retina_qa().arg(temp_dir.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let results = reports(&output.stdout);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["clinical_adequacy"], "inadequate");
    assert_eq!(results[0]["ml_readiness"], "poor");
    assert_eq!(score(&results[0], "artifacts"), 100.0);
}

#[test]
fn test_saturated_image_penalized() {
    let temp_dir = create_test_images(vec![
        ("a_mid.png", SyntheticImageBuilder::uniform_gray(128, 128, 128).image),
        ("b_white.png", SyntheticImageBuilder::saturated(128, 128).image),
    ]);

    let output = retina_qa().arg(temp_dir.path()).output().unwrap();
    let results = reports(&output.stdout);
    assert_eq!(results.len(), 2);

    let (mid, white) = (&results[0], &results[1]);
    assert!(score(mid, "exposure") > score(white, "exposure"));
    assert_eq!(score(white, "artifacts"), 50.0);
}

// === Dimension Ordering Tests ===

#[test]
fn test_blur_lowers_sharpness() {
    let sharp = SyntheticImageBuilder::checkerboard(128, 128);
    let blurred = SyntheticImageBuilder::blurred(&sharp, 4.0);
    let temp_dir = create_test_images(vec![
        ("a_sharp.png", sharp.image),
        ("b_blurred.png", blurred.image),
    ]);

    let output = retina_qa().arg(temp_dir.path()).output().unwrap();
    let results = reports(&output.stdout);
    assert_eq!(results.len(), 2);
    assert!(score(&results[0], "sharpness") > score(&results[1], "sharpness"));
}

#[test]
fn test_noise_lowers_noise_score() {
    let flat = SyntheticImageBuilder::uniform_gray(128, 128, 128);
    let noisy = SyntheticImageBuilder::with_gaussian_noise(&flat, 0.08, 7);
    let temp_dir = create_test_images(vec![
        ("a_clean.png", flat.image),
        ("b_noisy.png", noisy.image),
    ]);

    let output = retina_qa().arg(temp_dir.path()).output().unwrap();
    let results = reports(&output.stdout);
    assert!(score(&results[0], "noise_level") > score(&results[1], "noise_level"));
}

#[test]
fn test_fundus_beats_flat_gray() {
    let temp_dir = create_test_images(vec![
        ("a_fundus.png", SyntheticImageBuilder::fundus(256).image),
        ("b_flat.png", SyntheticImageBuilder::uniform_gray(256, 256, 128).image),
    ]);

    let output = retina_qa().arg(temp_dir.path()).output().unwrap();
    assert!(matches!(output.status.code(), Some(0 | 1)));
    let results = reports(&output.stdout);
    let global = |r: &Value| r["global_score"].as_f64().unwrap();
    assert!(global(&results[0]) > global(&results[1]));
}

// === Exam Type Tests ===

#[test]
fn test_oct_scan_scored_with_oct_profile() {
    let temp_dir = create_test_images(vec![(
        "bscan.png",
        SyntheticImageBuilder::oct(256, 192, 6).image,
    )]);

    let output = retina_qa()
        .arg("--exam-type")
        .arg("oct")
        .arg(temp_dir.path().join("bscan.png"))
        .output()
        .unwrap();

    let results = reports(&output.stdout);
    assert_eq!(results[0]["exam_type"], "oct");
    assert_eq!(results[0]["metadata"]["exam_type"], "oct");
    let recommendations = results[0]["recommendations"].as_array().unwrap();
    assert!(!recommendations.is_empty());
}

// === Batch Behaviour Tests ===

#[test]
fn test_recursive_flag() {
    let temp_dir = create_test_images(vec![
        ("top.png", SyntheticImageBuilder::checkerboard(64, 64).image),
        ("visit-2/nested.png", SyntheticImageBuilder::checkerboard(64, 64).image),
    ]);

    let flat = retina_qa().arg(temp_dir.path()).output().unwrap();
    assert_eq!(reports(&flat.stdout).len(), 1);

    let deep = retina_qa().arg("-r").arg(temp_dir.path()).output().unwrap();
    assert_eq!(reports(&deep.stdout).len(), 2);
}

#[test]
fn test_too_small_image_skipped() {
    let temp_dir = create_test_images(vec![(
        "thumb.png",
        SyntheticImageBuilder::uniform_gray(4, 4, 128).image,
    )]);

    let output = retina_qa().arg(temp_dir.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(reports(&output.stdout).is_empty());
}

#[test]
fn test_corrupt_file_does_not_stop_batch() {
    let temp_dir = create_test_images(vec![(
        "b_good.png",
        SyntheticImageBuilder::uniform_gray(64, 64, 128).image,
    )]);
    std::fs::write(temp_dir.path().join("a_broken.png"), b"garbage").unwrap();

    let mut cmd = Command::cargo_bin("retina-qa").unwrap();
    let output = cmd
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("retina-qa-no-config"))
        .arg(temp_dir.path())
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Skipping"), "{stderr}");
    assert!(stderr.contains("a_broken.png"), "{stderr}");
    assert_eq!(reports(&output.stdout).len(), 1);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_output_is_deterministic() {
    let temp_dir = create_test_images(vec![(
        "fundus.png",
        SyntheticImageBuilder::fundus(128).image,
    )]);

    let run = || {
        let output = retina_qa().arg(temp_dir.path()).output().unwrap();
        let mut report = reports(&output.stdout).remove(0);
        // Timestamps differ between runs
        report.as_object_mut().unwrap().remove("timestamp");
        report["metadata"]
            .as_object_mut()
            .unwrap()
            .remove("analysis_timestamp");
        report
    };

    assert_eq!(run(), run());
}
