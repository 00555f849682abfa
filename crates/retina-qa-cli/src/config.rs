//! Configuration file support for retina-qa.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/retina-qa/config.toml` (lowest priority)
//! - Project-local: `.retina-qa.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use retina_qa_core::{ClinicalStandards, ExamType};
use serde::Deserialize;
use tracing::{debug, info};

/// Largest accepted rounding precision for output floats.
pub const MAX_PRECISION: u8 = 10;

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Scoring options.
    pub scoring: ScoringConfig,
    /// Clinical standard overrides.
    pub standards: StandardsConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Scoring configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Exam type tag: "fundoscopy", "oct" or "angiography".
    pub exam_type: Option<String>,
}

/// Overrides for [`ClinicalStandards`]. Unset fields keep the defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StandardsConfig {
    /// Minimum acceptable short side in pixels.
    pub min_resolution: Option<u32>,
    /// Optimal short side in pixels.
    pub optimal_resolution: Option<u32>,
    /// Minimum contrast (0.0-1.0).
    pub contrast_threshold: Option<f64>,
    /// Maximum noise level (0.0-1.0).
    pub noise_threshold: Option<f64>,
    /// Minimum sharpness (0.0-1.0).
    pub sharpness_threshold: Option<f64>,
    /// Acceptable exposure range as `[low, high]`.
    pub exposure_range: Option<(f64, f64)>,
}

impl StandardsConfig {
    /// Applies the overrides on top of `base`.
    #[must_use]
    pub fn apply(&self, base: ClinicalStandards) -> ClinicalStandards {
        ClinicalStandards {
            min_resolution: self.min_resolution.unwrap_or(base.min_resolution),
            optimal_resolution: self.optimal_resolution.unwrap_or(base.optimal_resolution),
            contrast_threshold: self.contrast_threshold.unwrap_or(base.contrast_threshold),
            noise_threshold: self.noise_threshold.unwrap_or(base.noise_threshold),
            sharpness_threshold: self.sharpness_threshold.unwrap_or(base.sharpness_threshold),
            exposure_range: self.exposure_range.unwrap_or(base.exposure_range),
        }
    }
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Decimal places for output floats.
    pub precision: Option<u8>,
    /// Include EXIF metadata.
    pub exif: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Print batch statistics to stderr.
    pub summary: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/retina-qa/config.toml`
    /// 2. Project-local: `.retina-qa.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are reported as
    /// warnings and dropped.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for problem in config.sanitize() {
            eprintln!("warning: {problem}");
        }

        config
    }

    /// Returns the configured clinical standards.
    #[must_use]
    pub fn clinical_standards(&self) -> ClinicalStandards {
        self.standards.apply(ClinicalStandards::default())
    }

    /// Returns the configured exam type, if set and valid.
    #[must_use]
    pub fn exam_type(&self) -> Option<ExamType> {
        self.scoring.exam_type.as_deref().and_then(|s| s.parse().ok())
    }

    /// Clears every out-of-range value and describes what was dropped.
    fn sanitize(&mut self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Some(tag) = &self.scoring.exam_type {
            if let Err(e) = tag.parse::<ExamType>() {
                problems.push(format!("scoring.exam_type: {e}"));
                self.scoring.exam_type = None;
            }
        }

        if self.standards.min_resolution == Some(0) {
            problems.push("standards.min_resolution must be at least 1".to_string());
            self.standards.min_resolution = None;
        }
        if self.standards.optimal_resolution == Some(0) {
            problems.push("standards.optimal_resolution must be at least 1".to_string());
            self.standards.optimal_resolution = None;
        }

        let unit_fields = [
            ("standards.contrast_threshold", &mut self.standards.contrast_threshold),
            ("standards.noise_threshold", &mut self.standards.noise_threshold),
            ("standards.sharpness_threshold", &mut self.standards.sharpness_threshold),
        ];
        for (name, field) in unit_fields {
            if let Some(t) = *field {
                if !(0.0..=1.0).contains(&t) {
                    problems.push(format!("{name} must be 0.0-1.0, got {t}"));
                    *field = None;
                }
            }
        }

        if let Some((low, high)) = self.standards.exposure_range {
            if !(0.0 <= low && low < high && high <= 1.0) {
                problems.push(format!(
                    "standards.exposure_range must satisfy 0 <= low < high <= 1, got [{low}, {high}]"
                ));
                self.standards.exposure_range = None;
            }
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                problems.push(format!("output.format must be 'json' or 'jsonl', got '{f}'"));
                self.output.format = None;
            }
        }
        if let Some(p) = self.output.precision {
            if p > MAX_PRECISION {
                problems.push(format!("output.precision must be 0-{MAX_PRECISION}, got {p}"));
                self.output.precision = None;
            }
        }

        problems
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.scoring.exam_type = other
            .scoring
            .exam_type
            .or_else(|| self.scoring.exam_type.take());

        let standards = &mut self.standards;
        standards.min_resolution = other.standards.min_resolution.or(standards.min_resolution);
        standards.optimal_resolution = other
            .standards
            .optimal_resolution
            .or(standards.optimal_resolution);
        standards.contrast_threshold = other
            .standards
            .contrast_threshold
            .or(standards.contrast_threshold);
        standards.noise_threshold = other.standards.noise_threshold.or(standards.noise_threshold);
        standards.sharpness_threshold = other
            .standards
            .sharpness_threshold
            .or(standards.sharpness_threshold);
        standards.exposure_range = other.standards.exposure_range.or(standards.exposure_range);

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.precision = other.output.precision.or(self.output.precision);
        self.output.exif = other.output.exif.or(self.output.exif);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.summary = other.output.summary.or(self.output.summary);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("retina-qa").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.retina-qa.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".retina-qa.toml"))
        .find(|path| path.exists())
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
