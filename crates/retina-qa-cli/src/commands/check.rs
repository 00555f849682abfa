//! Check command - score images for quality.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use retina_qa_adapters::FsImageSource;
use retina_qa_core::{
    BatchAccumulator, BatchStatistics, ClinicalStandards, ExamType, ImageDimensions, ImageReport,
    ImageSource, LoadedImage, Metadata, ProgressEvent, ProgressSink, QualityScorer, ResultOutput,
};
use serde_json::Value;
use tracing::{debug, info};

use super::ExitCode;
use crate::config::{AppConfig, MAX_PRECISION};
use crate::output::{round_floats, BatchProgress, JsonOutput, OutputFormat, ProgressMode};

/// Decimal places kept in output floats unless configured otherwise.
const DEFAULT_PRECISION: u8 = 2;

/// Parse an exam type tag.
fn parse_exam_type(s: &str) -> Result<ExamType, String> {
    s.parse().map_err(|e: retina_qa_core::UnknownExamType| e.to_string())
}

/// Parse and validate an output precision.
fn parse_precision(s: &str) -> Result<u8, String> {
    let value: u8 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number of decimals"))?;
    if value <= MAX_PRECISION {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..={MAX_PRECISION}"))
    }
}

/// Shared arguments for image scoring.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Files or directories to analyze
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Exam type: fundoscopy, oct or angiography [default: fundoscopy]
    #[arg(long, value_parser = parse_exam_type)]
    pub exam_type: Option<ExamType>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Decimal places for scores in the output [default: 2]
    #[arg(long, value_parser = parse_precision)]
    pub precision: Option<u8>,

    /// Include EXIF metadata in output
    #[arg(long)]
    pub exif: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print batch statistics as JSON to stderr when done
    #[arg(long)]
    pub summary: bool,

    /// Clinical standards from the config files.
    #[arg(skip)]
    standards: ClinicalStandards,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        args.exam_type = args.exam_type.or_else(|| config.exam_type());

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(|s| match s {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        args.precision = args.precision.or(config.output.precision);

        // Boolean output options: CLI flag wins, then config
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.exif {
            args.exif = config.output.exif.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        if !args.summary {
            args.summary = config.output.summary.unwrap_or(false);
        }

        args.standards = config.clinical_standards();

        args
    }

    /// Get exam type with fallback to fundoscopy.
    fn exam_type(&self) -> ExamType {
        self.exam_type.unwrap_or_default()
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// Get output precision with fallback to the default.
    fn precision(&self) -> u8 {
        self.precision.unwrap_or(DEFAULT_PRECISION)
    }
}

/// Result of running the check command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct CheckResult {
    /// Number of images scored.
    pub processed: usize,
    /// Number of images skipped.
    pub skipped: usize,
    /// Number of images classified clinically inadequate.
    pub inadequate: usize,
    /// Batch summary.
    pub statistics: BatchStatistics,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_bar = args.progress || std::io::stderr().is_terminal();
    let progress = BatchProgress::new(
        total.map(|t| t as u64),
        ProgressMode::select(args.quiet, show_bar),
    );

    let output = JsonOutput::stdout(args.format(), args.pretty, args.precision());

    let scorer = QualityScorer::new(args.standards);
    debug!("Scoring as {} with {scorer:?}", args.exam_type());

    let result = process_images(&source, &scorer, &output, &progress, args)?;

    if args.summary {
        let mut summary = serde_json::to_value(&result.statistics)?;
        round_floats(&mut summary, args.precision());
        eprintln!("{}", serde_json::to_string(&summary)?);
    }

    Ok(result)
}

/// Score every image of `source`, writing one report per image.
fn process_images(
    source: &dyn ImageSource,
    scorer: &QualityScorer,
    output: &dyn ResultOutput,
    progress: &dyn ProgressSink,
    args: &CheckArgs,
) -> Result<CheckResult> {
    let total = source.count_hint();
    let exam_type = args.exam_type();
    let mut batch = BatchAccumulator::new();
    let mut processed = 0usize;
    let mut skipped = 0usize;

    for (index, image_result) in source.images().enumerate() {
        let image = match image_result {
            Ok(img) => img,
            Err(e) => {
                // The error message carries the path via anyhow context
                progress.on_event(ProgressEvent::Skipped {
                    path: format!("image {index}"),
                    reason: format!("{e:#}"),
                });
                batch.record_failure();
                skipped += 1;
                continue;
            }
        };

        let path = image.path.clone();

        progress.on_event(ProgressEvent::Started {
            path: path.clone(),
            index,
            total,
        });

        let timestamp = iso_timestamp();
        let metadata = build_metadata(&image, exam_type, &timestamp, args.exif);

        let scored = image
            .to_buffer()
            .and_then(|buffer| scorer.analyze(&buffer, exam_type, metadata));
        let score = match scored {
            Ok(score) => score,
            Err(e) => {
                progress.on_event(ProgressEvent::Skipped {
                    path,
                    reason: e.to_string(),
                });
                batch.record_failure();
                skipped += 1;
                continue;
            }
        };

        batch.record(&score);

        let report = ImageReport {
            path,
            timestamp,
            dimensions: ImageDimensions {
                width: image.width,
                height: image.height,
            },
            exam_type,
            score,
        };

        output.write(&report)?;

        progress.on_event(ProgressEvent::Completed {
            report: Box::new(report),
        });

        processed += 1;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished { processed, skipped });

    let inadequate = batch.inadequate_count();
    let exit_code = if inadequate > 0 {
        ExitCode::InadequateFound
    } else {
        ExitCode::Success
    };

    Ok(CheckResult {
        processed,
        skipped,
        inadequate,
        statistics: batch.finish(),
        exit_code,
    })
}

/// Metadata attached to every report: the image's identity and, on request,
/// its EXIF tags.
fn build_metadata(
    image: &LoadedImage,
    exam_type: ExamType,
    timestamp: &str,
    with_exif: bool,
) -> Metadata {
    let filename = Path::new(&image.path)
        .file_name()
        .map_or_else(|| image.path.clone(), |n| n.to_string_lossy().into_owned());

    let mut metadata = Metadata::new();
    metadata.insert("filename".into(), Value::from(filename));
    metadata.insert("exam_type".into(), Value::from(exam_type.as_str()));
    metadata.insert("width".into(), Value::from(image.width));
    metadata.insert("height".into(), Value::from(image.height));
    metadata.insert("analysis_timestamp".into(), Value::from(timestamp));

    if with_exif {
        if let Some(exif) = extract_exif(&image.path) {
            metadata.insert("exif".into(), Value::Object(exif));
        }
    }

    metadata
}

/// Extract EXIF metadata from an image file.
fn extract_exif(path: &str) -> Option<serde_json::Map<String, Value>> {
    use std::fs::File;
    use std::io::BufReader;

    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No EXIF in {path}: {e}");
            return None;
        }
    };

    let map: serde_json::Map<String, Value> = exif
        .fields()
        .map(|field| {
            let value = field.display_value().with_unit(&exif).to_string();
            (field.tag.to_string(), Value::from(value))
        })
        .collect();

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::Cli;
    use clap::Parser;
    use retina_qa_core::{ClinicalAdequacy, MlReadiness};
    use retina_qa_test_support::{
        MockImageSource, MockProgressSink, MockResultOutput, SyntheticImageBuilder,
    };

    fn parse(extra: &[&str]) -> CheckArgs {
        let argv = std::iter::once("retina-qa").chain(extra.iter().copied());
        Cli::try_parse_from(argv).expect("valid arguments").check
    }

    fn config(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("valid config")
    }

    fn run_mocks(
        source: &MockImageSource,
        args: &CheckArgs,
    ) -> (CheckResult, MockResultOutput, MockProgressSink) {
        let output = MockResultOutput::new();
        let progress = MockProgressSink::new();
        let scorer = QualityScorer::new(args.standards);
        let result = process_images(source, &scorer, &output, &progress, args).unwrap();
        (result, output, progress)
    }

    // === Argument layering ===

    #[test]
    fn test_defaults_without_config() {
        let args = CheckArgs::with_config(parse(&["eye.png"]), &AppConfig::default());
        assert_eq!(args.exam_type(), ExamType::Fundoscopy);
        assert_eq!(args.format(), OutputFormat::Jsonl);
        assert_eq!(args.precision(), DEFAULT_PRECISION);
        assert!(!args.recursive);
        assert!(!args.summary);
        assert_eq!(args.standards, ClinicalStandards::default());
    }

    #[test]
    fn test_config_fills_unset_options() {
        let cfg = config(
            r"
[general]
recursive = true

[scoring]
exam_type = 'oct'

[standards]
min_resolution = 256

[output]
format = 'json'
precision = 4
summary = true
",
        );
        let args = CheckArgs::with_config(parse(&["scans/"]), &cfg);
        assert!(args.recursive);
        assert_eq!(args.exam_type(), ExamType::Oct);
        assert_eq!(args.format(), OutputFormat::Json);
        assert_eq!(args.precision(), 4);
        assert!(args.summary);
        assert_eq!(args.standards.min_resolution, 256);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cfg = config(
            r"
[scoring]
exam_type = 'oct'

[output]
format = 'json'
precision = 4
",
        );
        let args = CheckArgs::with_config(
            parse(&[
                "eye.png",
                "--exam-type",
                "angiography",
                "--format",
                "jsonl",
                "--precision",
                "0",
            ]),
            &cfg,
        );
        assert_eq!(args.exam_type(), ExamType::Angiography);
        assert_eq!(args.format(), OutputFormat::Jsonl);
        assert_eq!(args.precision(), 0);
    }

    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_exam_type("OCT"), Ok(ExamType::Oct));
        assert!(parse_exam_type("xray").unwrap_err().contains("xray"));
        assert_eq!(parse_precision("3"), Ok(3));
        assert!(parse_precision("11").is_err());
        assert!(parse_precision("two").is_err());
    }

    // === Batch processing ===

    #[test]
    fn test_empty_source() {
        let (result, output, progress) =
            run_mocks(&MockImageSource::empty(), &parse(&["eye.png"]));
        assert_eq!(result.processed, 0);
        assert_eq!(result.exit_code, ExitCode::Success);
        assert_eq!(result.statistics.total, 0);
        assert_eq!(output.flush_count(), 1);
        assert_eq!(progress.finished_counts(), Some((0, 0)));
    }

    #[test]
    fn test_flat_images_are_inadequate() {
        let source = MockImageSource::new(vec![
            SyntheticImageBuilder::uniform_gray(64, 64, 128),
            SyntheticImageBuilder::uniform_gray(64, 64, 100),
        ]);
        let (result, output, progress) = run_mocks(&source, &parse(&["eye.png"]));

        assert_eq!(result.processed, 2);
        assert_eq!(result.inadequate, 2);
        assert_eq!(result.exit_code, ExitCode::InadequateFound);
        assert_eq!(result.statistics.successful, 2);
        assert_eq!(result.statistics.ml_readiness[&MlReadiness::Poor], 2);
        assert_eq!(progress.started_count(), 2);
        assert_eq!(progress.completed_count(), 2);

        let reports = output.reports();
        assert_eq!(reports.len(), 2);
        let first = &reports[0];
        assert_eq!(first.score.clinical_adequacy, ClinicalAdequacy::Inadequate);
        assert_eq!(first.exam_type, ExamType::Fundoscopy);
        assert_eq!(first.dimensions.width, 64);

        let metadata = &first.score.metadata;
        assert_eq!(metadata["filename"], "uniform_gray");
        assert_eq!(metadata["exam_type"], "fundoscopy");
        assert_eq!(metadata["width"], 64);
        assert_eq!(metadata["analysis_timestamp"], Value::from(first.timestamp.clone()));
        assert!(!metadata.contains_key("exif"));
    }

    #[test]
    fn test_failures_are_skipped() {
        let source = MockImageSource::new(vec![
            SyntheticImageBuilder::uniform_gray(4, 4, 128),
            SyntheticImageBuilder::checkerboard(64, 64),
        ])
        .with_failure("Failed to open image: broken.png");
        let (result, output, progress) =
            run_mocks(&source, &parse(&["eye.png", "--exam-type", "oct"]));

        assert_eq!(result.processed, 1);
        assert_eq!(result.skipped, 2);
        assert_eq!(result.statistics.failed, 2);
        assert_eq!(result.statistics.total, 3);
        assert_eq!(output.reports().len(), 1);
        assert_eq!(output.reports()[0].exam_type, ExamType::Oct);
        assert_eq!(progress.skipped_count(), 2);
        assert_eq!(progress.finished_counts(), Some((1, 2)));

        let reasons: Vec<String> = progress
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Skipped { reason, .. } => Some(reason),
                _ => None,
            })
            .collect();
        assert!(reasons[0].contains("minimum analyzable size"));
        assert!(reasons[1].contains("broken.png"));
    }

    #[test]
    fn test_exif_missing_file_is_none() {
        assert!(extract_exif("/nonexistent/eye.jpg").is_none());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
    }
}
