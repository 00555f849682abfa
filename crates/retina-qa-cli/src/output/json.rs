//! JSON output adapter.

use anyhow::{Context, Result};
use clap::ValueEnum;
use retina_qa_core::{ImageReport, ResultOutput};
use serde_json::{Number, Value};
use std::io::{self, Write};
use std::sync::Mutex;

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// JSON output adapter.
///
/// In JSONL mode every report is written as soon as it arrives. In JSON mode
/// reports are buffered and written as one array by [`ResultOutput::flush`],
/// which must therefore be called once at the end of the batch.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    pending: Mutex<Vec<Value>>,
    format: OutputFormat,
    pretty: bool,
    precision: u8,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout(format: OutputFormat, pretty: bool, precision: u8) -> Self {
        Self::new(Box::new(io::stdout()), format, pretty, precision)
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(
        writer: Box<dyn Write + Send>,
        format: OutputFormat,
        pretty: bool,
        precision: u8,
    ) -> Self {
        Self {
            writer: Mutex::new(writer),
            pending: Mutex::new(Vec::new()),
            format,
            pretty,
            precision,
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_line(&self, json: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}").context("Failed to write output")?;
        Ok(())
    }
}

impl ResultOutput for JsonOutput {
    fn write(&self, report: &ImageReport) -> Result<()> {
        let mut value = serde_json::to_value(report)?;
        round_floats(&mut value, self.precision);

        match self.format {
            OutputFormat::Jsonl => self.write_line(&serde_json::to_string(&value)?),
            OutputFormat::Json => {
                self.pending
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?
                    .push(value);
                Ok(())
            }
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        if self.format == OutputFormat::Json {
            let reports = std::mem::take(
                &mut *self
                    .pending
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?,
            );
            let array = Value::Array(reports);
            let json = if self.pretty {
                serde_json::to_string_pretty(&array)?
            } else {
                serde_json::to_string(&array)?
            };
            self.write_line(&json)?;
        }

        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

const METADATA_KEY: &str = "metadata";

/// Rounds every non-integer number in `value` to `precision` decimals.
///
/// Integers (dimensions, counts) are left untouched, and so is anything under
/// a `metadata` key: caller-supplied metadata is passed through as given.
pub fn round_floats(value: &mut Value, precision: u8) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(rounded) = n
                .as_f64()
                .map(|x| round_to(x, precision))
                .and_then(Number::from_f64)
            {
                *n = rounded;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| round_floats(v, precision)),
        Value::Object(map) => map
            .iter_mut()
            .filter(|(key, _)| key.as_str() != METADATA_KEY)
            .for_each(|(_, v)| round_floats(v, precision)),
        _ => {}
    }
}

fn round_to(x: f64, precision: u8) -> f64 {
    let factor = 10f64.powi(i32::from(precision));
    (x * factor).round() / factor
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use retina_qa_core::{ExamType, ImageDimensions, Metadata, QualityScorer};
    use retina_qa_test_support::SyntheticImageBuilder;
    use serde_json::json;
    use std::sync::Arc;

    /// Writer that keeps everything in a shared buffer.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn report(path: &str) -> ImageReport {
        let image = SyntheticImageBuilder::checkerboard(32, 32);
        let score = QualityScorer::default()
            .analyze(&image.to_buffer().unwrap(), ExamType::Oct, Metadata::new())
            .unwrap();
        ImageReport {
            path: path.to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            dimensions: ImageDimensions {
                width: 32,
                height: 32,
            },
            exam_type: ExamType::Oct,
            score,
        }
    }

    #[test]
    fn test_round_floats() {
        let mut value = json!({
            "score": 12.345_678,
            "width": 512,
            "nested": [0.129, {"deep": 99.995}],
            "label": "oct"
        });
        round_floats(&mut value, 2);
        assert_eq!(value["score"], json!(12.35));
        assert_eq!(value["width"], json!(512));
        assert_eq!(value["nested"][0], json!(0.13));
        assert_eq!(value["label"], json!("oct"));

        let mut whole = json!(2.5);
        round_floats(&mut whole, 0);
        assert_eq!(whole.as_f64().unwrap(), 3.0);
    }

    #[test]
    fn test_round_floats_keeps_metadata_verbatim() {
        let mut value = json!({
            "global_score": 71.234_5,
            "metadata": {"exposure_time": 0.012_345, "width": 512}
        });
        round_floats(&mut value, 2);
        assert_eq!(value["global_score"], json!(71.23));
        assert_eq!(value["metadata"]["exposure_time"], json!(0.012_345));
        assert_eq!(value["metadata"]["width"], json!(512));
    }

    #[test]
    fn test_report_metadata_is_not_rounded() {
        let buffer = SharedBuffer::default();
        let output = JsonOutput::new(Box::new(buffer.clone()), OutputFormat::Jsonl, false, 0);
        let mut report = report("a.png");
        report
            .score
            .metadata
            .insert("pixel_spacing_mm".to_string(), json!(0.003_906_25));

        output.write(&report).unwrap();
        output.flush().unwrap();

        let parsed: Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(parsed["metadata"]["pixel_spacing_mm"], json!(0.003_906_25));
        let global = parsed["global_score"].as_f64().unwrap();
        assert_eq!(global, global.round());
    }

    #[test]
    fn test_jsonl_writes_one_line_per_report() {
        let buffer = SharedBuffer::default();
        let output = JsonOutput::new(Box::new(buffer.clone()), OutputFormat::Jsonl, false, 2);

        output.write(&report("a.png")).unwrap();
        output.write(&report("b.png")).unwrap();
        output.flush().unwrap();

        let text = buffer.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["path"], "a.png");
        assert_eq!(first["exam_type"], "oct");
        assert!(first["dimension_scores"]["sharpness"].is_number());
    }

    #[test]
    fn test_json_buffers_until_flush() {
        let buffer = SharedBuffer::default();
        let output = JsonOutput::new(Box::new(buffer.clone()), OutputFormat::Json, true, 1);

        output.write(&report("a.png")).unwrap();
        assert!(buffer.contents().is_empty());
        output.write(&report("b.png")).unwrap();
        output.flush().unwrap();

        let parsed: Value = serde_json::from_str(&buffer.contents()).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["path"], "b.png");

        let global = items[0]["global_score"].as_f64().unwrap();
        assert_eq!(global, (global * 10.0).round() / 10.0);
    }

    #[test]
    fn test_json_empty_batch_is_empty_array() {
        let buffer = SharedBuffer::default();
        let output = JsonOutput::new(Box::new(buffer.clone()), OutputFormat::Json, false, 2);
        output.flush().unwrap();
        assert_eq!(buffer.contents().trim(), "[]");
    }
}
