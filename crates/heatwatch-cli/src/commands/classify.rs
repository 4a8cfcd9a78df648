//! Classify command implementation.

use anyhow::Result;
use time::OffsetDateTime;

use heatwatch_core::{Measurements, Reading, RiskClassifier};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_reading_text};
use crate::util::write_stdout;

/// Arguments for the classify command.
pub struct ClassifyArgs {
    pub temperature: f64,
    pub humidity: f64,
    pub pm25: f64,
    pub uv: f64,
    pub format: OutputFormat,
}

/// Derive heat index and risk from the given values.
///
/// Wind does not affect either value, so it is reported as zero.
pub fn classify_reading(args: &ClassifyArgs, classifier: &RiskClassifier) -> Reading {
    let measurements = Measurements::new(args.temperature, args.humidity, args.pm25, args.uv, 0.0);
    Reading::derive(OffsetDateTime::now_utc(), measurements, classifier)
}

pub fn cmd_classify(args: ClassifyArgs, classifier: &RiskClassifier, opts: &FormatOptions) -> Result<()> {
    let reading = classify_reading(&args, classifier);
    let content = match args.format {
        OutputFormat::Json => opts.as_json(&reading)?,
        OutputFormat::Text => format_reading_text(None, &reading, opts),
    };
    write_stdout(&content)
}
