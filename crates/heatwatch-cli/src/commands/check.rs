//! Check command implementation.

use anyhow::{Context, Result, bail};

use heatwatch_core::{FetchOutcome, Monitor};

use crate::cli::{LocationArgs, OutputFormat, ProviderArgs};
use crate::config::Config;
use crate::format::{FormatOptions, LocatedReading, format_reading_text};
use crate::util::{reading_provider, require_location, write_stdout};

pub async fn cmd_check(
    location: LocationArgs,
    provider: ProviderArgs,
    format: OutputFormat,
    config: &Config,
    opts: &FormatOptions,
) -> Result<()> {
    let location = require_location(location, config).await?;
    let monitor = Monitor::with_config(reading_provider(provider, config)?, &config.monitor)?;
    monitor.select_location(location.clone()).await;

    let reading = match monitor
        .refresh()
        .await
        .with_context(|| format!("Failed to fetch conditions for {location}"))?
    {
        FetchOutcome::Recorded { reading, .. } => reading,
        FetchOutcome::Superseded { .. } => bail!("Fetch was superseded"),
    };

    let content = match format {
        OutputFormat::Json => opts.as_json(&LocatedReading {
            location: &location,
            reading: &reading,
        })?,
        OutputFormat::Text => format_reading_text(Some(&location), &reading, opts),
    };
    write_stdout(&content)
}
