//! Search command implementation.

use anyhow::{Context, Result};

use heatwatch_core::GeocodingProvider;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{FormatOptions, format_locations_text};
use crate::util::{geocoder, write_stdout};

pub async fn cmd_search(
    query: &str,
    format: OutputFormat,
    config: &Config,
    opts: &FormatOptions,
) -> Result<()> {
    let geocoder = geocoder(config)?;
    let locations = geocoder
        .search(query)
        .await
        .with_context(|| format!("Search for '{query}' failed"))?;

    let content = match format {
        OutputFormat::Json => opts.as_json(&locations)?,
        OutputFormat::Text => format_locations_text(&locations, opts),
    };
    write_stdout(&content)
}
