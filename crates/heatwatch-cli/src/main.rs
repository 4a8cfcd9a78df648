mod cli;
mod commands;
mod config;
mod format;
mod notify;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use heatwatch_core::RiskClassifier;

use cli::{Cli, Commands};
use commands::{ClassifyArgs, WatchArgs, cmd_check, cmd_classify, cmd_search, cmd_watch};
use config::Config;
use format::FormatOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let opts = FormatOptions::new(cli.no_color);

    match cli.command {
        Commands::Classify {
            temperature,
            humidity,
            pm25,
            uv,
            format,
        } => {
            let classifier = RiskClassifier::new(config.monitor.thresholds.clone());
            cmd_classify(
                ClassifyArgs {
                    temperature,
                    humidity,
                    pm25,
                    uv,
                    format,
                },
                &classifier,
                &opts,
            )?;
        }
        Commands::Search { query, format } => {
            cmd_search(&query, format, &config, &opts).await?;
        }
        Commands::Check {
            location,
            provider,
            format,
        } => {
            cmd_check(location, provider, format, &config, &opts).await?;
        }
        Commands::Watch {
            location,
            provider,
            interval,
            count,
            notify,
            export,
            format,
        } => {
            cmd_watch(
                WatchArgs {
                    location,
                    provider,
                    interval,
                    count,
                    notify,
                    export,
                    format,
                },
                &config,
                &opts,
            )
            .await?;
        }
    }

    Ok(())
}
