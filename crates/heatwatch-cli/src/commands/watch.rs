//! Watch command implementation.
//!
//! Runs the pipeline for one location on a fixed interval. Failed fetches are
//! reported and skipped; the next tick proceeds normally. On exit the rolling
//! history can be exported as CSV.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use owo_colors::OwoColorize;

use heatwatch_core::{
    FetchOutcome, Monitor, NotificationPolicy, ReadingProvider,
};

use crate::cli::{LocationArgs, OutputFormat, ProviderArgs};
use crate::config::Config;
use crate::format::{
    FormatOptions, LocatedReading, format_transition, format_watch_line, history_csv,
};
use crate::notify::platform_sink;
use crate::util::{reading_provider, require_location, write_file, write_stdout};

/// Arguments for the watch command.
pub struct WatchArgs {
    pub location: LocationArgs,
    pub provider: ProviderArgs,
    pub interval: u64,
    pub count: u32,
    pub notify: bool,
    pub export: Option<PathBuf>,
    pub format: OutputFormat,
}

pub async fn cmd_watch(args: WatchArgs, config: &Config, opts: &FormatOptions) -> Result<()> {
    let WatchArgs {
        location,
        provider,
        interval,
        count,
        notify,
        export,
        format,
    } = args;

    let location = require_location(location, config).await?;
    let mut monitor = Monitor::with_config(reading_provider(provider, config)?, &config.monitor)?;

    if notify || config.monitor.notifications.enabled {
        let (sink, permission) = platform_sink();
        monitor = monitor.with_sink(sink);
        monitor
            .set_notification_policy(NotificationPolicy {
                enabled: true,
                permission,
            })
            .await;
    }
    monitor.select_location(location.clone()).await;

    let header = if opts.no_color {
        format!("Watching: {} ({})", location, location.coordinates)
    } else {
        format!(
            "Watching: {} ({})",
            location.green(),
            location.coordinates.cyan()
        )
    };
    eprintln!("{}", header);
    if count > 0 {
        eprintln!("Interval: {}s | Count: {} | Press Ctrl+C to stop", interval, count);
    } else {
        eprintln!("Interval: {}s | Press Ctrl+C to stop", interval);
    }
    eprintln!("{}", "-".repeat(50));

    let readings_taken = poll(&monitor, interval, count, format, opts).await?;
    eprintln!("Completed {} readings.", readings_taken);

    if let Some(path) = export {
        let csv = history_csv(&monitor.readings().await)?;
        write_file(&path, &csv)?;
        eprintln!("History written to {}", path.display());
    }
    Ok(())
}

/// Poll until `count` readings were recorded (0 = forever) or Ctrl-C.
async fn poll<P: ReadingProvider>(
    monitor: &Monitor<P>,
    interval: u64,
    count: u32,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<u32> {
    let mut readings_taken: u32 = 0;
    let location = monitor.location().await;

    loop {
        let previous = monitor.current().await;
        match monitor.refresh().await {
            Ok(FetchOutcome::Recorded {
                reading,
                transition,
            }) => {
                readings_taken += 1;
                let content = match format {
                    OutputFormat::Json => match &location {
                        Some(location) => opts.as_json(&LocatedReading {
                            location,
                            reading: &reading,
                        })?,
                        None => opts.as_json(&reading)?,
                    },
                    OutputFormat::Text => {
                        let mut line = format_watch_line(&reading, previous.as_ref(), opts);
                        if let Some(transition) = &transition {
                            line.push_str(&format_transition(transition, opts));
                        }
                        line
                    }
                };
                write_stdout(&content)?;
            }
            Ok(FetchOutcome::Superseded { .. }) => {}
            Err(e) => eprintln!("Fetch failed: {}. Retrying next interval.", e),
        }

        if count > 0 && readings_taken >= count {
            return Ok(readings_taken);
        }

        // Wait for next interval with graceful shutdown support
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nShutting down...");
                return Ok(readings_taken);
            }
            _ = tokio::time::sleep(Duration::from_secs(interval)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatwatch_core::mock::{MockProvider, payload_with};
    use heatwatch_types::{Coordinates, Location};

    #[tokio::test(start_paused = true)]
    async fn test_poll_stops_after_count() {
        let provider = MockProvider::with_payload(payload_with(25.0, 50.0, 10.0, 2.0, 5.0));
        provider.push_failure(None, "connection reset").await;
        let monitor = Monitor::new(provider);
        monitor
            .select_location(Location::new(
                "Delhi",
                "IN",
                Coordinates::new(28.6139, 77.209).unwrap(),
            ))
            .await;

        let taken = poll(&monitor, 60, 3, OutputFormat::Json, &FormatOptions::new(true))
            .await
            .unwrap();

        assert_eq!(taken, 3);
        assert_eq!(monitor.provider().fetch_count(), 4);
        assert_eq!(monitor.readings().await.len(), 3);
    }
}
