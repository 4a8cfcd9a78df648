//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where to take readings: a place name or an explicit position
#[derive(Debug, Clone, Args)]
pub struct LocationArgs {
    /// Place name to geocode (falls back to `default_city` in config)
    #[arg(short, long, conflicts_with_all = ["lat", "lon"])]
    pub city: Option<String>,

    /// Latitude in decimal degrees
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

/// Provider connection arguments
#[derive(Debug, Clone, Args)]
pub struct ProviderArgs {
    /// API token for the station feed (overrides config)
    #[arg(long, env = "HEATWATCH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Parser)]
#[command(name = "heatwatch")]
#[command(author, version, about = "Heat-stress and air-quality risk monitor", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Use a config file other than the default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute heat index and risk from values, without network access
    Classify {
        /// Air temperature in °C
        #[arg(short, long, allow_hyphen_values = true)]
        temperature: f64,

        /// Relative humidity in percent
        #[arg(short = 'H', long)]
        humidity: f64,

        /// PM2.5 in µg/m³
        #[arg(long, default_value = "0")]
        pm25: f64,

        /// UV index
        #[arg(long, default_value = "0")]
        uv: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Search for a place by name
    Search {
        /// Place name
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Fetch one reading for a location
    Check {
        #[command(flatten)]
        location: LocationArgs,

        #[command(flatten)]
        provider: ProviderArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Poll a location repeatedly and report risk changes
    Watch {
        #[command(flatten)]
        location: LocationArgs,

        #[command(flatten)]
        provider: ProviderArgs,

        /// Polling interval in seconds
        #[arg(short, long, default_value = "600", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,

        /// Number of readings to take (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,

        /// Notify on risk transitions
        #[arg(long)]
        notify: bool,

        /// Write the reading history as CSV to this file on exit
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_classify() {
        let cli = Cli::parse_from(["heatwatch", "classify", "-t", "38", "-H", "60", "--pm25", "80"]);
        match cli.command {
            Commands::Classify {
                temperature,
                humidity,
                pm25,
                uv,
                ..
            } => {
                assert_eq!((temperature, humidity, pm25, uv), (38.0, 60.0, 80.0, 0.0));
            }
            _ => panic!("expected classify"),
        }
    }

    #[test]
    fn test_parse_check_coordinates() {
        let cli = Cli::parse_from(["heatwatch", "check", "--lat", "33.45", "--lon", "-112.07"]);
        match cli.command {
            Commands::Check { location, .. } => {
                assert_eq!(location.lat, Some(33.45));
                assert_eq!(location.lon, Some(-112.07));
                assert!(location.city.is_none());
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_city_conflicts_with_coordinates() {
        let result = Cli::try_parse_from([
            "heatwatch", "check", "--city", "Delhi", "--lat", "1", "--lon", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_lat_requires_lon() {
        assert!(Cli::try_parse_from(["heatwatch", "check", "--lat", "1"]).is_err());
    }

    #[test]
    fn test_watch_rejects_zero_interval() {
        assert!(Cli::try_parse_from(["heatwatch", "watch", "--interval", "0"]).is_err());
    }
}
