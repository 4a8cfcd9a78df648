//! Shared helpers for command implementations.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use heatwatch_core::http::{HttpGeocoder, HttpReadingProvider};
use heatwatch_core::resolve_location;
use heatwatch_types::{Coordinates, Location};

use crate::cli::{LocationArgs, ProviderArgs};
use crate::config::{Config, resolve_city, resolve_token};

/// Print to stdout and flush.
pub fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Write content to a file.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write to {}", path.display()))
}

/// Build the geocoder from config.
pub fn geocoder(config: &Config) -> Result<HttpGeocoder> {
    HttpGeocoder::new(&config.provider.geocoding_url).context("Invalid geocoding URL")
}

/// Build the reading provider from arguments and config.
pub fn reading_provider(args: ProviderArgs, config: &Config) -> Result<HttpReadingProvider> {
    let Some(token) = resolve_token(args.token, config) else {
        bail!(
            "No API token. Pass --token, set HEATWATCH_TOKEN, or add `token` under [provider] in {}",
            Config::path().display()
        );
    };
    HttpReadingProvider::new(&config.provider.base_url, token).context("Invalid provider settings")
}

/// Turn location arguments into a location, geocoding a place name if needed.
pub async fn require_location(args: LocationArgs, config: &Config) -> Result<Location> {
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let coordinates = Coordinates::new(lat, lon)?;
        return Ok(Location::from_coordinates(coordinates));
    }

    let Some(city) = resolve_city(args.city, config) else {
        bail!("No location. Pass --city or --lat/--lon, or set `default_city` in config");
    };
    let geocoder = geocoder(config)?;
    let location = resolve_location(&geocoder, &city)
        .await
        .with_context(|| format!("Could not resolve '{city}'"))?;
    tracing::debug!("Resolved '{}' to {} ({})", city, location, location.coordinates);
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_require_location_from_coordinates() {
        let args = LocationArgs {
            city: None,
            lat: Some(33.4484),
            lon: Some(-112.074),
        };
        let location = require_location(args, &Config::default()).await.unwrap();
        assert_eq!(location.coordinates.latitude(), 33.4484);
        assert_eq!(location.name, "33.4484, -112.0740");
    }

    #[tokio::test]
    async fn test_require_location_rejects_bad_coordinates() {
        let args = LocationArgs {
            city: None,
            lat: Some(95.0),
            lon: Some(0.0),
        };
        assert!(require_location(args, &Config::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_require_location_without_any_source() {
        let args = LocationArgs {
            city: None,
            lat: None,
            lon: None,
        };
        let err = require_location(args, &Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("No location"));
    }

    #[test]
    fn test_reading_provider_requires_token() {
        let err = reading_provider(ProviderArgs { token: None }, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("No API token"));

        let provider = reading_provider(
            ProviderArgs {
                token: Some("demo".into()),
            },
            &Config::default(),
        )
        .unwrap();
        assert_eq!(provider.base_url(), "https://api.waqi.info");
    }
}
