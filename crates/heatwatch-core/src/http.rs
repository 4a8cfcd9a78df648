//! HTTP implementations of the provider traits.
//!
//! - [`HttpReadingProvider`] queries a station feed by position
//! - [`HttpGeocoder`] queries a place-name search service
//!
//! Both retry transient failures with [`with_retry`]; the monitor never
//! retries on its own.
//!
//! # Example
//!
//! ```no_run
//! use heatwatch_core::http::{HttpGeocoder, HttpReadingProvider};
//! use heatwatch_core::{Monitor, resolve_location};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let geocoder = HttpGeocoder::new(HttpGeocoder::DEFAULT_URL)?;
//! let provider = HttpReadingProvider::new(HttpReadingProvider::DEFAULT_URL, "my-token")?;
//!
//! let monitor = Monitor::new(provider);
//! monitor.select_location(resolve_location(&geocoder, "Delhi").await?).await;
//! let outcome = monitor.refresh().await?;
//! println!("{:?}", outcome.reading());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use heatwatch_types::{Coordinates, Location};

use crate::error::{Error, Result};
use crate::payload::ProviderPayload;
use crate::retry::{RetryConfig, with_retry};
use crate::traits::{GeocodingProvider, ReadingProvider};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_LIMIT: usize = 5;

fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::invalid_config(format!(
            "URL must start with http:// or https://, got: {base_url}"
        )));
    }
    Ok(base_url)
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("heatwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::invalid_config(format!("HTTP client: {e}")))
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::network(format!("request timed out after {REQUEST_TIMEOUT:?}"))
    } else {
        Error::network(e.to_string())
    }
}

async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .ok()
            .map(|body| body.trim().to_string())
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| status.to_string());
        return Err(Error::provider(status.as_u16(), message));
    }
    response.text().await.map_err(transport_error)
}

/// Station-feed reading provider.
#[derive(Debug, Clone)]
pub struct HttpReadingProvider {
    client: Client,
    base_url: String,
    token: String,
    retry: RetryConfig,
}

impl HttpReadingProvider {
    /// Public station feed endpoint.
    pub const DEFAULT_URL: &'static str = "https://api.waqi.info";

    /// Create a provider for `base_url` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a non-HTTP URL or an empty token.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::invalid_config("provider token is empty"));
        }
        Ok(Self {
            client: build_client()?,
            base_url: normalize_base_url(base_url)?,
            token,
            retry: RetryConfig::for_fetch(),
        })
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Feed URL for a position.
    pub fn feed_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}/feed/geo:{};{}/?token={}",
            self.base_url,
            coordinates.latitude(),
            coordinates.longitude(),
            self.token
        )
    }

    async fn fetch_once(&self, url: &str) -> Result<ProviderPayload> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let body = read_body(response).await?;
        ProviderPayload::from_json(&body)
    }
}

#[async_trait]
impl ReadingProvider for HttpReadingProvider {
    fn name(&self) -> &str {
        "station-feed"
    }

    async fn fetch_by_coordinates(&self, coordinates: Coordinates) -> Result<ProviderPayload> {
        let url = self.feed_url(coordinates);
        debug!(%coordinates, "requesting station feed");
        with_retry(&self.retry, "fetch_feed", || self.fetch_once(&url)).await
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

impl SearchResponse {
    fn into_locations(self) -> Vec<Location> {
        self.results
            .into_iter()
            .filter_map(|r| {
                let coordinates = match Coordinates::new(r.latitude, r.longitude) {
                    Ok(c) => c,
                    Err(e) => {
                        debug!(name = %r.name, error = %e, "skipping search result");
                        return None;
                    }
                };
                let country = r.country.or(r.country_code).unwrap_or_default();
                Some(Location::new(r.name, country, coordinates))
            })
            .collect()
    }
}

/// Place-name geocoder.
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpGeocoder {
    /// Public geocoding search endpoint.
    pub const DEFAULT_URL: &'static str = "https://geocoding-api.open-meteo.com/v1/search";

    /// Create a geocoder for `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: normalize_base_url(base_url)?,
            retry: RetryConfig::for_search(),
        })
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search_once(&self, query: &str) -> Result<Vec<Location>> {
        let count = SEARCH_LIMIT.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("name", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(transport_error)?;
        let body = read_body(response).await?;
        parse_search(&body)
    }
}

fn parse_search(body: &str) -> Result<Vec<Location>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| Error::malformed(format!("unparseable search response: {e}")))?;
    Ok(response.into_locations())
}

#[async_trait]
impl GeocodingProvider for HttpGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Location>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        with_retry(&self.retry, "search_location", || self.search_once(query)).await
    }
}
