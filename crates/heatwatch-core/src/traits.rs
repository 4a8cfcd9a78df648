//! Collaborator abstractions.
//!
//! The pipeline talks to the outside world through three seams:
//!
//! - [`ReadingProvider`] supplies raw payloads for a coordinate pair
//! - [`GeocodingProvider`] resolves a place name to [`Location`]s
//! - [`NotificationSink`] shows a user-visible alert
//!
//! HTTP implementations live in [`crate::http`] (feature `http`) and mock
//! implementations for tests in [`crate::mock`].

use std::sync::Arc;

use async_trait::async_trait;

use heatwatch_types::{Coordinates, Location, RiskLevel};

use crate::error::Result;
use crate::payload::ProviderPayload;

/// Source of raw environmental readings.
///
/// # Example
///
/// ```ignore
/// use heatwatch_core::{ReadingProvider, Result};
///
/// async fn print_station<P: ReadingProvider>(provider: &P, coords: Coordinates) -> Result<()> {
///     let payload = provider.fetch_by_coordinates(coords).await?;
///     println!("station: {:?}", payload.station);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ReadingProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "provider"
    }

    /// Fetch the latest payload for a position.
    ///
    /// Network and upstream failures are reported as
    /// [`Error::Provider`](crate::Error::Provider). A payload whose own status
    /// reports failure is returned as-is; the normalizer rejects it.
    async fn fetch_by_coordinates(&self, coordinates: Coordinates) -> Result<ProviderPayload>;
}

/// Place-name search.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Search for places matching `query`, best match first.
    async fn search(&self, query: &str) -> Result<Vec<Location>>;
}

/// Best-effort, fire-and-forget user notification.
pub trait NotificationSink: Send + Sync {
    /// Show a notification about a change to `level`.
    ///
    /// Failures are the sink's own concern.
    fn notify(&self, level: RiskLevel, title: &str, body: &str);
}

#[async_trait]
impl<P: ReadingProvider + ?Sized> ReadingProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_by_coordinates(&self, coordinates: Coordinates) -> Result<ProviderPayload> {
        (**self).fetch_by_coordinates(coordinates).await
    }
}

#[async_trait]
impl<G: GeocodingProvider + ?Sized> GeocodingProvider for Arc<G> {
    async fn search(&self, query: &str) -> Result<Vec<Location>> {
        (**self).search(query).await
    }
}
