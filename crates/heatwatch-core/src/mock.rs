//! Mock collaborators for testing.
//!
//! This module provides in-memory stand-ins for the provider and sink traits
//! so the pipeline can be exercised without network access.
//!
//! # Features
//!
//! - **Scripted responses**: queue payloads or failures, each with its own delay
//! - **Failure injection**: fail every fetch, or only the next N fetches
//! - **Latency simulation**: add an artificial delay to every fetch
//! - **Request recording**: inspect which coordinates were requested

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use heatwatch_types::{Coordinates, Location, RiskLevel};

use crate::error::{Error, Result};
use crate::payload::{ProviderPayload, RawInstruments};
use crate::traits::{GeocodingProvider, NotificationSink, ReadingProvider};

/// Build an `ok` payload with every instrument present.
pub fn payload_with(
    temperature: f64,
    humidity: f64,
    pm25: f64,
    uv_index: f64,
    wind_speed: f64,
) -> ProviderPayload {
    ProviderPayload::ok(RawInstruments {
        temperature: Some(temperature),
        humidity: Some(humidity),
        pm25: Some(pm25),
        wind_speed: Some(wind_speed),
        uv_index: Some(uv_index),
    })
    .with_station("Mock Station")
}

enum ScriptedOutcome {
    Payload(ProviderPayload),
    Failure { status: Option<u16>, message: String },
}

struct Scripted {
    outcome: ScriptedOutcome,
    delay: Duration,
}

/// A mock reading provider.
///
/// Scripted responses are consumed first, in order. Once the script is
/// empty every fetch returns the default payload.
///
/// # Example
///
/// ```
/// use heatwatch_core::mock::{MockProvider, payload_with};
/// use heatwatch_core::ReadingProvider;
/// use heatwatch_types::Coordinates;
///
/// #[tokio::main]
/// async fn main() {
///     let provider = MockProvider::new();
///     provider.push_payload(payload_with(38.0, 60.0, 80.0, 9.0, 10.0)).await;
///
///     let coords = Coordinates::new(28.61, 77.21).unwrap();
///     let payload = provider.fetch_by_coordinates(coords).await.unwrap();
///     assert_eq!(payload.instruments.temperature, Some(38.0));
///     assert_eq!(provider.fetch_count(), 1);
/// }
/// ```
pub struct MockProvider {
    payload: RwLock<ProviderPayload>,
    script: RwLock<VecDeque<Scripted>>,
    requests: RwLock<Vec<Coordinates>>,
    fetch_count: AtomicU32,
    should_fail: AtomicBool,
    fail_status: RwLock<Option<u16>>,
    fail_message: RwLock<String>,
    /// Simulated latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    /// Number of fetches to fail before succeeding.
    remaining_failures: AtomicU32,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a provider whose default payload is a mild, low-risk reading.
    pub fn new() -> Self {
        Self::with_payload(payload_with(24.0, 45.0, 12.0, 3.0, 8.0))
    }

    /// Create a provider with a custom default payload.
    pub fn with_payload(payload: ProviderPayload) -> Self {
        Self {
            payload: RwLock::new(payload),
            script: RwLock::new(VecDeque::new()),
            requests: RwLock::new(Vec::new()),
            fetch_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
            fail_status: RwLock::new(Some(503)),
            fail_message: RwLock::new("Mock failure".to_string()),
            latency_ms: AtomicU64::new(0),
            remaining_failures: AtomicU32::new(0),
        }
    }

    // --- Test control methods ---

    /// Replace the default payload.
    pub async fn set_payload(&self, payload: ProviderPayload) {
        *self.payload.write().await = payload;
    }

    /// Queue a payload for the next unscripted fetch.
    pub async fn push_payload(&self, payload: ProviderPayload) {
        self.push_delayed_payload(payload, Duration::ZERO).await;
    }

    /// Queue a payload that is returned after `delay`.
    pub async fn push_delayed_payload(&self, payload: ProviderPayload, delay: Duration) {
        self.script.write().await.push_back(Scripted {
            outcome: ScriptedOutcome::Payload(payload),
            delay,
        });
    }

    /// Queue a provider failure.
    pub async fn push_failure(&self, status: Option<u16>, message: &str) {
        self.script.write().await.push_back(Scripted {
            outcome: ScriptedOutcome::Failure {
                status,
                message: message.to_string(),
            },
            delay: Duration::ZERO,
        });
    }

    /// Make every fetch fail with the given status until reset.
    pub async fn set_should_fail(&self, fail: bool, status: Option<u16>, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        *self.fail_status.write().await = status;
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Fail the next `count` fetches, then succeed.
    pub fn set_transient_failures(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Number of transient failures still pending.
    pub fn remaining_failures(&self) -> u32 {
        self.remaining_failures.load(Ordering::Relaxed)
    }

    /// Set simulated latency for every fetch.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of fetches performed.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// Coordinates requested so far, in call order.
    pub async fn requests(&self) -> Vec<Coordinates> {
        self.requests.read().await.clone()
    }

    async fn injected_failure(&self) -> Option<Error> {
        let transient = self
            .remaining_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if transient || self.should_fail.load(Ordering::Relaxed) {
            let message = self.fail_message.read().await.clone();
            return Some(match *self.fail_status.read().await {
                Some(status) => Error::provider(status, message),
                None => Error::network(message),
            });
        }
        None
    }
}

#[async_trait]
impl ReadingProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_by_coordinates(&self, coordinates: Coordinates) -> Result<ProviderPayload> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.requests.write().await.push(coordinates);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if let Some(err) = self.injected_failure().await {
            return Err(err);
        }

        // Pop before sleeping so concurrent fetches each take their own entry
        let next = self.script.write().await.pop_front();
        match next {
            Some(Scripted { outcome, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                match outcome {
                    ScriptedOutcome::Payload(payload) => Ok(payload),
                    ScriptedOutcome::Failure {
                        status: Some(status),
                        message,
                    } => Err(Error::provider(status, message)),
                    ScriptedOutcome::Failure {
                        status: None,
                        message,
                    } => Err(Error::network(message)),
                }
            }
            None => Ok(self.payload.read().await.clone()),
        }
    }
}

/// A mock geocoder over a fixed list of places.
///
/// Matches are places whose name contains the query, ignoring case.
#[derive(Debug, Default)]
pub struct MockGeocoder {
    places: Vec<Location>,
    should_fail: AtomicBool,
}

impl MockGeocoder {
    /// Create a geocoder that knows `places`.
    pub fn new(places: Vec<Location>) -> Self {
        Self {
            places,
            should_fail: AtomicBool::new(false),
        }
    }

    /// Make every search fail with a network error.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl GeocodingProvider for MockGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Location>> {
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::network("Mock geocoder failure"));
        }
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .places
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

/// A notification captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub level: RiskLevel,
    pub title: String,
    pub body: String,
}

/// A sink that records every notification.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SentNotification>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received, oldest first.
    pub fn notifications(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of notifications received.
    pub fn count(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, level: RiskLevel, title: &str, body: &str) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SentNotification {
                level,
                title: title.to_string(),
                body: body.to_string(),
            });
    }
}
