//! Heat-stress and air-quality monitoring pipeline.
//!
//! This crate turns raw environmental readings for a location into a
//! composite heat index and an ordinal risk level, keeps a bounded rolling
//! history, and detects risk transitions for alerting.
//!
//! # Features
//!
//! - **Heat index**: Rothfusz regression above 27 °C, identity below
//! - **Risk classification**: heat, PM2.5 and UV brackets scored into Low/Medium/High
//! - **Normalization**: missing instruments replaced by configurable defaults
//! - **Rolling history**: fixed-capacity window keyed by location
//! - **Transition alerts**: gated by an explicit notification policy
//! - **Stale-fetch protection**: results of superseded fetches are discarded
//! - **HTTP providers** (feature `http`): station feed and place-name search
//!
//! # Pipeline
//!
//! Each run is `fetch → normalize → append → check`:
//!
//! ```text
//! ReadingProvider ──▶ ReadingNormalizer ──▶ HistoryWindow ──▶ RiskTransitionWatcher
//!  (raw payload)       (Reading + risk)      (24 entries)       (TransitionEvent)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use heatwatch_core::mock::{MockProvider, payload_with};
//! use heatwatch_core::{Monitor, RiskLevel};
//! use heatwatch_types::{Coordinates, Location};
//!
//! #[tokio::main]
//! async fn main() -> heatwatch_core::Result<()> {
//!     let provider = MockProvider::with_payload(payload_with(38.0, 60.0, 80.0, 9.0, 10.0));
//!     let monitor = Monitor::new(provider);
//!
//!     let delhi = Location::new("Delhi", "IN", Coordinates::new(28.6139, 77.209)?);
//!     monitor.select_location(delhi).await;
//!
//!     let outcome = monitor.refresh().await?;
//!     let reading = outcome.reading().expect("latest fetch is recorded");
//!     assert!(reading.heat_index() > 45.0);
//!     assert_eq!(reading.risk_level(), RiskLevel::High);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod heat_index;
pub mod history;
#[cfg(feature = "http")]
pub mod http;
pub mod mock;
pub mod monitor;
pub mod normalize;
pub mod notify;
pub mod payload;
pub mod readings;
pub mod retry;
pub mod risk;
pub mod traits;
pub mod watcher;

// Core exports
pub use error::{Error, Result};
pub use history::HistoryWindow;
pub use monitor::{FetchOutcome, FetchTicket, Monitor, MonitorState, resolve_location};
pub use normalize::{InstrumentDefaults, ReadingNormalizer};
pub use payload::{PayloadStatus, ProviderPayload, RawInstruments};
pub use readings::{Measurements, Reading};
pub use risk::{RiskClassifier, RiskThresholds, classify};
pub use traits::{GeocodingProvider, NotificationSink, ReadingProvider};
pub use watcher::{RiskTransitionWatcher, TransitionEvent};

pub use config::{ConfigError, MonitorConfig, NotificationConfig, ValidationError};
pub use events::{EventDispatcher, EventReceiver, EventSender, MonitorEvent};
pub use notify::{LogSink, NotificationPermission, NotificationPolicy};
pub use retry::{RetryConfig, with_retry};

// Re-export from heatwatch-types
pub use heatwatch_types::{Coordinates, Location, LocationKey, RiskLevel, TypeError};
