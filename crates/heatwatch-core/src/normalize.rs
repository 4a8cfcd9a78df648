//! Payload normalization.
//!
//! Turns a [`ProviderPayload`] into a complete [`Reading`]: missing
//! instruments fall back to [`InstrumentDefaults`], values are rounded, and
//! heat index and risk level are derived from the rounded values. The
//! timestamp is the observation time passed in by the caller, not anything
//! the provider reports.
//!
//! # Example
//!
//! ```
//! use heatwatch_core::normalize::ReadingNormalizer;
//! use heatwatch_core::payload::{ProviderPayload, RawInstruments};
//! use time::OffsetDateTime;
//!
//! let normalizer = ReadingNormalizer::default();
//! let payload = ProviderPayload::ok(RawInstruments {
//!     temperature: Some(24.36),
//!     ..Default::default()
//! });
//!
//! let reading = normalizer.normalize(&payload, OffsetDateTime::UNIX_EPOCH).unwrap();
//! assert_eq!(reading.temperature(), 24.4);
//! assert_eq!(reading.pm25(), 50); // default
//! ```

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::{Error, Result};
use crate::payload::{PayloadStatus, ProviderPayload};
use crate::readings::{Measurements, Reading};
use crate::risk::RiskClassifier;

/// Fallback values for instruments a station did not report.
///
/// Crowd-sourced stations frequently omit sensors; the defaults describe a
/// moderate reading so one missing sensor does not fail the whole fetch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentDefaults {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// PM2.5 in µg/m³.
    pub pm25: f64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// UV index.
    pub uv_index: f64,
}

impl Default for InstrumentDefaults {
    fn default() -> Self {
        Self {
            temperature: 35.0,
            humidity: 40.0,
            pm25: 50.0,
            wind_speed: 5.0,
            uv_index: 6.0,
        }
    }
}

impl InstrumentDefaults {
    /// Names of fields holding non-finite values.
    pub fn non_finite_fields(&self) -> Vec<&'static str> {
        [
            ("defaults.temperature", self.temperature),
            ("defaults.humidity", self.humidity),
            ("defaults.pm25", self.pm25),
            ("defaults.wind_speed", self.wind_speed),
            ("defaults.uv_index", self.uv_index),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Normalizer from raw payloads to readings.
#[derive(Debug, Clone, Default)]
pub struct ReadingNormalizer {
    defaults: InstrumentDefaults,
    classifier: RiskClassifier,
}

impl ReadingNormalizer {
    /// Create a normalizer with custom defaults and classifier.
    pub fn new(defaults: InstrumentDefaults, classifier: RiskClassifier) -> Self {
        Self {
            defaults,
            classifier,
        }
    }

    /// Get the instrument defaults.
    pub fn defaults(&self) -> &InstrumentDefaults {
        &self.defaults
    }

    /// Get the risk classifier.
    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Normalize a payload observed at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] if the upstream status reports
    /// failure. Missing instruments are never an error.
    pub fn normalize(&self, payload: &ProviderPayload, now: OffsetDateTime) -> Result<Reading> {
        if let PayloadStatus::Failed(message) = &payload.status {
            return Err(Error::malformed(message.clone()));
        }

        let raw = &payload.instruments;
        let station = payload.station.as_deref().unwrap_or("unknown");
        let pick = |value: Option<f64>, fallback: f64, name: &str| match value {
            Some(v) if v.is_finite() => v,
            _ => {
                debug!(station, instrument = name, fallback, "instrument missing, using default");
                fallback
            }
        };

        let d = &self.defaults;
        let measurements = Measurements::new(
            pick(raw.temperature, d.temperature, "temperature"),
            pick(raw.humidity, d.humidity, "humidity"),
            pick(raw.pm25, d.pm25, "pm25"),
            pick(raw.uv_index, d.uv_index, "uv_index"),
            pick(raw.wind_speed, d.wind_speed, "wind_speed"),
        );

        Ok(Reading::derive(now, measurements, &self.classifier))
    }
}
