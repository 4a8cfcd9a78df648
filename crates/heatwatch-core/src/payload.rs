//! Raw provider payloads.
//!
//! A [`ProviderPayload`] is what a [`ReadingProvider`](crate::ReadingProvider)
//! hands back before normalization: an upstream status plus whichever
//! instruments the station reported. Any instrument may be missing.
//!
//! [`ProviderPayload::from_json`] understands the station-feed wire shape:
//!
//! ```json
//! {
//!   "status": "ok",
//!   "data": {
//!     "city": { "name": "Delhi" },
//!     "iaqi": { "t": { "v": 38 }, "h": { "v": 60 }, "pm25": { "v": 80 },
//!               "w": { "v": 10 }, "uvi": { "v": 9 } }
//!   }
//! }
//! ```
//!
//! A failed request carries the reason in `data` instead:
//! `{"status": "error", "data": "Invalid key"}`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Upstream status of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadStatus {
    /// The upstream reports success.
    #[default]
    Ok,
    /// The upstream reports failure with the given message.
    Failed(String),
}

/// Instrument values as reported, before defaults and rounding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawInstruments {
    /// Air temperature in °C.
    pub temperature: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// PM2.5 in µg/m³.
    pub pm25: Option<f64>,
    /// Wind speed in km/h.
    pub wind_speed: Option<f64>,
    /// UV index.
    pub uv_index: Option<f64>,
}

/// A raw reading payload from a provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderPayload {
    /// Upstream status.
    pub status: PayloadStatus,
    /// Reporting station name, if known.
    pub station: Option<String>,
    /// Reported instrument values.
    pub instruments: RawInstruments,
}

// Wire keys of the station feed.
const KEY_TEMPERATURE: &str = "t";
const KEY_HUMIDITY: &str = "h";
const KEY_PM25: &str = "pm25";
const KEY_WIND: &str = "w";
const KEY_UV: &str = "uvi";
const KEY_UV_ALT: &str = "uv";

#[derive(Deserialize)]
struct WireFeed {
    status: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct WireData {
    #[serde(default)]
    city: Option<WireCity>,
    #[serde(default)]
    iaqi: HashMap<String, WireValue>,
}

#[derive(Deserialize)]
struct WireCity {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct WireValue {
    #[serde(default)]
    v: Value,
}

impl ProviderPayload {
    /// Create a successful payload.
    pub fn ok(instruments: RawInstruments) -> Self {
        Self {
            status: PayloadStatus::Ok,
            station: None,
            instruments,
        }
    }

    /// Create a payload whose upstream status reports failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: PayloadStatus::Failed(message.into()),
            station: None,
            instruments: RawInstruments::default(),
        }
    }

    /// Set the station name.
    pub fn with_station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }

    /// Whether the upstream reported success.
    pub fn is_ok(&self) -> bool {
        self.status == PayloadStatus::Ok
    }

    /// Parse a station-feed response body.
    ///
    /// A non-`ok` status is not an error here; it is carried in
    /// [`PayloadStatus::Failed`] and rejected by the normalizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] if the body is not valid JSON or
    /// an `ok` response lacks a well-formed `data` object.
    pub fn from_json(body: &str) -> Result<Self> {
        let feed: WireFeed = serde_json::from_str(body)
            .map_err(|e| Error::malformed(format!("unparseable body: {e}")))?;

        if !feed.status.eq_ignore_ascii_case("ok") {
            let message = match (&feed.data, feed.message) {
                (Value::String(s), _) => s.clone(),
                (_, Some(m)) => m,
                _ => format!("upstream status '{}'", feed.status),
            };
            return Ok(Self::failed(message));
        }

        let data: WireData = serde_json::from_value(feed.data)
            .map_err(|e| Error::malformed(format!("invalid data object: {e}")))?;

        let value = |key: &str| data.iaqi.get(key).and_then(|w| w.v.as_f64());
        let instruments = RawInstruments {
            temperature: value(KEY_TEMPERATURE),
            humidity: value(KEY_HUMIDITY),
            pm25: value(KEY_PM25),
            wind_speed: value(KEY_WIND),
            uv_index: value(KEY_UV).or_else(|| value(KEY_UV_ALT)),
        };

        Ok(Self {
            status: PayloadStatus::Ok,
            station: data.city.and_then(|c| c.name),
            instruments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_feed() {
        let body = r#"{
            "status": "ok",
            "data": {
                "city": { "name": "Delhi" },
                "iaqi": {
                    "t": { "v": 38 }, "h": { "v": 60 }, "pm25": { "v": 80 },
                    "w": { "v": 10.5 }, "uvi": { "v": 9 }, "co": { "v": 1.2 }
                }
            }
        }"#;
        let payload = ProviderPayload::from_json(body).unwrap();
        assert!(payload.is_ok());
        assert_eq!(payload.station.as_deref(), Some("Delhi"));
        assert_eq!(
            payload.instruments,
            RawInstruments {
                temperature: Some(38.0),
                humidity: Some(60.0),
                pm25: Some(80.0),
                wind_speed: Some(10.5),
                uv_index: Some(9.0),
            }
        );
    }

    #[test]
    fn test_parse_missing_instruments() {
        let body = r#"{"status":"ok","data":{"iaqi":{"t":{"v":31.2},"pm25":{"v":"-"}}}}"#;
        let payload = ProviderPayload::from_json(body).unwrap();
        assert_eq!(payload.instruments.temperature, Some(31.2));
        assert_eq!(payload.instruments.pm25, None);
        assert_eq!(payload.instruments.humidity, None);
        assert_eq!(payload.station, None);
    }

    #[test]
    fn test_uv_alias() {
        let body = r#"{"status":"ok","data":{"iaqi":{"uv":{"v":7}}}}"#;
        let payload = ProviderPayload::from_json(body).unwrap();
        assert_eq!(payload.instruments.uv_index, Some(7.0));
    }

    #[test]
    fn test_error_status_carries_message() {
        let payload = ProviderPayload::from_json(r#"{"status":"error","data":"Invalid key"}"#).unwrap();
        assert_eq!(payload.status, PayloadStatus::Failed("Invalid key".into()));
        assert!(!payload.is_ok());

        let payload =
            ProviderPayload::from_json(r#"{"status":"nug","message":"over quota"}"#).unwrap();
        assert_eq!(payload.status, PayloadStatus::Failed("over quota".into()));

        let payload = ProviderPayload::from_json(r#"{"status":"error"}"#).unwrap();
        assert_eq!(
            payload.status,
            PayloadStatus::Failed("upstream status 'error'".into())
        );
    }

    #[test]
    fn test_unparseable_body() {
        let err = ProviderPayload::from_json("<html>502</html>").unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));

        let err = ProviderPayload::from_json(r#"{"status":"ok","data":"oops"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }
}
