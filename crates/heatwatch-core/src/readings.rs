//! Normalized readings with derived heat index and risk level.
//!
//! A [`Reading`] is an immutable snapshot. Its derived fields are computed
//! once from the rounded [`Measurements`] and cannot be set independently:
//!
//! - `heat_index >= temperature`
//! - `risk_level == classify(heat_index, pm25, uv_index)`

use serde::Serialize;
use time::OffsetDateTime;

use heatwatch_types::{RiskLevel, round_to_int, round_to_tenth};

use crate::heat_index;
use crate::risk::RiskClassifier;

/// Rounded instrument values, ready for derivation.
///
/// Temperature and wind speed keep one decimal place; humidity, PM2.5 and
/// UV index are whole numbers. Humidity is clamped to `0..=100` and the
/// pollution and UV counts are clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurements {
    temperature: f64,
    humidity: u8,
    pm25: u32,
    uv_index: u32,
    wind_speed: f64,
}

impl Measurements {
    /// Round and clamp raw instrument values.
    pub fn new(temperature: f64, humidity: f64, pm25: f64, uv_index: f64, wind_speed: f64) -> Self {
        Self {
            temperature: round_to_tenth(temperature),
            humidity: round_to_int(humidity).clamp(0, 100) as u8,
            pm25: round_to_int(pm25).clamp(0, i64::from(u32::MAX)) as u32,
            uv_index: round_to_int(uv_index).clamp(0, i64::from(u32::MAX)) as u32,
            wind_speed: round_to_tenth(wind_speed),
        }
    }

    /// Air temperature in °C.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> u8 {
        self.humidity
    }

    /// PM2.5 concentration in µg/m³.
    pub fn pm25(&self) -> u32 {
        self.pm25
    }

    /// UV index.
    pub fn uv_index(&self) -> u32 {
        self.uv_index
    }

    /// Wind speed in km/h.
    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }
}

/// A normalized point-in-time reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    #[serde(flatten)]
    measurements: Measurements,
    heat_index: f64,
    risk_level: RiskLevel,
}

impl Reading {
    /// Derive heat index and risk level from rounded measurements.
    pub fn derive(
        timestamp: OffsetDateTime,
        measurements: Measurements,
        classifier: &RiskClassifier,
    ) -> Self {
        let heat_index = round_to_tenth(heat_index::compute(
            measurements.temperature,
            f64::from(measurements.humidity),
        ));
        let risk_level = classifier.classify(heat_index, measurements.pm25, measurements.uv_index);
        Self {
            timestamp,
            measurements,
            heat_index,
            risk_level,
        }
    }

    /// When the reading was normalized.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// The rounded instrument values.
    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    /// Air temperature in °C.
    pub fn temperature(&self) -> f64 {
        self.measurements.temperature
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> u8 {
        self.measurements.humidity
    }

    /// PM2.5 concentration in µg/m³.
    pub fn pm25(&self) -> u32 {
        self.measurements.pm25
    }

    /// UV index.
    pub fn uv_index(&self) -> u32 {
        self.measurements.uv_index
    }

    /// Wind speed in km/h.
    pub fn wind_speed(&self) -> f64 {
        self.measurements.wind_speed
    }

    /// Heat index in °C, one decimal place.
    pub fn heat_index(&self) -> f64 {
        self.heat_index
    }

    /// Classified risk level.
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }
}
