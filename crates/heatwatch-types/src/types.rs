//! Core value types for heat-stress monitoring.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Combined heat, air-quality and UV hazard classification.
///
/// # Ordering
///
/// Levels are ordered by severity: `Low < Medium < High`. This allows
/// comparisons like `if level >= RiskLevel::Medium { ... }`.
///
/// ```
/// use heatwatch_types::RiskLevel;
///
/// assert!(RiskLevel::High > RiskLevel::Low);
/// assert_eq!(RiskLevel::Medium.to_string(), "Medium");
/// assert_eq!("high".parse::<RiskLevel>(), Ok(RiskLevel::High));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RiskLevel {
    /// Conditions pose little combined risk.
    Low,
    /// Elevated risk from one strong factor or several moderate ones.
    Medium,
    /// Several factors are severe at once.
    High,
}

impl RiskLevel {
    /// All levels in ascending order of severity.
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    /// Get a human-readable description of the risk level.
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low - conditions are comfortable",
            RiskLevel::Medium => "Medium - limit prolonged outdoor exertion",
            RiskLevel::High => "High - heat and air quality are hazardous",
        }
    }

    /// Get the suggested action for this risk level.
    pub fn action(&self) -> &'static str {
        match self {
            RiskLevel::Low => "No action needed",
            RiskLevel::Medium => "Stay hydrated and take breaks in the shade",
            RiskLevel::High => "Avoid outdoor activity and stay indoors if possible",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(TypeError::UnknownRiskLevel(s.to_string())),
        }
    }
}

/// A validated latitude/longitude pair in decimal degrees.
///
/// Deserialization runs the same checks as [`Coordinates::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawCoordinates"))]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCoordinates> for Coordinates {
    type Error = TypeError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    /// Create coordinates, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidCoordinates`] unless latitude is within
    /// `[-90, 90]` and longitude within `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, TypeError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(TypeError::InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A named place whose conditions are being tracked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Place name, e.g. "Delhi".
    pub name: String,
    /// Country name or code as reported by the geocoder.
    pub country: String,
    /// Position used to query the reading provider.
    pub coordinates: Coordinates,
}

impl Location {
    /// Create a new location.
    pub fn new(name: impl Into<String>, country: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            coordinates,
        }
    }

    /// Create an unnamed location for a raw coordinate pair.
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self::new(coordinates.to_string(), "", coordinates)
    }

    /// Identity of this location for history bookkeeping.
    ///
    /// Two locations share a key when their names match case-insensitively
    /// and their coordinates agree to four decimal places (about 11 m).
    pub fn key(&self) -> LocationKey {
        LocationKey {
            name: self.name.trim().to_lowercase(),
            lat_e4: (self.coordinates.latitude * 1e4).round() as i32,
            lon_e4: (self.coordinates.longitude * 1e4).round() as i32,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}, {}", self.name, self.country)
        }
    }
}

/// Hashable identity of a [`Location`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocationKey {
    name: String,
    lat_e4: i32,
    lon_e4: i32,
}
