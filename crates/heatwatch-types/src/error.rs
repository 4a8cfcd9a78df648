//! Error types for heatwatch-types.

use thiserror::Error;

/// Errors that can occur when constructing heatwatch value types.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TypeError {
    /// Latitude or longitude is out of range or not finite.
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },

    /// A risk level name could not be parsed.
    #[error("Unknown risk level: {0}")]
    UnknownRiskLevel(String),
}

/// Result type alias using heatwatch-types' TypeError type.
pub type TypeResult<T> = std::result::Result<T, TypeError>;
