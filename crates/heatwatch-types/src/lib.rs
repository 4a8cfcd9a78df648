//! Platform-agnostic types for heat-stress and air-quality monitoring.
//!
//! This crate provides the value types shared by the monitoring pipeline
//! (`heatwatch-core`) and its front ends.
//!
//! # Features
//!
//! - Ordinal [`RiskLevel`] classification
//! - Validated [`Coordinates`] and tracked [`Location`] identities
//! - Rounding helpers used to normalize instrument values
//!
//! # Example
//!
//! ```
//! use heatwatch_types::{Coordinates, Location, RiskLevel};
//!
//! let coords = Coordinates::new(28.6139, 77.2090).unwrap();
//! let delhi = Location::new("Delhi", "IN", coords);
//! assert_eq!(delhi.key(), Location::new("Delhi", "IN", coords).key());
//! assert!(RiskLevel::High > RiskLevel::Medium);
//! ```

pub mod error;
pub mod types;
pub mod units;

pub use error::{TypeError, TypeResult};
pub use types::{Coordinates, Location, LocationKey, RiskLevel};
pub use units::{round_to_int, round_to_tenth};
