//! Rounding helpers for instrument values.
//!
//! Both helpers round half away from zero, which is what [`f64::round`]
//! does.

/// Round to one decimal place.
///
/// ```
/// use heatwatch_types::round_to_tenth;
///
/// assert_eq!(round_to_tenth(31.25), 31.3);
/// assert_eq!(round_to_tenth(-2.25), -2.3);
/// ```
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to the nearest integer.
///
/// ```
/// use heatwatch_types::round_to_int;
///
/// assert_eq!(round_to_int(64.5), 65);
/// assert_eq!(round_to_int(-0.5), -1);
/// ```
#[must_use]
pub fn round_to_int(value: f64) -> i64 {
    // `as` saturates on overflow and maps NaN to 0.
    value.round() as i64
}
