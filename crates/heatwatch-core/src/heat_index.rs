//! Apparent temperature from air temperature and relative humidity.
//!
//! Below [`THRESHOLD_C`] humidity has negligible effect on perceived heat and
//! the air temperature is returned unchanged. At or above it the Rothfusz
//! regression is evaluated with the temperature in degrees Celsius fed
//! straight into the coefficients; the result is floored at the air
//! temperature so the index never reads cooler than the air.
//!
//! ```
//! use heatwatch_core::heat_index;
//!
//! assert_eq!(heat_index::compute(22.0, 90.0), 22.0);
//! assert!(heat_index::compute(38.0, 60.0) > 38.0);
//! ```

/// Temperature (°C) below which the index equals the air temperature.
pub const THRESHOLD_C: f64 = 27.0;

const C1: f64 = -42.379;
const C2: f64 = 2.049_015_23;
const C3: f64 = 10.143_331_27;
const C4: f64 = -0.224_755_41;
const C5: f64 = -0.006_837_83;
const C6: f64 = -0.054_817_17;
const C7: f64 = 0.001_228_74;
const C8: f64 = 0.000_852_82;
const C9: f64 = -0.000_001_99;

/// Compute the heat index in °C.
///
/// Defined for every input; the result is always `>= temperature`.
#[must_use]
pub fn compute(temperature: f64, humidity: f64) -> f64 {
    if temperature < THRESHOLD_C {
        return temperature;
    }
    temperature.max(rothfusz(temperature, humidity))
}

fn rothfusz(t: f64, rh: f64) -> f64 {
    let t2 = t * t;
    let rh2 = rh * rh;
    C1 + C2 * t + C3 * rh + C4 * t * rh + C5 * t2 + C6 * rh2 + C7 * t2 * rh + C8 * t * rh2
        + C9 * t2 * rh2
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_below_threshold_is_identity() {
        assert_eq!(compute(26.9, 100.0), 26.9);
        assert_eq!(compute(-10.0, 0.0), -10.0);
        assert_eq!(compute(0.0, 55.0), 0.0);
    }

    #[test]
    fn test_regression_value() {
        // Coefficients applied directly to °C input.
        let hi = compute(38.0, 60.0);
        assert!((hi - 137.2045).abs() < 0.01, "got {hi}");
    }

    #[test]
    fn test_clamped_to_temperature() {
        // Dry air at the threshold drives the regression below the air temperature.
        assert!(rothfusz(27.0, 0.0) < 27.0);
        assert_eq!(compute(27.0, 0.0), 27.0);
    }

    #[test]
    fn test_threshold_boundary_uses_regression() {
        assert!(compute(27.0, 90.0) > 27.0);
    }

    proptest! {
        #[test]
        fn heat_index_never_below_temperature(t in -10.0f64..55.0, h in 0.0f64..=100.0) {
            prop_assert!(compute(t, h) >= t);
        }

        #[test]
        fn heat_index_identity_below_threshold(t in -10.0f64..THRESHOLD_C, h in 0.0f64..=100.0) {
            prop_assert_eq!(compute(t, h), t);
        }
    }
}
