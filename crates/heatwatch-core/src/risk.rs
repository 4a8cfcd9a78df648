//! Risk classification from heat index, PM2.5 and UV index.
//!
//! Each factor contributes the score of its highest matching bracket, the
//! contributions are summed, and the total maps onto a [`RiskLevel`].
//!
//! | Factor | Condition | Score |
//! |--------|-----------|-------|
//! | heat index | > 45 °C | +3 |
//! | heat index | > 40 °C | +2 |
//! | heat index | > 35 °C | +1 |
//! | PM2.5 | > 75 µg/m³ | +2 |
//! | PM2.5 | > 50 µg/m³ | +1 |
//! | UV index | > 8 | +1 |
//!
//! A total of 4 or more is [`RiskLevel::High`], 2 or more is
//! [`RiskLevel::Medium`], anything less is [`RiskLevel::Low`].
//!
//! # Example
//!
//! ```
//! use heatwatch_core::risk::{self, RiskClassifier};
//! use heatwatch_core::RiskLevel;
//!
//! // Heat alone tops out at 3 points.
//! assert_eq!(risk::classify(46.0, 0, 0), RiskLevel::Medium);
//! assert_eq!(risk::classify(46.0, 80, 0), RiskLevel::High);
//!
//! let classifier = RiskClassifier::default();
//! assert_eq!(classifier.score(46.0, 80, 9), 6);
//! ```

use serde::{Deserialize, Serialize};

use heatwatch_types::RiskLevel;

/// Bracket boundaries and level cut-offs used by [`RiskClassifier`].
///
/// All heat and pollution bounds are exclusive lower bounds: a value must be
/// strictly greater to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Heat index (°C) above which +1 is scored.
    pub heat_caution_c: f64,
    /// Heat index (°C) above which +2 is scored.
    pub heat_warning_c: f64,
    /// Heat index (°C) above which +3 is scored.
    pub heat_danger_c: f64,
    /// PM2.5 (µg/m³) above which +1 is scored.
    pub pm25_moderate: u32,
    /// PM2.5 (µg/m³) above which +2 is scored.
    pub pm25_unhealthy: u32,
    /// UV index above which +1 is scored.
    pub uv_very_high: u32,
    /// Minimum total score for Medium.
    pub medium_score: u8,
    /// Minimum total score for High.
    pub high_score: u8,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            heat_caution_c: 35.0,
            heat_warning_c: 40.0,
            heat_danger_c: 45.0,
            pm25_moderate: 50,
            pm25_unhealthy: 75,
            uv_very_high: 8,
            medium_score: 2,
            high_score: 4,
        }
    }
}

impl RiskThresholds {
    /// Check that brackets ascend and cut-offs are ordered.
    ///
    /// Returns a list of `(field, message)` problems; empty when valid.
    pub fn problems(&self) -> Vec<(&'static str, String)> {
        let mut problems = Vec::new();
        let heat = [self.heat_caution_c, self.heat_warning_c, self.heat_danger_c];
        if heat.iter().any(|v| !v.is_finite()) {
            problems.push(("thresholds.heat", "heat bounds must be finite".to_string()));
        } else if !(heat[0] < heat[1] && heat[1] < heat[2]) {
            problems.push((
                "thresholds.heat",
                format!(
                    "heat bounds must ascend: {} < {} < {}",
                    heat[0], heat[1], heat[2]
                ),
            ));
        }
        if self.pm25_moderate >= self.pm25_unhealthy {
            problems.push((
                "thresholds.pm25_unhealthy",
                format!(
                    "must exceed pm25_moderate ({} >= {})",
                    self.pm25_moderate, self.pm25_unhealthy
                ),
            ));
        }
        if self.medium_score == 0 || self.medium_score >= self.high_score {
            problems.push((
                "thresholds.medium_score",
                format!(
                    "must be between 1 and high_score - 1 (got {}, high_score {})",
                    self.medium_score, self.high_score
                ),
            ));
        }
        problems
    }
}

/// Classifier turning derived readings into a [`RiskLevel`].
#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    thresholds: RiskThresholds,
}

impl RiskClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// Get the thresholds.
    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Additive hazard score.
    pub fn score(&self, heat_index: f64, pm25: u32, uv_index: u32) -> u8 {
        let t = &self.thresholds;
        let heat = if heat_index > t.heat_danger_c {
            3
        } else if heat_index > t.heat_warning_c {
            2
        } else if heat_index > t.heat_caution_c {
            1
        } else {
            0
        };
        let particulates = if pm25 > t.pm25_unhealthy {
            2
        } else if pm25 > t.pm25_moderate {
            1
        } else {
            0
        };
        let uv = u8::from(uv_index > t.uv_very_high);
        heat + particulates + uv
    }

    /// Classify a reading's derived values.
    pub fn classify(&self, heat_index: f64, pm25: u32, uv_index: u32) -> RiskLevel {
        let score = self.score(heat_index, pm25, uv_index);
        if score >= self.thresholds.high_score {
            RiskLevel::High
        } else if score >= self.thresholds.medium_score {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Classify using the default thresholds.
pub fn classify(heat_index: f64, pm25: u32, uv_index: u32) -> RiskLevel {
    RiskClassifier::default().classify(heat_index, pm25, uv_index)
}
