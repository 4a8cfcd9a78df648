//! Risk transition detection.
//!
//! The watcher compares the risk level of the two most recent readings in a
//! [`HistoryWindow`]. It only detects; dispatching a user-visible
//! notification is left to a [`NotificationSink`](crate::NotificationSink).

use serde::Serialize;

use heatwatch_types::RiskLevel;

use crate::history::HistoryWindow;
use crate::readings::Reading;

/// A change of risk level between consecutive readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionEvent {
    /// Level of the second-to-last reading.
    pub from: RiskLevel,
    /// Level of the latest reading.
    pub to: RiskLevel,
    /// The reading that caused the transition.
    pub at_reading: Reading,
}

impl TransitionEvent {
    /// Whether the risk went up.
    pub fn is_escalation(&self) -> bool {
        self.to > self.from
    }

    /// Short notification title.
    pub fn title(&self) -> String {
        if self.is_escalation() {
            format!("Risk rising: {}", self.to)
        } else {
            format!("Risk easing: {}", self.to)
        }
    }

    /// Notification body with the triggering reading.
    pub fn body(&self) -> String {
        let r = &self.at_reading;
        format!(
            "Risk changed from {} to {}. Heat index {:.1}°C, PM2.5 {} µg/m³, UV {}. {}.",
            self.from,
            self.to,
            r.heat_index(),
            r.pm25(),
            r.uv_index(),
            self.to.action()
        )
    }
}

/// Detector for risk level changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskTransitionWatcher;

impl RiskTransitionWatcher {
    /// Create a new watcher.
    pub fn new() -> Self {
        Self
    }

    /// Check the two most recent readings for a level change.
    ///
    /// Returns `None` when fewer than two readings exist or the level is
    /// unchanged.
    pub fn check(&self, history: &HistoryWindow) -> Option<TransitionEvent> {
        let previous = history.previous()?;
        let latest = history.latest()?;
        (previous.risk_level() != latest.risk_level()).then(|| TransitionEvent {
            from: previous.risk_level(),
            to: latest.risk_level(),
            at_reading: latest.clone(),
        })
    }
}
