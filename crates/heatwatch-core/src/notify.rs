//! Notification gating.
//!
//! Whether a detected transition becomes a user-visible notification depends
//! on a caller-controlled switch and on the platform's permission state. Both
//! are explicit inputs here so the decision is a pure function.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use heatwatch_types::RiskLevel;

use crate::traits::NotificationSink;

/// Platform permission to show notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPermission {
    /// The user allowed notifications.
    Granted,
    /// The user refused notifications.
    Denied,
    /// Permission has not been requested yet.
    #[default]
    Unknown,
}

/// Caller switch plus permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationPolicy {
    /// Whether the user turned alerts on.
    pub enabled: bool,
    /// Current platform permission.
    pub permission: NotificationPermission,
}

impl NotificationPolicy {
    /// Alerts on with permission granted.
    pub fn granted() -> Self {
        Self {
            enabled: true,
            permission: NotificationPermission::Granted,
        }
    }

    /// Alerts off.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether a transition should be dispatched to the sink.
    pub fn should_notify(&self) -> bool {
        self.enabled && self.permission == NotificationPermission::Granted
    }
}

/// Sink that writes notifications to the log.
///
/// High risk is logged as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, level: RiskLevel, title: &str, body: &str) {
        if level == RiskLevel::High {
            warn!(%level, title, body, "notification");
        } else {
            info!(%level, title, body, "notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_requires_switch_and_permission() {
        use NotificationPermission::*;
        for (enabled, permission, expected) in [
            (true, Granted, true),
            (true, Denied, false),
            (true, Unknown, false),
            (false, Granted, false),
            (false, Denied, false),
        ] {
            let policy = NotificationPolicy {
                enabled,
                permission,
            };
            assert_eq!(policy.should_notify(), expected, "{policy:?}");
        }
    }

    #[test]
    fn test_presets() {
        assert!(NotificationPolicy::granted().should_notify());
        assert!(!NotificationPolicy::disabled().should_notify());
    }
}
