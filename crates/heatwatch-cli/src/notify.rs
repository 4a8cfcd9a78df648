//! Notification sinks for watch mode.

use std::sync::Arc;

use heatwatch_core::{NotificationPermission, NotificationSink};
#[cfg(feature = "desktop-notifications")]
use heatwatch_types::RiskLevel;

/// Desktop notification through the platform notification service.
#[cfg(feature = "desktop-notifications")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopSink;

/// Urgency of a desktop notification about `level`.
#[cfg(all(feature = "desktop-notifications", target_os = "linux"))]
fn urgency(level: RiskLevel) -> notify_rust::Urgency {
    match level {
        RiskLevel::High => notify_rust::Urgency::Critical,
        RiskLevel::Medium => notify_rust::Urgency::Normal,
        RiskLevel::Low => notify_rust::Urgency::Low,
    }
}

#[cfg(feature = "desktop-notifications")]
impl NotificationSink for DesktopSink {
    fn notify(&self, level: RiskLevel, title: &str, body: &str) {
        use notify_rust::Notification;

        let mut notification = Notification::new();
        notification.summary(title).body(body).appname("Heatwatch");

        #[cfg(target_os = "linux")]
        notification.urgency(urgency(level));
        #[cfg(not(target_os = "linux"))]
        let _ = level;

        match notification.show() {
            Ok(_) => tracing::debug!("Notification sent: {} - {}", title, body),
            Err(e) => tracing::warn!("Failed to send notification: {}", e),
        }
    }
}

/// The sink for this build, with the permission it implies.
///
/// Log output needs no platform grant. Desktop notifications are treated
/// as granted once the user opts in with `--notify`.
pub fn platform_sink() -> (Arc<dyn NotificationSink>, NotificationPermission) {
    #[cfg(feature = "desktop-notifications")]
    let sink: Arc<dyn NotificationSink> = Arc::new(DesktopSink);
    #[cfg(not(feature = "desktop-notifications"))]
    let sink: Arc<dyn NotificationSink> = Arc::new(heatwatch_core::LogSink);

    (sink, NotificationPermission::Granted)
}
