//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_CAPACITY;
use crate::normalize::{InstrumentDefaults, ReadingNormalizer};
use crate::notify::{NotificationPermission, NotificationPolicy};
use crate::risk::{RiskClassifier, RiskThresholds};

/// Upper bound on `history_capacity`.
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

/// Configuration for a [`Monitor`](crate::Monitor).
///
/// Every field has a default, so an empty TOML table is a valid config.
///
/// ```
/// use heatwatch_core::config::MonitorConfig;
///
/// let config = MonitorConfig::from_toml_str("history_capacity = 48").unwrap();
/// assert_eq!(config.history_capacity, 48);
/// assert_eq!(config.defaults.pm25, 50.0);
/// config.validate().expect("valid");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Number of readings kept in the rolling window.
    pub history_capacity: usize,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Fallback values for missing instruments.
    pub defaults: InstrumentDefaults,
    /// Risk bracket boundaries.
    pub thresholds: RiskThresholds,
    /// Notification settings.
    pub notifications: NotificationConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            event_capacity: 100,
            defaults: InstrumentDefaults::default(),
            thresholds: RiskThresholds::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

/// Notification settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Dispatch notifications on risk transitions.
    pub enabled: bool,
}

impl NotificationConfig {
    /// Build a policy from this switch and the platform's permission state.
    pub fn policy(&self, permission: NotificationPermission) -> NotificationPolicy {
        NotificationPolicy {
            enabled: self.enabled,
            permission,
        }
    }
}

impl MonitorConfig {
    /// Parse from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - History capacity is between 2 and [`MAX_HISTORY_CAPACITY`]
    /// - Instrument defaults are finite
    /// - Risk brackets ascend and score cut-offs are ordered
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // A transition needs two readings in the window
        if !(2..=MAX_HISTORY_CAPACITY).contains(&self.history_capacity) {
            errors.push(ValidationError {
                field: "history_capacity".to_string(),
                message: format!(
                    "must be between 2 and {} (got {})",
                    MAX_HISTORY_CAPACITY, self.history_capacity
                ),
            });
        }

        for field in self.defaults.non_finite_fields() {
            errors.push(ValidationError {
                field: field.to_string(),
                message: "must be a finite number".to_string(),
            });
        }

        for (field, message) in self.thresholds.problems() {
            errors.push(ValidationError {
                field: field.to_string(),
                message,
            });
        }

        if self.event_capacity == 0 {
            errors.push(ValidationError {
                field: "event_capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build the normalizer described by this configuration.
    pub fn normalizer(&self) -> ReadingNormalizer {
        ReadingNormalizer::new(self.defaults, RiskClassifier::new(self.thresholds.clone()))
    }
}

/// A validation error for a specific configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., "thresholds.heat").
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    /// One or more fields failed validation.
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        MonitorConfig::default().validate().expect("default config should be valid");
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        assert_eq!(MonitorConfig::from_toml_str("").unwrap(), MonitorConfig::default());
    }

    #[test]
    fn test_nested_tables() {
        let config = MonitorConfig::from_toml_str(
            r#"
            history_capacity = 12

            [defaults]
            pm25 = 30.0

            [thresholds]
            uv_very_high = 7

            [notifications]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.history_capacity, 12);
        assert_eq!(config.defaults.pm25, 30.0);
        assert_eq!(config.defaults.temperature, 35.0);
        assert_eq!(config.thresholds.uv_very_high, 7);
        assert_eq!(config.thresholds.pm25_unhealthy, 75);
        assert!(config.notifications.enabled);
    }

    #[test]
    fn test_parse_error() {
        let err = MonitorConfig::from_toml_str("history_capacity = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let config = MonitorConfig {
            history_capacity: 1,
            event_capacity: 0,
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["history_capacity", "event_capacity"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::Validation(vec![ValidationError {
            field: "history_capacity".into(),
            message: "must be between 2 and 10000 (got 0)".into(),
        }]);
        assert!(err.to_string().contains("  - history_capacity: must be between"));
    }

    #[test]
    fn test_notification_policy_from_config() {
        let config = NotificationConfig { enabled: true };
        assert!(config.policy(NotificationPermission::Granted).should_notify());
        assert!(!config.policy(NotificationPermission::Denied).should_notify());
    }

    #[test]
    fn test_normalizer_uses_configured_defaults() {
        let mut config = MonitorConfig::default();
        config.defaults.uv_index = 10.0;
        assert_eq!(config.normalizer().defaults().uv_index, 10.0);
    }
}
