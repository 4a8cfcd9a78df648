//! Error types for heatwatch-core.
//!
//! Every error is terminal for a single pipeline run only. A failed run never
//! touches the rolling history, so the next successful run proceeds normally.
//!
//! # Error Classification
//!
//! | Error Type | Strategy | Rationale |
//! |------------|----------|-----------|
//! | [`Error::Provider`] without status | Retry with backoff | Network failure, often transient |
//! | [`Error::Provider`] with 429 or 5xx | Retry with backoff | Upstream overloaded |
//! | [`Error::Provider`] with other 4xx | Do not retry | Bad token or request |
//! | [`Error::MalformedPayload`] | Do not retry | Upstream reported failure or sent garbage |
//! | [`Error::NoLocation`] | Do not retry | Select a location first |
//! | [`Error::LocationNotFound`] | Do not retry | Geocoder had no match |
//! | [`Error::InvalidConfig`] | Do not retry | Fix configuration and restart |
//!
//! Missing instruments and short histories are not errors: the normalizer
//! substitutes defaults and the transition watcher returns `None`.

use thiserror::Error;

use heatwatch_types::TypeError;

/// Errors that can occur while fetching and processing readings.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The reading or geocoding provider failed (network or upstream).
    #[error("Provider error{}: {message}", status_suffix(.status))]
    Provider {
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },

    /// The provider reported a non-success status or sent an unparseable body.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A fetch was requested before any location was selected.
    #[error("No location selected")]
    NoLocation,

    /// The geocoder returned no match for a query.
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A value type could not be constructed.
    #[error(transparent)]
    Types(#[from] TypeError),
}

impl Error {
    /// Create a provider error with an HTTP status.
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::Provider {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create a provider error for a failure with no response (network, timeout).
    pub fn network(message: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }

    /// Create a malformed payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload(message.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Provider { status: None, .. } => true,
            Error::Provider {
                status: Some(code), ..
            } => *code == 429 || (500..600).contains(code),
            _ => false,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}

/// Result type alias using heatwatch-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::provider(503, "service unavailable");
        assert_eq!(
            err.to_string(),
            "Provider error (HTTP 503): service unavailable"
        );

        let err = Error::network("connection reset");
        assert_eq!(err.to_string(), "Provider error: connection reset");

        let err = Error::malformed("Invalid key");
        assert_eq!(err.to_string(), "Malformed payload: Invalid key");

        assert_eq!(Error::NoLocation.to_string(), "No location selected");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::network("timeout").is_retryable());
        assert!(Error::provider(500, "boom").is_retryable());
        assert!(Error::provider(429, "slow down").is_retryable());
        assert!(!Error::provider(401, "bad token").is_retryable());
        assert!(!Error::malformed("garbage").is_retryable());
        assert!(!Error::NoLocation.is_retryable());
    }

    #[test]
    fn test_type_error_conversion() {
        let err: Error = TypeError::UnknownRiskLevel("extreme".into()).into();
        assert!(matches!(err, Error::Types(_)));
        assert!(err.to_string().contains("extreme"));
    }
}
