//! # Error Types
//!
//! Crate-level error enum. Only [`EnricherError::Configuration`] is allowed to
//! abort a run; everything else is isolated at batch or record level by the
//! orchestration layer.

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::translation::ServiceError;

#[derive(Debug, Error)]
pub enum EnricherError {
    /// Missing or invalid configuration, raised before any batch is dispatched
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Text-generation service failure (timeout, rate limit, 5xx)
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Single-record write failure in a store that is not SQL-backed
    #[error("Persistence error for record {record_id}: {message}")]
    Persistence { record_id: String, message: String },

    /// A built-in text pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Orchestration error: {0}")]
    Orchestration(String),
}

impl EnricherError {
    pub fn persistence<I: Into<String>, M: Into<String>>(record_id: I, message: M) -> Self {
        Self::Persistence {
            record_id: record_id.into(),
            message: message.into(),
        }
    }

    pub fn orchestration<M: Into<String>>(message: M) -> Self {
        Self::Orchestration(message.into())
    }

    /// Whether this error must stop the run before dispatch
    pub fn is_fatal(&self) -> bool {
        matches!(self, EnricherError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, EnricherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_errors_are_fatal() {
        let config = EnricherError::from(ConfigurationError::missing_required_field(
            "api_key",
            "text_generation",
        ));
        assert!(config.is_fatal());
        assert!(!EnricherError::persistence("abc", "timeout").is_fatal());
        assert!(!EnricherError::orchestration("worker panicked").is_fatal());
    }

    #[test]
    fn test_persistence_error_display_names_record() {
        let err = EnricherError::persistence("0xabc", "connection reset");
        assert_eq!(
            err.to_string(),
            "Persistence error for record 0xabc: connection reset"
        );
    }
}
