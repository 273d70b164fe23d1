//! # Enricher Configuration System
//!
//! YAML-based configuration with environment-specific override sections and
//! `${VAR}` expansion for credentials.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use enricher_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let run = manager.config().run.resolve(chrono::Utc::now());
//! println!("{} workers, batches of {}", run.workers, run.batch_size);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;
pub mod presets;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{MAX_BATCH_SIZE, RECOMMENDED_MAX_WORKERS};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;
pub use presets::{RunConfig, RunPreset, RunSettings};

/// Root configuration structure mirroring enricher-config.yaml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnricherConfig {
    /// Record store connection settings
    pub database: DatabaseConfig,

    /// External text-generation service
    pub text_generation: TextGenerationConfig,

    /// Prompt template overrides
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Batch-level and record-level retry policies
    #[serde(default)]
    pub retry: RetryConfig,

    /// Operator-facing run parameters
    #[serde(default)]
    pub run: RunSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Pool size for each worker's own connection pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextGenerationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    5000
}

fn default_request_timeout() -> u64 {
    120
}

impl TextGenerationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TranslationConfig {
    /// Replaces the built-in instruction template when set
    pub prompt_file: Option<PathBuf>,
    /// Replaces the built-in system message when set
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// base, 2*base, 4*base, ...
    Exponential,
    /// base, 2*base, 3*base, ...
    Linear,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryPolicyConfig {
    pub max_attempts: u32,
    pub strategy: BackoffStrategy,
    pub base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Applied to each call to the text-generation service
    #[serde(default = "default_batch_retry")]
    pub batch: RetryPolicyConfig,
    /// Applied to each single-record update
    #[serde(default = "default_record_retry")]
    pub record: RetryPolicyConfig,
}

fn default_batch_retry() -> RetryPolicyConfig {
    RetryPolicyConfig {
        max_attempts: 3,
        strategy: BackoffStrategy::Exponential,
        base_delay_ms: 1000,
    }
}

fn default_record_retry() -> RetryPolicyConfig {
    RetryPolicyConfig {
        max_attempts: 3,
        strategy: BackoffStrategy::Linear,
        base_delay_ms: 500,
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            batch: default_batch_retry(),
            record: default_record_retry(),
        }
    }
}

impl EnricherConfig {
    /// Reject configuration that must stop the run before any dispatch
    pub fn validate(&self) -> ConfigResult<()> {
        require_expanded("database.url", &self.database.url)?;
        require_expanded("text_generation.api_key", &self.text_generation.api_key)?;
        require_expanded("text_generation.endpoint", &self.text_generation.endpoint)?;

        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                "0",
                "each worker needs at least one connection",
            ));
        }

        for (name, policy) in [("retry.batch", &self.retry.batch), ("retry.record", &self.retry.record)] {
            if policy.max_attempts == 0 {
                return Err(ConfigurationError::invalid_value(
                    format!("{name}.max_attempts"),
                    "0",
                    "at least one attempt is required",
                ));
            }
        }

        self.run.validate()
    }
}

/// A credential is missing when it is empty or still an unexpanded placeholder
fn require_expanded(field: &str, value: &str) -> ConfigResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::missing_required_field(field, "configuration"));
    }
    if trimmed.starts_with("${") && trimmed.ends_with('}') {
        return Err(ConfigurationError::environment_variable_error(
            &trimmed[2..trimmed.len() - 1],
            format!("{field} is required but the variable is not set"),
        ));
    }
    Ok(())
}

impl RunSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(ConfigurationError::invalid_value(
                    "run.workers",
                    "0",
                    "worker count must be at least 1",
                ));
            }
            if workers > RECOMMENDED_MAX_WORKERS {
                tracing::warn!(
                    workers = workers,
                    recommended_max = RECOMMENDED_MAX_WORKERS,
                    "⚠️ CONFIG: High worker count may trigger service rate limits"
                );
            }
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigurationError::invalid_value(
                "run.batch_size",
                self.batch_size.to_string(),
                format!("batch size must be between 1 and {MAX_BATCH_SIZE}"),
            ));
        }

        if self.max_batches == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "run.max_batches",
                "0",
                "omit max_batches for an unbounded run",
            ));
        }

        if let (Some(start), Some(end)) = (self.window_start, self.window_end) {
            if start >= end {
                return Err(ConfigurationError::invalid_value(
                    "run.window_start",
                    start.to_rfc3339(),
                    "window start must be before window end",
                ));
            }
        }

        Ok(())
    }
}
