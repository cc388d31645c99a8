//! Configuration for the report generator and the live dashboard.
//!
//! Provides YAML loading, environment variable interpolation and validation.
//! Every section is optional; an absent section takes its defaults.
//!
//! # Usage
//!
//! ```rust,ignore
//! use perf_analytics::config::load_config;
//!
//! // Built-in defaults
//! let config = load_config(None)?;
//!
//! // From a file
//! let config = load_config(Some("perf.yaml"))?;
//! println!("window: {}", config.metrics.window);
//! ```

mod dashboard;
mod metrics;
mod observability;
mod report;
mod source;

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorCode;

pub use dashboard::DashboardConfig;
pub use metrics::MetricsConfig;
pub use observability::{LOG_FORMATS, LoggingConfig, ObservabilityConfig};
pub use report::ReportConfig;
pub use source::SourceConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

impl ConfigError {
    /// Error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidConfig
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Record source.
    #[serde(default)]
    pub source: SourceConfig,
    /// Calculator parameters.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Static report output.
    #[serde(default)]
    pub report: ReportConfig,
    /// Live dashboard.
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

pub(crate) const fn default_true() -> bool {
    true
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// `None` yields the validated built-in defaults.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        let config = Config::default();
        validate_config(&config)?;
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    let config = load_config_from_string(&contents)?;
    tracing::debug!(path, "Loaded configuration");
    Ok(config)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. An unset or empty
/// variable without a default becomes the empty string.
#[allow(clippy::expect_used)] // Pattern is a literal
fn interpolate_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: OnceLock<Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match std::env::var(&caps[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.source.path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "source.path must not be empty".to_string(),
        ));
    }

    config
        .metrics
        .to_params()
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("metrics: {e}")))?;

    if !config.report.inventory_limit.is_finite() || config.report.inventory_limit <= 0.0 {
        return Err(ConfigError::ValidationError(
            "report.inventory_limit must be positive".to_string(),
        ));
    }

    if !config.report.target_sharpe.is_finite() {
        return Err(ConfigError::ValidationError(
            "report.target_sharpe must be finite".to_string(),
        ));
    }

    if config.dashboard.refresh_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "dashboard.refresh_interval_ms must be positive".to_string(),
        ));
    }

    let format = config.observability.logging.format.as_str();
    if !LOG_FORMATS.contains(&format) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {LOG_FORMATS:?}"
        )));
    }

    Ok(())
}
