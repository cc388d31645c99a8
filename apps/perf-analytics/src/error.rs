//! Error taxonomy for performance analytics.
//!
//! Two failure classes are surfaced by the calculator:
//!
//! | Code | Meaning | HTTP |
//! |------|---------|------|
//! | `INVALID_INPUT` | Malformed or insufficient input (ordering, empty, bad params) | 400 |
//! | `COMPUTATION_ERROR` | Statistic is mathematically undefined for the input | 422 |
//!
//! Degenerate cases with a defined policy (zero stdev in Sharpe, zero peak in
//! drawdown) return `0` and never produce an error.
//!
//! The remaining codes classify errors raised by the glue around the
//! calculator (record source, configuration, report output, worker tasks) so
//! that callers such as the dashboard can report them uniformly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes shared by the analytics crate and its consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed or insufficient calculator input.
    InvalidInput,
    /// A statistic is undefined for the given input.
    ComputationError,
    /// The record source could not be read.
    SourceUnavailable,
    /// The record source was readable but malformed.
    MalformedSource,
    /// Configuration could not be loaded or failed validation.
    InvalidConfig,
    /// Report output could not be serialized or written.
    OutputError,
    /// A worker task panicked or was cancelled.
    InternalError,
}

impl ErrorCode {
    /// Stable reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::ComputationError => "COMPUTATION_ERROR",
            Self::SourceUnavailable => "SOURCE_UNAVAILABLE",
            Self::MalformedSource => "MALFORMED_SOURCE",
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::OutputError => "OUTPUT_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code used when this error crosses an HTTP boundary.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::MalformedSource => 400,
            Self::ComputationError => 422,
            Self::SourceUnavailable => 503,
            Self::InvalidConfig | Self::OutputError | Self::InternalError => 500,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Errors raised by the metrics calculator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// Input violates the calculator contract. Never recovered silently.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },

    /// The requested statistic is undefined for this input.
    #[error("computation error: {message}")]
    Computation {
        /// Why the statistic could not be computed.
        message: String,
    },
}

impl AnalyticsError {
    /// Build an `InvalidInput` error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Build a `Computation` error.
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }

    /// Error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::Computation { .. } => ErrorCode::ComputationError,
        }
    }

    /// Check if this is an input validation failure.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Check if this is a computation failure.
    #[must_use]
    pub const fn is_computation(&self) -> bool {
        matches!(self, Self::Computation { .. })
    }
}

/// Result alias for calculator operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
