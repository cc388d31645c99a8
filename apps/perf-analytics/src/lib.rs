// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Performance Analytics - Rust Core Library
//!
//! Deterministic rolling performance metrics for market-making simulation
//! logs.
//!
//! # Layout
//!
//! - **Domain**: `PeriodRecord` and sequence validation
//! - **Metrics**: the rolling calculator (cumulative P&L, rolling Sharpe,
//!   rolling drawdown, win rate, autocorrelation, distribution statistics)
//! - **Source**: record loading (`RecordSource`, `CsvRecordSource`)
//! - **Report**: summary text/JSON/CSV and SVG charts
//! - **Sample**: seeded synthetic session generator
//! - **Config / Telemetry**: YAML configuration and tracing setup
//!
//! The calculator is pure: every call validates its input and recomputes from
//! scratch. Everything else is glue around it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// SVG chart rendering.
pub mod charts;

/// YAML configuration.
pub mod config;

/// Period records.
pub mod domain;

/// Error taxonomy.
pub mod error;

/// Rolling performance metrics.
pub mod metrics;

/// Static report generation.
pub mod report;

/// Synthetic sample data.
pub mod sample;

/// Record sources.
pub mod source;

/// Tracing setup.
pub mod telemetry;

pub use domain::{PeriodRecord, validate_records};
pub use error::{AnalyticsError, AnalyticsResult, ErrorCode};
pub use metrics::{MetricsParams, PerformanceCalculator, PerformanceSnapshot, PerformanceSummary};
pub use source::{CsvRecordSource, RecordSource, SourceError};
