//! Explicitly constructed dashboard context.
//!
//! Owns everything a refresh needs. There is no process-wide instance: the
//! binary builds one and hands an `Arc` to the poller and the server.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use perf_analytics::charts::ChartOptions;
use perf_analytics::config::Config;
use perf_analytics::{
    AnalyticsError, CsvRecordSource, ErrorCode, PerformanceCalculator, PerformanceSnapshot,
    RecordSource, SourceError,
};

/// A failed refresh.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The source could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The calculator rejected the records.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

impl RefreshError {
    /// Error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Source(e) => e.code(),
            Self::Analytics(e) => e.code(),
        }
    }
}

/// Configuration, record source and calculator for one dashboard.
pub struct DashboardContext {
    config: Config,
    source: Arc<dyn RecordSource>,
    calculator: PerformanceCalculator,
}

impl std::fmt::Debug for DashboardContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardContext")
            .field("source", &self.source.describe())
            .field("calculator", &self.calculator)
            .finish_non_exhaustive()
    }
}

impl DashboardContext {
    /// Build a context over an arbitrary record source.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the metric parameters are out of range.
    pub fn new(config: Config, source: Arc<dyn RecordSource>) -> Result<Self, AnalyticsError> {
        let calculator = PerformanceCalculator::new(config.metrics.to_params())?;
        Ok(Self {
            config,
            source,
            calculator,
        })
    }

    /// Build a context reading the CSV named by `source.path`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the metric parameters are out of range.
    pub fn from_config(config: Config) -> Result<Self, AnalyticsError> {
        let source = Arc::new(CsvRecordSource::new(&config.source.path));
        Self::new(config, source)
    }

    /// Re-read the source and recompute the snapshot. Blocking.
    ///
    /// # Errors
    ///
    /// Returns `RefreshError` when loading or computing fails.
    pub fn refresh(&self) -> Result<PerformanceSnapshot, RefreshError> {
        let records = self.source.load()?;
        Ok(self.calculator.compute(&records)?)
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Description of the record source.
    #[must_use]
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Poll cadence.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        self.config.dashboard.refresh_interval()
    }

    /// Chart guides from the report section.
    #[must_use]
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions::from(&self.config.report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use perf_analytics::PeriodRecord;

    use super::*;

    struct FixedSource(Vec<PeriodRecord>);

    impl RecordSource for FixedSource {
        fn load(&self) -> Result<Vec<PeriodRecord>, SourceError> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    fn records(returns: &[f64]) -> Vec<PeriodRecord> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        returns
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                PeriodRecord::new(start + chrono::Duration::minutes(i as i64), r, 0.0, 0.05)
            })
            .collect()
    }

    #[test]
    fn test_refresh_computes_snapshot() {
        let source = Arc::new(FixedSource(records(&[0.01, -0.02, 0.015, 0.005, -0.01])));
        let context = DashboardContext::new(Config::default(), source).unwrap();

        let snapshot = context.refresh().unwrap();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(context.source_description(), "fixed");
    }

    #[test]
    fn test_refresh_reports_calculator_error() {
        let context = DashboardContext::new(Config::default(), Arc::new(FixedSource(Vec::new())))
            .unwrap();

        let err = context.refresh().unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let mut config = Config::default();
        config.source.path = "/nonexistent/perf.csv".to_string();
        let context = DashboardContext::from_config(config).unwrap();

        let err = context.refresh().unwrap_err();
        assert_eq!(err.code(), ErrorCode::SourceUnavailable);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut config = Config::default();
        config.metrics.window = 0;
        assert!(DashboardContext::new(config, Arc::new(FixedSource(Vec::new()))).is_err());
    }
}
