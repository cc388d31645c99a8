//! Prometheus metrics for the dashboard.
//!
//! Exposed at `/metrics` on the dashboard port.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `perf_dashboard_refreshes_total` | counter | `outcome` |
//! | `perf_dashboard_refresh_duration_seconds` | histogram | |
//! | `perf_dashboard_records` | gauge | |
//! | `perf_dashboard_total_pnl` | gauge | |
//! | `perf_dashboard_rolling_sharpe` | gauge | |
//! | `perf_dashboard_rolling_drawdown_pct` | gauge | |
//! | `perf_dashboard_win_rate_pct` | gauge | |
//! | `perf_dashboard_last_refresh_timestamp_seconds` | gauge | |

use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use perf_analytics::PerformanceSnapshot;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Later calls return the handle installed by the first one.
///
/// # Errors
///
/// Returns `BuildError` when another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Handle for rendering metrics, if [`init_metrics`] has run.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn register_metrics() {
    describe_counter!(
        "perf_dashboard_refreshes_total",
        "Source re-reads by outcome"
    );
    describe_histogram!(
        "perf_dashboard_refresh_duration_seconds",
        "Time to load the source and recompute all metrics"
    );

    describe_gauge!(
        "perf_dashboard_records",
        "Periods in the latest snapshot"
    );
    describe_gauge!(
        "perf_dashboard_total_pnl",
        "Final cumulative P&L of the latest snapshot"
    );
    describe_gauge!(
        "perf_dashboard_rolling_sharpe",
        "Most recent rolling Sharpe ratio"
    );
    describe_gauge!(
        "perf_dashboard_rolling_drawdown_pct",
        "Most recent rolling drawdown in percent"
    );
    describe_gauge!(
        "perf_dashboard_win_rate_pct",
        "Share of winning periods in percent"
    );
    describe_gauge!(
        "perf_dashboard_last_refresh_timestamp_seconds",
        "Unix time of the last successful refresh"
    );
}

/// Outcome label for a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot published.
    Success,
    /// Load or compute failed.
    Failure,
}

impl RefreshOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Record one refresh attempt.
pub fn record_refresh(outcome: RefreshOutcome, duration: Duration) {
    counter!(
        "perf_dashboard_refreshes_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!("perf_dashboard_refresh_duration_seconds").record(duration.as_secs_f64());
}

/// Update the snapshot gauges.
pub fn set_snapshot_gauges(snapshot: &PerformanceSnapshot, refreshed_at: DateTime<Utc>) {
    gauge!("perf_dashboard_records").set(snapshot.len() as f64);
    gauge!("perf_dashboard_total_pnl").set(snapshot.summary.total_pnl);
    gauge!("perf_dashboard_rolling_sharpe")
        .set(snapshot.rolling_sharpe.last().copied().unwrap_or(0.0));
    gauge!("perf_dashboard_rolling_drawdown_pct")
        .set(snapshot.rolling_drawdown.last().copied().unwrap_or(0.0));
    gauge!("perf_dashboard_win_rate_pct").set(snapshot.summary.win_rate_pct);
    gauge!("perf_dashboard_last_refresh_timestamp_seconds").set(refreshed_at.timestamp() as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(RefreshOutcome::Success.as_str(), "success");
        assert_eq!(RefreshOutcome::Failure.as_str(), "failure");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_refresh(RefreshOutcome::Failure, Duration::from_millis(3));
    }
}
