//! Performance calculator composing the rolling series into one snapshot.

use serde::{Deserialize, Serialize};

use crate::domain::{PeriodRecord, validate_records};
use crate::error::{AnalyticsError, AnalyticsResult};

use super::constants::{
    DEFAULT_ANNUALIZATION, DEFAULT_HISTOGRAM_BINS, DEFAULT_MAX_LAG, DEFAULT_NOTIONAL,
    DEFAULT_WINDOW,
};
use super::math::{describe, least_squares, mean, pearson, std_dev};
use super::series::{
    autocorrelation, cumulative_pnl, return_histogram, rolling_drawdown, rolling_sharpe,
    validate_positive, validate_window, win_rate,
};
use super::types::{ColumnStatistics, ColumnSummary, PerformanceSnapshot, PerformanceSummary};

/// Parameters for a performance computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsParams {
    /// Rolling window length in periods.
    pub window: usize,
    /// Periods per year used to annualize the Sharpe ratio.
    pub annualization: f64,
    /// Multiplier converting fractional returns into currency.
    pub notional: f64,
    /// Number of autocorrelation lags (lag 0 included).
    pub max_lag: usize,
    /// Number of return histogram bins.
    pub histogram_bins: usize,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            annualization: DEFAULT_ANNUALIZATION,
            notional: DEFAULT_NOTIONAL,
            max_lag: DEFAULT_MAX_LAG,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl MetricsParams {
    /// Check every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first offending parameter.
    pub fn validate(&self) -> AnalyticsResult<()> {
        validate_window(self.window)?;
        validate_positive("annualization", self.annualization)?;
        validate_positive("notional", self.notional)?;
        if self.max_lag == 0 {
            return Err(AnalyticsError::invalid_input("max_lag must be positive"));
        }
        if self.histogram_bins == 0 {
            return Err(AnalyticsError::invalid_input("histogram bins must be positive"));
        }
        Ok(())
    }
}

/// Stateless calculator producing a [`PerformanceSnapshot`] per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceCalculator {
    params: MetricsParams,
}

impl PerformanceCalculator {
    /// Create a calculator with validated parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when a parameter is out of range.
    pub fn new(params: MetricsParams) -> AnalyticsResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters used by this calculator.
    #[must_use]
    pub const fn params(&self) -> &MetricsParams {
        &self.params
    }

    /// Compute every derived series and the headline summary.
    ///
    /// An undefined autocorrelation does not fail the snapshot; the reason is
    /// carried in `autocorrelation_error` instead.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the records violate the input contract.
    pub fn compute(&self, records: &[PeriodRecord]) -> AnalyticsResult<PerformanceSnapshot> {
        validate_records(records)?;
        let p = &self.params;

        let cum = cumulative_pnl(records, p.notional)?;
        let sharpe = rolling_sharpe(records, p.window, p.annualization)?;
        let drawdown = rolling_drawdown(records, p.window)?;
        let histogram = return_histogram(records, p.histogram_bins)?;

        let (acf, acf_error) = match autocorrelation(records, p.max_lag) {
            Ok(values) => (Some(values), None),
            Err(e) => {
                tracing::debug!(error = %e, max_lag = p.max_lag, "Autocorrelation unavailable");
                (None, Some(e.to_string()))
            }
        };

        let returns: Vec<f64> = records.iter().map(|r| r.return_value).collect();
        let inventory: Vec<f64> = records.iter().map(|r| r.inventory).collect();
        let spread: Vec<f64> = records.iter().map(|r| r.spread).collect();

        let column_stats = ColumnStatistics {
            returns: summarize_column(&returns)?,
            inventory: summarize_column(&inventory)?,
            spread: summarize_column(&spread)?,
        };

        let summary = self.summarize(records, &cum, &sharpe, &drawdown)?;

        tracing::debug!(
            periods = records.len(),
            window = p.window,
            total_pnl = summary.total_pnl,
            "Computed performance snapshot"
        );

        Ok(PerformanceSnapshot {
            params: *p,
            timestamps: records.iter().map(|r| r.timestamp).collect(),
            returns,
            inventory,
            spread,
            cumulative_pnl: cum,
            rolling_sharpe: sharpe,
            rolling_drawdown: drawdown,
            autocorrelation: acf,
            autocorrelation_error: acf_error,
            return_histogram: histogram,
            column_stats,
            summary,
        })
    }

    fn summarize(
        &self,
        records: &[PeriodRecord],
        cum: &[f64],
        sharpe: &[f64],
        drawdown: &[f64],
    ) -> AnalyticsResult<PerformanceSummary> {
        let window = self.params.window;
        let post_sharpe = sharpe.get(window..).unwrap_or(&[]);
        let post_drawdown = drawdown.get(window..).unwrap_or(&[]);

        let returns: Vec<f64> = records.iter().map(|r| r.return_value).collect();
        let inventory: Vec<f64> = records.iter().map(|r| r.inventory).collect();
        let spreads: Vec<f64> = records.iter().map(|r| r.spread).collect();
        let abs_inventory: Vec<f64> = inventory.iter().map(|v| v.abs()).collect();

        Ok(PerformanceSummary {
            total_pnl: cum.last().copied().unwrap_or(0.0),
            peak_pnl: cum.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg_sharpe: mean(post_sharpe).unwrap_or(0.0),
            max_drawdown_pct: post_drawdown
                .iter()
                .copied()
                .reduce(f64::min)
                .unwrap_or(0.0),
            win_rate_pct: win_rate(records)?,
            avg_spread: mean(&spreads).unwrap_or(0.0),
            max_abs_inventory: abs_inventory.iter().copied().fold(0.0, f64::max),
            total_periods: records.len(),
            return_mean: mean(&returns).unwrap_or(0.0),
            return_std: std_dev(&returns),
            inventory_return_fit: least_squares(&inventory, &returns),
            spread_inventory_correlation: pearson(&spreads, &abs_inventory),
        })
    }
}

fn summarize_column(values: &[f64]) -> AnalyticsResult<ColumnSummary> {
    describe(values).ok_or_else(|| AnalyticsError::invalid_input("column is empty"))
}
