//! Core types for derived performance metrics.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::calculator::MetricsParams;

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Slope of the fitted line.
    pub slope: f64,
    /// Intercept of the fitted line.
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluate the fitted line at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }
}

/// One bin of a density-normalized histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Inclusive lower edge.
    pub lower: f64,
    /// Upper edge (inclusive only for the last bin).
    pub upper: f64,
    /// Number of observations in the bin.
    pub count: usize,
    /// Probability density (total area over all bins is 1).
    pub density: f64,
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Number of observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (`None` for a single observation).
    pub std: Option<f64>,
    /// Minimum.
    pub min: f64,
    /// 25th percentile.
    pub p25: f64,
    /// Median.
    pub median: f64,
    /// 75th percentile.
    pub p75: f64,
    /// Maximum.
    pub max: f64,
}

/// Descriptive statistics for every numeric input column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    /// Per-period returns.
    pub returns: ColumnSummary,
    /// Inventory positions.
    pub inventory: ColumnSummary,
    /// Quoted spreads.
    pub spread: ColumnSummary,
}

/// Headline performance figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Final cumulative P&L (currency).
    pub total_pnl: f64,
    /// Highest cumulative P&L reached (currency).
    pub peak_pnl: f64,
    /// Mean rolling Sharpe over post-warm-up periods.
    pub avg_sharpe: f64,
    /// Worst rolling drawdown over post-warm-up periods (percent, <= 0 normally).
    pub max_drawdown_pct: f64,
    /// Percentage of periods with a positive return.
    pub win_rate_pct: f64,
    /// Mean quoted spread.
    pub avg_spread: f64,
    /// Largest absolute inventory position.
    pub max_abs_inventory: f64,
    /// Number of periods.
    pub total_periods: usize,
    /// Mean per-period return.
    pub return_mean: f64,
    /// Sample standard deviation of per-period returns.
    pub return_std: Option<f64>,
    /// Least-squares fit of return on inventory.
    pub inventory_return_fit: Option<LinearFit>,
    /// Correlation between spread and absolute inventory.
    pub spread_inventory_correlation: Option<f64>,
}

/// All derived series for one computation over a record sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Parameters used for the computation.
    pub params: MetricsParams,
    /// Period timestamps.
    pub timestamps: Vec<DateTime<Utc>>,
    /// Per-period returns.
    pub returns: Vec<f64>,
    /// Inventory per period.
    pub inventory: Vec<f64>,
    /// Spread per period.
    pub spread: Vec<f64>,
    /// Cumulative P&L scaled by the notional.
    pub cumulative_pnl: Vec<f64>,
    /// Rolling annualized Sharpe ratio (zero during warm-up).
    pub rolling_sharpe: Vec<f64>,
    /// Rolling drawdown in percent (zero during warm-up).
    pub rolling_drawdown: Vec<f64>,
    /// Return autocorrelation by lag, when defined.
    pub autocorrelation: Option<Vec<f64>>,
    /// Why autocorrelation could not be computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocorrelation_error: Option<String>,
    /// Density-normalized return histogram.
    pub return_histogram: Vec<HistogramBin>,
    /// Input column statistics.
    pub column_stats: ColumnStatistics,
    /// Headline figures.
    pub summary: PerformanceSummary,
}

impl PerformanceSnapshot {
    /// Number of periods in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the snapshot has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Slice of a post-warm-up series (empty when the window exceeds the data).
    #[must_use]
    pub fn after_warmup<'a>(&self, series: &'a [f64]) -> &'a [f64] {
        series.get(self.params.window..).unwrap_or(&[])
    }

    /// Export the per-period series to CSV.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(
            "timestamp,return,inventory,spread,cumulative_pnl,rolling_sharpe,rolling_drawdown\n",
        );

        for i in 0..self.len() {
            let _ = writeln!(
                csv,
                "{},{},{},{},{},{},{}",
                self.timestamps[i].to_rfc3339(),
                self.returns[i],
                self.inventory[i],
                self.spread[i],
                self.cumulative_pnl[i],
                self.rolling_sharpe[i],
                self.rolling_drawdown[i],
            );
        }

        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_fit_predict() {
        let fit = LinearFit {
            slope: 2.0,
            intercept: 1.0,
        };
        assert_eq!(fit.predict(3.0), 7.0);
    }
}
