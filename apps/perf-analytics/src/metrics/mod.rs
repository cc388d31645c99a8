//! Rolling performance metrics for market-making period records.
//!
//! Implements the derived analytics consumed by the report and dashboard:
//! - Cumulative P&L (scaled by a notional multiplier)
//! - Rolling Sharpe ratio (annualized, warm-up padded with zeros)
//! - Rolling drawdown (percent of the window peak)
//! - Win rate and return autocorrelation
//! - Return histogram, summary statistics and inventory/return fit
//!
//! Every operation is a pure function of its inputs: records are validated
//! on each call and nothing is cached between calls.

mod calculator;
mod constants;
mod format;
mod math;
mod series;
mod types;

pub use calculator::{MetricsParams, PerformanceCalculator};
pub use constants::{
    DEFAULT_ANNUALIZATION, DEFAULT_HISTOGRAM_BINS, DEFAULT_MAX_LAG, DEFAULT_NOTIONAL,
    DEFAULT_WINDOW, PERIODS_PER_DAY, TRADING_DAYS_PER_YEAR,
};
pub use format::{format_currency, format_pct, format_ratio};
pub use math::describe;
pub use series::{
    autocorrelation, correlation, cumulative_pnl, linear_fit, return_histogram,
    rolling_drawdown, rolling_sharpe, win_rate,
};
pub use types::{
    ColumnStatistics, ColumnSummary, HistogramBin, LinearFit, PerformanceSnapshot,
    PerformanceSummary,
};
