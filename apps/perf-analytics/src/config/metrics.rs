//! Calculator parameter configuration.

use serde::{Deserialize, Serialize};

use crate::metrics::{
    DEFAULT_HISTOGRAM_BINS, DEFAULT_MAX_LAG, DEFAULT_NOTIONAL, DEFAULT_WINDOW, MetricsParams,
    PERIODS_PER_DAY, TRADING_DAYS_PER_YEAR,
};

/// Metrics calculator configuration.
///
/// The annualization factor is derived as
/// `periods_per_day * trading_days_per_year`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Rolling window length in periods.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Sampling periods per trading day.
    #[serde(default = "default_periods_per_day")]
    pub periods_per_day: f64,
    /// Trading days per year.
    #[serde(default = "default_trading_days")]
    pub trading_days_per_year: f64,
    /// Notional multiplier applied to fractional returns.
    #[serde(default = "default_notional")]
    pub notional: f64,
    /// Number of autocorrelation lags.
    #[serde(default = "default_max_lag")]
    pub max_lag: usize,
    /// Number of return histogram bins.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            periods_per_day: default_periods_per_day(),
            trading_days_per_year: default_trading_days(),
            notional: default_notional(),
            max_lag: default_max_lag(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

impl MetricsConfig {
    /// Periods per year used to annualize the Sharpe ratio.
    #[must_use]
    pub fn annualization(&self) -> f64 {
        self.periods_per_day * self.trading_days_per_year
    }

    /// Calculator parameters described by this configuration.
    #[must_use]
    pub fn to_params(&self) -> MetricsParams {
        MetricsParams {
            window: self.window,
            annualization: self.annualization(),
            notional: self.notional,
            max_lag: self.max_lag,
            histogram_bins: self.histogram_bins,
        }
    }
}

const fn default_window() -> usize {
    DEFAULT_WINDOW
}

const fn default_periods_per_day() -> f64 {
    PERIODS_PER_DAY
}

const fn default_trading_days() -> f64 {
    TRADING_DAYS_PER_YEAR
}

const fn default_notional() -> f64 {
    DEFAULT_NOTIONAL
}

const fn default_max_lag() -> usize {
    DEFAULT_MAX_LAG
}

const fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}
