//! Constants for performance metric calculations.

/// Default rolling window, in periods.
pub const DEFAULT_WINDOW: usize = 30;

/// One-minute periods in a regular 6.5 hour equity session.
pub const PERIODS_PER_DAY: f64 = 390.0;

/// Trading days per year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Default annualization factor (periods per year).
pub const DEFAULT_ANNUALIZATION: f64 = PERIODS_PER_DAY * TRADING_DAYS_PER_YEAR;

/// Default notional multiplier converting fractional returns to currency.
pub const DEFAULT_NOTIONAL: f64 = 10_000.0;

/// Default number of autocorrelation lags (lag 0 included).
pub const DEFAULT_MAX_LAG: usize = 20;

/// Default number of return histogram bins.
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// Fraction to percent.
pub const HUNDRED: f64 = 100.0;

/// Relative tolerance for zero variance: a standard deviation at or below this
/// fraction of the largest absolute value in its series is treated as zero.
/// Being relative, it does not flatten series that are merely small in scale.
pub const STD_DEV_TOLERANCE: f64 = 1e-12;
