//! Rolling series operations over period records.
//!
//! Each function validates its input and recomputes from scratch. Indices
//! inside the warm-up period (`i < window`) are defined as zero.

use crate::domain::{PeriodRecord, validate_records};
use crate::error::{AnalyticsError, AnalyticsResult};

use super::constants::HUNDRED;
use super::math::{is_degenerate, least_squares, mean, pearson, std_dev};
use super::types::{HistogramBin, LinearFit};

pub(crate) fn validate_window(window: usize) -> AnalyticsResult<()> {
    if window == 0 {
        return Err(AnalyticsError::invalid_input("window must be positive"));
    }
    Ok(())
}

pub(crate) fn validate_positive(name: &str, value: f64) -> AnalyticsResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AnalyticsError::invalid_input(format!(
            "{name} must be a positive finite number, got {value}"
        )));
    }
    Ok(())
}

fn returns_of(records: &[PeriodRecord]) -> Vec<f64> {
    records.iter().map(|r| r.return_value).collect()
}

/// Running sum of `return_value * notional`.
///
/// The output has the input's length and satisfies
/// `cum[i] == cum[i - 1] + return_value[i] * notional`.
pub fn cumulative_pnl(records: &[PeriodRecord], notional: f64) -> AnalyticsResult<Vec<f64>> {
    validate_records(records)?;
    validate_positive("notional", notional)?;

    let mut total = 0.0;
    Ok(records
        .iter()
        .map(|r| {
            total += r.return_value * notional;
            total
        })
        .collect())
}

/// Annualized Sharpe of `returns[i - window..i]` at each `i >= window`.
///
/// A window whose standard deviation is zero (or undefined for a one-period
/// window) yields exactly `0.0`.
pub fn rolling_sharpe(
    records: &[PeriodRecord],
    window: usize,
    annualization: f64,
) -> AnalyticsResult<Vec<f64>> {
    validate_records(records)?;
    validate_window(window)?;
    validate_positive("annualization", annualization)?;

    let returns = returns_of(records);
    let scale = annualization.sqrt();
    let mut sharpe = vec![0.0; returns.len()];

    for i in window..returns.len() {
        sharpe[i] = window_sharpe(&returns[i - window..i], scale);
    }

    Ok(sharpe)
}

fn window_sharpe(returns: &[f64], scale: f64) -> f64 {
    let (Some(avg), Some(std)) = (mean(returns), std_dev(returns)) else {
        return 0.0;
    };
    if is_degenerate(returns, std) {
        return 0.0;
    }
    avg / std * scale
}

/// Drawdown of cumulative P&L from the peak of `cum[i - window..=i]`, in percent.
///
/// The ratio is scale-free, so cumulative P&L is taken at unit notional. A
/// zero peak yields `0.0`.
pub fn rolling_drawdown(records: &[PeriodRecord], window: usize) -> AnalyticsResult<Vec<f64>> {
    validate_window(window)?;
    let cum = cumulative_pnl(records, 1.0)?;
    let mut drawdown = vec![0.0; cum.len()];

    for i in window..cum.len() {
        let peak = cum[i - window..=i]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        drawdown[i] = if peak == 0.0 {
            0.0
        } else {
            (cum[i] - peak) / peak * HUNDRED
        };
    }

    Ok(drawdown)
}

/// Percentage of records with a positive return, in `[0, 100]`.
pub fn win_rate(records: &[PeriodRecord]) -> AnalyticsResult<f64> {
    validate_records(records)?;

    let winners = records.iter().filter(|r| r.is_winner()).count();
    Ok(winners as f64 * HUNDRED / records.len() as f64)
}

/// Autocorrelation of returns for lags `0..max_lag`.
///
/// Lag 0 is `1.0`; lag `k` is the Pearson correlation of `r[0..n-k]` with
/// `r[k..n]`. A lag whose correlation is undefined fails the whole call.
pub fn autocorrelation(records: &[PeriodRecord], max_lag: usize) -> AnalyticsResult<Vec<f64>> {
    validate_records(records)?;

    let n = records.len();
    if max_lag == 0 {
        return Err(AnalyticsError::invalid_input("max_lag must be positive"));
    }
    if max_lag >= n {
        return Err(AnalyticsError::invalid_input(format!(
            "max_lag ({max_lag}) must be less than the number of records ({n})"
        )));
    }

    let returns = returns_of(records);
    let mut acf = Vec::with_capacity(max_lag);
    acf.push(1.0);

    for lag in 1..max_lag {
        let head = &returns[..n - lag];
        let tail = &returns[lag..];
        let value = pearson(head, tail).ok_or_else(|| {
            AnalyticsError::computation(format!(
                "autocorrelation at lag {lag} is undefined (overlap of {} points with zero variance)",
                n - lag
            ))
        })?;
        acf.push(value);
    }

    Ok(acf)
}

/// Pearson correlation of two series.
pub fn correlation(xs: &[f64], ys: &[f64]) -> AnalyticsResult<f64> {
    if xs.len() != ys.len() {
        return Err(AnalyticsError::invalid_input(format!(
            "series lengths differ ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    pearson(xs, ys).ok_or_else(|| {
        AnalyticsError::computation("correlation is undefined for fewer than two points or zero variance")
    })
}

/// Least-squares fit of `ys` on `xs`.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> AnalyticsResult<LinearFit> {
    if xs.len() != ys.len() {
        return Err(AnalyticsError::invalid_input(format!(
            "series lengths differ ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    least_squares(xs, ys).ok_or_else(|| {
        AnalyticsError::computation("linear fit is undefined when x has zero variance")
    })
}

/// Equal-width, density-normalized histogram of returns.
///
/// When every return is identical the range is widened to `value ± 0.5`.
pub fn return_histogram(records: &[PeriodRecord], bins: usize) -> AnalyticsResult<Vec<HistogramBin>> {
    validate_records(records)?;
    if bins == 0 {
        return Err(AnalyticsError::invalid_input("histogram bins must be positive"));
    }

    let returns = returns_of(records);
    let mut lo = returns.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for r in &returns {
        let idx = (((r - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let total = returns.len() as f64;
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: (i as f64).mul_add(width, lo),
            upper: ((i + 1) as f64).mul_add(width, lo),
            count,
            density: count as f64 / (total * width),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use test_case::test_case;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap()
    }

    fn records(returns: &[f64]) -> Vec<PeriodRecord> {
        returns
            .iter()
            .enumerate()
            .map(|(i, r)| PeriodRecord::new(start() + Duration::minutes(i as i64), *r, 0.0, 0.05))
            .collect()
    }

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    const SCENARIO: [f64; 5] = [0.01, -0.02, 0.015, 0.005, -0.01];

    #[test]
    fn test_cumulative_pnl_scenario() {
        let cum = cumulative_pnl(&records(&SCENARIO), 1.0).unwrap();
        let expected = [0.01, -0.01, 0.005, 0.01, 0.0];
        assert_eq!(cum.len(), expected.len());
        for (got, want) in cum.iter().zip(expected) {
            assert!(approx(*got, want, 1e-12), "got {got}, want {want}");
        }
    }

    #[test]
    fn test_cumulative_pnl_scaled_by_notional() {
        let cum = cumulative_pnl(&records(&SCENARIO), 10_000.0).unwrap();
        assert_eq!(cum[0], 0.01 * 10_000.0);
        for i in 1..cum.len() {
            assert_eq!(cum[i], cum[i - 1] + SCENARIO[i] * 10_000.0);
        }
    }

    #[test]
    fn test_rolling_sharpe_scenario() {
        let sharpe = rolling_sharpe(&records(&SCENARIO), 2, 1.0).unwrap();
        assert_eq!(sharpe[0], 0.0);
        assert_eq!(sharpe[1], 0.0);
        // mean -0.005, sample stdev 0.0212132...
        assert!(approx(sharpe[2], -0.235_702, 1e-5), "got {}", sharpe[2]);
    }

    #[test]
    fn test_rolling_sharpe_annualization_scales_by_sqrt() {
        let base = rolling_sharpe(&records(&SCENARIO), 2, 1.0).unwrap();
        let annual = rolling_sharpe(&records(&SCENARIO), 2, 4.0).unwrap();
        for (b, a) in base.iter().zip(&annual) {
            assert!(approx(*a, b * 2.0, 1e-12));
        }
    }

    #[test]
    fn test_rolling_sharpe_zero_returns() {
        let sharpe = rolling_sharpe(&records(&[0.0; 40]), 30, 390.0 * 252.0).unwrap();
        assert!(sharpe.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_rolling_sharpe_single_period_window_is_zero() {
        let sharpe = rolling_sharpe(&records(&SCENARIO), 1, 1.0).unwrap();
        assert!(sharpe.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_rolling_drawdown_scenario() {
        let dd = rolling_drawdown(&records(&SCENARIO), 2).unwrap();
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        // window cum[0..=2] = [0.01, -0.01, 0.005], peak 0.01
        assert!(approx(dd[2], -50.0, 1e-9), "got {}", dd[2]);
        // cum[2..=4] = [0.005, 0.01, 0.0], peak 0.01
        assert!(approx(dd[4], -100.0, 1e-9), "got {}", dd[4]);
    }

    #[test]
    fn test_rolling_drawdown_at_new_high_is_zero() {
        let dd = rolling_drawdown(&records(&[0.01, 0.01, 0.01, 0.01]), 2).unwrap();
        assert_eq!(dd, vec![0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rolling_drawdown_zero_peak() {
        let dd = rolling_drawdown(&records(&[0.0, 0.0, 0.0, -0.01]), 2).unwrap();
        assert!(dd.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_window_larger_than_data_is_all_warmup() {
        let recs = records(&SCENARIO);
        assert!(rolling_sharpe(&recs, 10, 1.0).unwrap().iter().all(|s| *s == 0.0));
        assert!(rolling_drawdown(&recs, 10).unwrap().iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate(&records(&SCENARIO)).unwrap(), 60.0);
        assert_eq!(win_rate(&records(&[0.0, -0.1])).unwrap(), 0.0);
        assert_eq!(win_rate(&records(&[0.1])).unwrap(), 100.0);
    }

    #[test]
    fn test_autocorrelation_lag_zero() {
        let acf = autocorrelation(&records(&SCENARIO), 3).unwrap();
        assert_eq!(acf.len(), 3);
        assert_eq!(acf[0], 1.0);
        assert!(acf.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_autocorrelation_alternating() {
        let acf = autocorrelation(&records(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0]), 3).unwrap();
        assert!(approx(acf[1], -1.0, 1e-12));
        assert!(approx(acf[2], 1.0, 1e-12));
    }

    #[test_case(5 ; "equal to length")]
    #[test_case(6 ; "greater than length")]
    #[test_case(0 ; "zero")]
    fn test_autocorrelation_invalid_max_lag(max_lag: usize) {
        let err = autocorrelation(&records(&SCENARIO), max_lag).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test_case(&[0.25; 6] ; "exact quarter")]
    #[test_case(&[0.1; 10] ; "tenths")]
    #[test_case(&[0.3; 7] ; "three tenths")]
    #[test_case(&[-0.007; 12] ; "negative constant")]
    fn test_autocorrelation_zero_variance_is_computation_error(returns: &[f64]) {
        let err = autocorrelation(&records(returns), 3).unwrap_err();
        assert!(err.is_computation());
        assert!(err.to_string().contains("lag 1"));
    }

    #[test]
    fn test_zero_window_rejected() {
        let recs = records(&SCENARIO);
        assert!(rolling_sharpe(&recs, 0, 1.0).unwrap_err().is_invalid_input());
        assert!(rolling_drawdown(&recs, 0).unwrap_err().is_invalid_input());
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(-1.0 ; "negative")]
    #[test_case(f64::NAN ; "nan")]
    fn test_invalid_annualization_rejected(annualization: f64) {
        let err = rolling_sharpe(&records(&SCENARIO), 2, annualization).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_empty_records_rejected() {
        assert!(cumulative_pnl(&[], 1.0).unwrap_err().is_invalid_input());
        assert!(win_rate(&[]).unwrap_err().is_invalid_input());
        assert!(autocorrelation(&[], 1).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_return_histogram_density_integrates_to_one() {
        let bins = return_histogram(&records(&SCENARIO), 4).unwrap();
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), SCENARIO.len());
        let area: f64 = bins.iter().map(|b| b.density * (b.upper - b.lower)).sum();
        assert!(approx(area, 1.0, 1e-9));
    }

    #[test]
    fn test_return_histogram_constant_series() {
        let bins = return_histogram(&records(&[0.0, 0.0, 0.0]), 1).unwrap();
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[0].lower, -0.5);
        assert_eq!(bins[0].upper, 0.5);
    }

    #[test_case(&[0.1; 10] ; "tenths")]
    #[test_case(&[0.3; 7] ; "three tenths")]
    fn test_constant_input_has_no_fit_or_correlation(xs: &[f64]) {
        let ys: Vec<f64> = (0..xs.len()).map(|i| i as f64 * 0.5).collect();
        assert!(correlation(xs, &ys).unwrap_err().is_computation());
        assert!(linear_fit(xs, &ys).unwrap_err().is_computation());
    }

    #[test]
    fn test_rolling_sharpe_constant_window_is_zero() {
        let sharpe = rolling_sharpe(&records(&[0.1; 8]), 3, 1.0).unwrap();
        assert!(sharpe.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_rolling_sharpe_keeps_small_scale_variance() {
        let sharpe = rolling_sharpe(&records(&[1e-13, 3e-13, 2e-13, 4e-13]), 2, 1.0).unwrap();
        // mean 2e-13, sample std sqrt(2) * 1e-13
        assert!(approx(sharpe[2], std::f64::consts::SQRT_2, 1e-9), "got {}", sharpe[2]);
    }

    #[test]
    fn test_correlation_errors() {
        assert!(correlation(&[1.0, 2.0], &[1.0]).unwrap_err().is_invalid_input());
        assert!(correlation(&[1.0, 1.0], &[1.0, 2.0]).unwrap_err().is_computation());
    }

    #[test]
    fn test_linear_fit() {
        let fit = linear_fit(&[0.0, 1.0, 2.0], &[1.0, 0.0, -1.0]).unwrap();
        assert!(approx(fit.slope, -1.0, 1e-12));
        assert!(approx(fit.intercept, 1.0, 1e-12));
    }
}
