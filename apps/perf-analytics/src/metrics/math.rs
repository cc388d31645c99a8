//! Statistical math utilities for performance metric calculations.

use super::constants::STD_DEV_TOLERANCE;
use super::types::{ColumnSummary, LinearFit};

/// Calculate mean of a slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

/// Calculate sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let avg = mean(values)?;
    let variance_sum: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    let variance = variance_sum / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

/// True when `spread` is rounding residue rather than real variation, judged
/// against the largest magnitude in `values`.
///
/// A constant series such as `[0.1; 10]` leaves deviations around `1e-17`
/// from its computed mean; those count as zero. An all-zero series is
/// degenerate; `[1e-20, -1e-20]` is not.
pub fn is_degenerate(values: &[f64], spread: f64) -> bool {
    let magnitude = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    spread <= STD_DEV_TOLERANCE * magnitude
}

/// Root of the population variance from a sum of squared deviations.
fn rms(sum_sq: f64, n: usize) -> f64 {
    (sum_sq / n as f64).sqrt()
}

/// Pearson correlation coefficient of two equally sized slices.
///
/// Returns `None` for fewer than two points, mismatched lengths, or when
/// either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let n = xs.len();
    if is_degenerate(xs, rms(var_x, n)) || is_degenerate(ys, rms(var_y, n)) {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Ordinary least-squares fit of `ys` on `xs`.
///
/// Returns `None` when `xs` has zero variance or the slices are unusable.
pub fn least_squares(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }

    if is_degenerate(xs, rms(sxx, xs.len())) {
        return None;
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Linear-interpolated percentile of an ascending slice (`p` in `[0, 1]`).
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Descriptive statistics of a column (count, mean, std, quartiles, extrema).
///
/// Returns `None` for an empty column. `std` is `None` for a single value.
pub fn describe(values: &[f64]) -> Option<ColumnSummary> {
    let mean = mean(values)?;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Some(ColumnSummary {
        count: values.len(),
        mean,
        std: std_dev(values),
        min: sorted[0],
        p25: percentile(&sorted, 0.25)?,
        median: percentile(&sorted, 0.5)?,
        p75: percentile(&sorted, 0.75)?,
        max: sorted[sorted.len() - 1],
    })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10.0, 20.0, 30.0, 40.0]), Some(25.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        let Some(std) = std_dev(&[10.0, 20.0, 30.0, 40.0]) else {
            panic!("std_dev should succeed for four values");
        };
        // sqrt(500 / 3)
        assert!(approx(std, 12.909_944_487_358_056));
        assert_eq!(std_dev(&[1.0]), None);
    }

    #[test]
    fn test_std_dev_constant_is_zero() {
        assert_eq!(std_dev(&[0.0, 0.0, 0.0]), Some(0.0));
    }

    #[test]
    fn test_pearson_perfect() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        assert!(approx(pearson(&xs, &ys).unwrap(), 1.0));

        let inverted = [8.0, 6.0, 4.0, 2.0];
        assert!(approx(pearson(&xs, &inverted).unwrap(), -1.0));
    }

    #[test]
    fn test_pearson_undefined() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
    }

    #[test_case(&[0.1; 10] ; "tenths")]
    #[test_case(&[0.3; 7] ; "three tenths")]
    #[test_case(&[1e-13; 5] ; "tiny constant")]
    #[test_case(&[-2.7; 4] ; "negative constant")]
    fn test_constant_series_has_no_correlation(xs: &[f64]) {
        let ys: Vec<f64> = (0..xs.len()).map(|i| i as f64).collect();
        assert_eq!(pearson(xs, &ys), None);
        assert_eq!(pearson(&ys, xs), None);
        assert!(least_squares(xs, &ys).is_none());
    }

    #[test]
    fn test_small_scale_variation_is_kept() {
        let xs = [1e-14, -1e-14, 2e-14, -2e-14];
        let ys = [1.0, -1.0, 2.0, -2.0];
        assert!(approx(pearson(&xs, &ys).unwrap(), 1.0));
        assert!(least_squares(&xs, &ys).is_some());
        assert!(!is_degenerate(&[1e-20, -1e-20], 1e-20));
        assert!(is_degenerate(&[0.0, 0.0], 0.0));
    }

    #[test]
    fn test_least_squares() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let Some(fit) = least_squares(&xs, &ys) else {
            panic!("fit should succeed");
        };
        assert!(approx(fit.slope, 2.0));
        assert!(approx(fit.intercept, 1.0));
        assert!(least_squares(&[2.0, 2.0], &[1.0, 5.0]).is_none());
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&sorted, 0.5), Some(2.5));
        assert_eq!(percentile(&sorted, 0.25), Some(1.75));
        assert_eq!(percentile(&sorted, 1.0), Some(4.0));
    }

    #[test]
    fn test_describe() {
        let Some(summary) = describe(&[4.0, 1.0, 3.0, 2.0]) else {
            panic!("describe should succeed");
        };
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.median, 2.5);
        assert!(summary.std.is_some());
        assert!(describe(&[]).is_none());
    }
}
