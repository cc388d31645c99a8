//! Property tests for the rolling metrics calculator.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use perf_analytics::PeriodRecord;
use perf_analytics::metrics::{
    autocorrelation, cumulative_pnl, rolling_drawdown, rolling_sharpe, win_rate,
};

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

fn returns_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.05f64..0.05, 1..80)
}

fn returns_and_permutation() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    returns_strategy().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
}

proptest! {
    #[test]
    fn cumulative_pnl_is_running_sum(returns in returns_strategy(), notional in 1.0f64..100_000.0) {
        let recs = records(&returns);
        let cum = cumulative_pnl(&recs, notional).unwrap();

        prop_assert_eq!(cum.len(), recs.len());
        prop_assert_eq!(cum[0], returns[0] * notional);
        for i in 1..cum.len() {
            prop_assert_eq!(cum[i], cum[i - 1] + returns[i] * notional);
        }
    }

    #[test]
    fn warmup_is_zero(returns in returns_strategy(), window in 1usize..40) {
        let recs = records(&returns);
        let sharpe = rolling_sharpe(&recs, window, 98_280.0).unwrap();
        let drawdown = rolling_drawdown(&recs, window).unwrap();

        for i in 0..window.min(recs.len()) {
            prop_assert_eq!(sharpe[i], 0.0);
            prop_assert_eq!(drawdown[i], 0.0);
        }
        prop_assert!(sharpe.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn win_rate_is_permutation_invariant((returns, shuffled) in returns_and_permutation()) {
        let original = win_rate(&records(&returns)).unwrap();
        let permuted = win_rate(&records(&shuffled)).unwrap();

        prop_assert_eq!(original, permuted);
        prop_assert!((0.0..=100.0).contains(&original));
    }

    #[test]
    fn autocorrelation_lag_zero_is_one(
        returns in prop::collection::vec(-0.05f64..0.05, 3..60),
        lag_fraction in 0.0f64..1.0,
    ) {
        let recs = records(&returns);
        let max_lag = 1 + (lag_fraction * (recs.len() - 2) as f64) as usize;

        if let Ok(acf) = autocorrelation(&recs, max_lag) {
            prop_assert_eq!(acf.len(), max_lag);
            prop_assert_eq!(acf[0], 1.0);
            prop_assert!(acf.iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn max_lag_at_or_beyond_length_is_invalid(returns in returns_strategy(), extra in 0usize..5) {
        let recs = records(&returns);
        let err = autocorrelation(&recs, recs.len() + extra).unwrap_err();
        prop_assert!(err.is_invalid_input());
    }
}

#[test]
fn rolling_metrics_depend_on_order() {
    let forward = [0.01, 0.02, 0.03, -0.05, 0.04];
    let mut reversed = forward;
    reversed.reverse();

    let sharpe_fwd = rolling_sharpe(&records(&forward), 2, 1.0).unwrap();
    let sharpe_rev = rolling_sharpe(&records(&reversed), 2, 1.0).unwrap();
    assert_ne!(sharpe_fwd, sharpe_rev);

    let dd_fwd = rolling_drawdown(&records(&forward), 2).unwrap();
    let dd_rev = rolling_drawdown(&records(&reversed), 2).unwrap();
    assert_ne!(dd_fwd, dd_rev);

    assert_eq!(
        win_rate(&records(&forward)).unwrap(),
        win_rate(&records(&reversed)).unwrap()
    );
}

#[test]
fn all_zero_returns_give_zero_sharpe() {
    let sharpe = rolling_sharpe(&records(&[0.0; 50]), 30, 98_280.0).unwrap();
    assert!(sharpe.iter().all(|v| *v == 0.0));
}

#[test]
fn identical_input_gives_identical_series() {
    let returns = [0.003, -0.001, 0.002, 0.004, -0.006, 0.001, 0.0, 0.002];
    let a = rolling_sharpe(&records(&returns), 3, 98_280.0).unwrap();
    let b = rolling_sharpe(&records(&returns), 3, 98_280.0).unwrap();
    assert_eq!(
        a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
        b.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
    );
}
