//! SVG figures built from a [`PerformanceSnapshot`].
//!
//! Rolling Sharpe and drawdown charts plot post-warm-up periods only.

mod svg;

use std::f64::consts::PI;

use chrono::{DateTime, Utc};

use crate::config::ReportConfig;
use crate::metrics::PerformanceSnapshot;

pub use svg::{Layer, Plot, escape, format_tick};

const PNL_COLOR: &str = "#2E86AB";
const SHARPE_COLOR: &str = "#A23B72";
const INVENTORY_COLOR: &str = "#F18F01";
const SPREAD_COLOR: &str = "#C73E1D";
const DRAWDOWN_COLOR: &str = "#4CAF50";
const HIST_COLOR: &str = "#87CEEB";
const LIMIT_COLOR: &str = "red";
const TARGET_COLOR: &str = "green";

const NORMAL_CURVE_POINTS: usize = 100;

/// Chart parameters not carried by the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    /// Inventory risk limit drawn as `±limit` guides.
    pub inventory_limit: f64,
    /// Target Sharpe guide.
    pub target_sharpe: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            inventory_limit: 500.0,
            target_sharpe: 2.0,
        }
    }
}

impl From<&ReportConfig> for ChartOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            inventory_limit: config.inventory_limit,
            target_sharpe: config.target_sharpe,
        }
    }
}

/// A rendered figure with the file stem it is saved under.
#[derive(Debug, Clone)]
pub struct Chart {
    /// File stem, e.g. `pnl_over_time`.
    pub name: &'static str,
    /// SVG document.
    pub svg: String,
}

/// Render every report figure. The autocorrelation chart is omitted when the
/// snapshot carries no autocorrelation.
#[must_use]
pub fn report_charts(snapshot: &PerformanceSnapshot, options: &ChartOptions) -> Vec<Chart> {
    let mut charts = vec![
        Chart {
            name: "pnl_over_time",
            svg: pnl_chart(snapshot),
        },
        Chart {
            name: "inventory_over_time",
            svg: inventory_chart(snapshot, options.inventory_limit),
        },
        Chart {
            name: "rolling_sharpe",
            svg: sharpe_chart(snapshot, options.target_sharpe),
        },
        Chart {
            name: "rolling_drawdown",
            svg: drawdown_chart(snapshot),
        },
        Chart {
            name: "spread_over_time",
            svg: spread_chart(snapshot),
        },
        Chart {
            name: "return_distribution",
            svg: return_distribution_chart(snapshot),
        },
        Chart {
            name: "inventory_vs_returns",
            svg: inventory_return_chart(snapshot),
        },
        Chart {
            name: "spread_vs_inventory",
            svg: spread_inventory_chart(snapshot),
        },
    ];

    if let Some(svg) = autocorrelation_chart(snapshot) {
        charts.push(Chart {
            name: "autocorrelation",
            svg,
        });
    }

    charts
}

/// Figures shown on the live dashboard page.
#[must_use]
pub fn dashboard_charts(snapshot: &PerformanceSnapshot, options: &ChartOptions) -> Vec<Chart> {
    vec![
        Chart {
            name: "pnl_over_time",
            svg: pnl_chart(snapshot),
        },
        Chart {
            name: "inventory_over_time",
            svg: inventory_chart(snapshot, options.inventory_limit),
        },
        Chart {
            name: "rolling_sharpe",
            svg: sharpe_chart(snapshot, options.target_sharpe),
        },
        Chart {
            name: "rolling_drawdown",
            svg: drawdown_chart(snapshot),
        },
    ]
}

/// Cumulative P&L over time.
#[must_use]
pub fn pnl_chart(snapshot: &PerformanceSnapshot) -> String {
    time_plot(snapshot, "Cumulative P&L ($)", "P&L ($)", 0)
        .layer(Layer::Line {
            points: indexed(&snapshot.cumulative_pnl, 0),
            color: PNL_COLOR,
            dashed: false,
        })
        .render()
}

/// Inventory position with `±limit` risk guides.
#[must_use]
pub fn inventory_chart(snapshot: &PerformanceSnapshot, limit: f64) -> String {
    time_plot(snapshot, "Inventory Position", "Position Size", 0)
        .layer(Layer::Area {
            points: indexed(&snapshot.inventory, 0),
            color: INVENTORY_COLOR,
        })
        .include_zero()
        .guide(limit, LIMIT_COLOR, Some("Risk Limit"))
        .guide(-limit, LIMIT_COLOR, None)
        .render()
}

/// Rolling Sharpe ratio after warm-up with a target guide.
#[must_use]
pub fn sharpe_chart(snapshot: &PerformanceSnapshot, target: f64) -> String {
    let window = snapshot.params.window;
    let title = format!("Rolling Sharpe Ratio ({window} periods)");
    time_plot(snapshot, &title, "Sharpe Ratio", window)
        .layer(Layer::Line {
            points: indexed(snapshot.after_warmup(&snapshot.rolling_sharpe), window),
            color: SHARPE_COLOR,
            dashed: false,
        })
        .guide(target, TARGET_COLOR, Some(format!("Target ({target:.1})").as_str()))
        .render()
}

/// Rolling drawdown after warm-up.
#[must_use]
pub fn drawdown_chart(snapshot: &PerformanceSnapshot) -> String {
    let window = snapshot.params.window;
    time_plot(snapshot, "Rolling Maximum Drawdown (%)", "Drawdown (%)", window)
        .layer(Layer::Area {
            points: indexed(snapshot.after_warmup(&snapshot.rolling_drawdown), window),
            color: DRAWDOWN_COLOR,
        })
        .include_zero()
        .render()
}

/// Quoted spread over time.
#[must_use]
pub fn spread_chart(snapshot: &PerformanceSnapshot) -> String {
    time_plot(snapshot, "Bid-Ask Spread", "Spread", 0)
        .layer(Layer::Line {
            points: indexed(&snapshot.spread, 0),
            color: SPREAD_COLOR,
            dashed: false,
        })
        .render()
}

/// Return histogram (density) with a fitted normal curve.
#[must_use]
pub fn return_distribution_chart(snapshot: &PerformanceSnapshot) -> String {
    let bins: Vec<(f64, f64, f64)> = snapshot
        .return_histogram
        .iter()
        .map(|b| (b.lower, b.upper, b.density))
        .collect();

    let mut plot = Plot::new("Return Distribution", "Density")
        .layer(Layer::Bars {
            bars: bins,
            color: HIST_COLOR,
        });

    let mu = snapshot.summary.return_mean;
    if let (Some(sigma), Some(first), Some(last)) = (
        snapshot.summary.return_std.filter(|s| *s > 0.0),
        snapshot.return_histogram.first(),
        snapshot.return_histogram.last(),
    ) {
        plot = plot.layer(Layer::Line {
            points: normal_curve(mu, sigma, first.lower, last.upper),
            color: LIMIT_COLOR,
            dashed: false,
        });
    }

    plot.x_labels(format_tick(x_start(snapshot)), format_tick(x_end(snapshot)))
        .render()
}

/// Return vs inventory scatter with the least-squares trend line.
#[must_use]
pub fn inventory_return_chart(snapshot: &PerformanceSnapshot) -> String {
    let points: Vec<(f64, f64)> = snapshot
        .inventory
        .iter()
        .copied()
        .zip(snapshot.returns.iter().copied())
        .collect();

    let mut plot = Plot::new("Inventory vs Returns", "Returns").layer(Layer::Points {
        points,
        color: PNL_COLOR,
    });

    if let Some(fit) = snapshot.summary.inventory_return_fit {
        let lo = snapshot.column_stats.inventory.min;
        let hi = snapshot.column_stats.inventory.max;
        plot = plot.layer(Layer::Line {
            points: vec![(lo, fit.predict(lo)), (hi, fit.predict(hi))],
            color: LIMIT_COLOR,
            dashed: true,
        });
    }

    plot.render()
}

/// Spread vs absolute inventory scatter.
#[must_use]
pub fn spread_inventory_chart(snapshot: &PerformanceSnapshot) -> String {
    let points: Vec<(f64, f64)> = snapshot
        .inventory
        .iter()
        .map(|v| v.abs())
        .zip(snapshot.spread.iter().copied())
        .collect();

    Plot::new("Spread vs Absolute Inventory", "Spread")
        .layer(Layer::Points {
            points,
            color: INVENTORY_COLOR,
        })
        .render()
}

/// Autocorrelation bar chart, `None` when autocorrelation is undefined.
#[must_use]
pub fn autocorrelation_chart(snapshot: &PerformanceSnapshot) -> Option<String> {
    let acf = snapshot.autocorrelation.as_ref()?;
    let bars = acf
        .iter()
        .enumerate()
        .map(|(lag, value)| (lag as f64 - 0.4, lag as f64 + 0.4, *value))
        .collect();

    Some(
        Plot::new("Return Autocorrelation", "Correlation")
            .layer(Layer::Bars {
                bars,
                color: DRAWDOWN_COLOR,
            })
            .include_zero()
            .x_labels("lag 0", format!("lag {}", acf.len().saturating_sub(1)))
            .render(),
    )
}

fn time_plot(snapshot: &PerformanceSnapshot, title: &str, y_label: &str, from: usize) -> Plot {
    let first = snapshot.timestamps.get(from);
    let last = snapshot.timestamps.last();
    let plot = Plot::new(title, y_label);
    match (first, last) {
        (Some(first), Some(last)) => plot.x_labels(time_label(first), time_label(last)),
        _ => plot,
    }
}

fn time_label(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn indexed(values: &[f64], offset: usize) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| ((i + offset) as f64, *v))
        .collect()
}

fn normal_curve(mu: f64, sigma: f64, lo: f64, hi: f64) -> Vec<(f64, f64)> {
    let norm = 1.0 / (sigma * (2.0 * PI).sqrt());
    let step = (hi - lo) / (NORMAL_CURVE_POINTS - 1) as f64;
    (0..NORMAL_CURVE_POINTS)
        .map(|i| {
            let x = (i as f64).mul_add(step, lo);
            let z = (x - mu) / sigma;
            (x, norm * (-0.5 * z * z).exp())
        })
        .collect()
}

fn x_start(snapshot: &PerformanceSnapshot) -> f64 {
    snapshot.return_histogram.first().map_or(0.0, |b| b.lower)
}

fn x_end(snapshot: &PerformanceSnapshot) -> f64 {
    snapshot.return_histogram.last().map_or(0.0, |b| b.upper)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::PeriodRecord;
    use crate::metrics::{MetricsParams, PerformanceCalculator};

    fn snapshot(returns: &[f64]) -> PerformanceSnapshot {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        let records: Vec<PeriodRecord> = returns
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let inv = (i as f64 - 3.0) * 10.0;
                PeriodRecord::new(start + Duration::minutes(i as i64), *r, inv, 0.05)
            })
            .collect();
        let params = MetricsParams {
            window: 3,
            max_lag: 4,
            histogram_bins: 5,
            ..MetricsParams::default()
        };
        PerformanceCalculator::new(params)
            .unwrap()
            .compute(&records)
            .unwrap()
    }

    #[test]
    fn test_report_charts_complete() {
        let snap = snapshot(&[0.01, -0.02, 0.015, 0.005, -0.01, 0.002, 0.003, -0.004]);
        let charts = report_charts(&snap, &ChartOptions::default());
        let names: Vec<&str> = charts.iter().map(|c| c.name).collect();

        assert_eq!(
            names,
            vec![
                "pnl_over_time",
                "inventory_over_time",
                "rolling_sharpe",
                "rolling_drawdown",
                "spread_over_time",
                "return_distribution",
                "inventory_vs_returns",
                "spread_vs_inventory",
                "autocorrelation",
            ]
        );
        assert!(charts.iter().all(|c| c.svg.starts_with("<svg")));
    }

    #[test]
    fn test_autocorrelation_omitted_when_undefined() {
        let snap = snapshot(&[0.0; 8]);
        assert!(autocorrelation_chart(&snap).is_none());
        let charts = report_charts(&snap, &ChartOptions::default());
        assert!(charts.iter().all(|c| c.name != "autocorrelation"));
    }

    #[test]
    fn test_inventory_chart_has_risk_guides() {
        let snap = snapshot(&[0.01, -0.02, 0.015, 0.005]);
        let svg = inventory_chart(&snap, 500.0);
        assert!(svg.contains("Risk Limit"));
        assert!(svg.contains("2024-01-02 09:30"));
    }

    #[test]
    fn test_sharpe_chart_starts_after_warmup() {
        let snap = snapshot(&[0.01, -0.02, 0.015, 0.005, -0.01]);
        let svg = sharpe_chart(&snap, 2.0);
        assert!(svg.contains("Target (2.0)"));
        assert!(svg.contains("2024-01-02 09:33"));
    }

    #[test]
    fn test_normal_curve_peaks_at_mean() {
        let curve = normal_curve(0.0, 1.0, -3.0, 3.0);
        assert_eq!(curve.len(), NORMAL_CURVE_POINTS);
        let Some(peak) = curve.iter().map(|p| p.1).reduce(f64::max) else {
            panic!("curve should not be empty");
        };
        assert!((peak - 1.0 / (2.0 * PI).sqrt()).abs() < 1e-3);
    }
}
