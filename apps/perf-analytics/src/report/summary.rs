//! Plain-text summary rendering.

use std::fmt::Write;

use crate::metrics::{
    ColumnSummary, PerformanceSnapshot, format_currency, format_pct, format_ratio,
};

const RULE: &str = "────────────────────────────────────────";

/// Render the column statistics table followed by the performance summary.
#[must_use]
pub fn render_summary(snapshot: &PerformanceSnapshot) -> String {
    let mut out = String::new();
    write_column_table(&mut out, snapshot);
    out.push('\n');
    write_performance(&mut out, snapshot);
    out
}

fn write_column_table(out: &mut String, snapshot: &PerformanceSnapshot) {
    let stats = &snapshot.column_stats;
    let columns: [(&str, &ColumnSummary); 3] = [
        ("return", &stats.returns),
        ("inventory", &stats.inventory),
        ("spread", &stats.spread),
    ];

    let _ = writeln!(out, "SUMMARY STATISTICS");
    let _ = writeln!(out, "{RULE}");
    let _ = write!(out, "{:<8}", "");
    for (name, _) in &columns {
        let _ = write!(out, "{name:>16}");
    }
    out.push('\n');

    let rows: [(&str, fn(&ColumnSummary) -> Option<f64>); 8] = [
        ("count", |c| Some(c.count as f64)),
        ("mean", |c| Some(c.mean)),
        ("std", |c| c.std),
        ("min", |c| Some(c.min)),
        ("25%", |c| Some(c.p25)),
        ("50%", |c| Some(c.median)),
        ("75%", |c| Some(c.p75)),
        ("max", |c| Some(c.max)),
    ];

    for (label, value) in rows {
        let _ = write!(out, "{label:<8}");
        for (_, column) in &columns {
            match value(column) {
                Some(v) => {
                    let _ = write!(out, "{v:>16.6}");
                }
                None => {
                    let _ = write!(out, "{:>16}", "NaN");
                }
            }
        }
        out.push('\n');
    }
}

fn write_performance(out: &mut String, snapshot: &PerformanceSnapshot) {
    let s = &snapshot.summary;

    let _ = writeln!(out, "PERFORMANCE SUMMARY");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Total P&L:        {}", format_currency(s.total_pnl));
    let _ = writeln!(out, "Peak P&L:         {}", format_currency(s.peak_pnl));
    let _ = writeln!(out, "Sharpe Ratio:     {:.2}", s.avg_sharpe);
    let _ = writeln!(out, "Max Drawdown:     {}", format_pct(s.max_drawdown_pct));
    let _ = writeln!(out, "Win Rate:         {}", format_pct(s.win_rate_pct));
    out.push('\n');

    let _ = writeln!(out, "TRADING METRICS");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Avg Spread:       {:.4}", s.avg_spread);
    let _ = writeln!(out, "Max Inventory:    {:.0}", s.max_abs_inventory);
    let _ = writeln!(out, "Total Periods:    {}", s.total_periods);
    out.push('\n');

    let _ = writeln!(out, "MICROSTRUCTURE");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "Return mean/std:  {:.6} / {}",
        s.return_mean,
        s.return_std.map_or_else(|| "N/A".to_string(), |v| format!("{v:.6}"))
    );
    match s.inventory_return_fit {
        Some(fit) => {
            let _ = writeln!(
                out,
                "Inventory beta:   {:.3e} (intercept {:.3e})",
                fit.slope, fit.intercept
            );
        }
        None => {
            let _ = writeln!(out, "Inventory beta:   N/A");
        }
    }
    let _ = writeln!(
        out,
        "Spread/|inv| corr: {}",
        format_ratio(s.spread_inventory_correlation)
    );
    match (&snapshot.autocorrelation, &snapshot.autocorrelation_error) {
        (Some(acf), _) => {
            let lag1 = acf.get(1).copied();
            let _ = writeln!(out, "Return ACF lag 1: {}", format_ratio(lag1));
        }
        (None, Some(reason)) => {
            let _ = writeln!(out, "Return ACF:       unavailable ({reason})");
        }
        (None, None) => {
            let _ = writeln!(out, "Return ACF:       unavailable");
        }
    }
}
