//! Dashboard HTML page.

use std::fmt::Write;
use std::time::Duration;

use perf_analytics::charts::{ChartOptions, dashboard_charts, escape};
use perf_analytics::metrics::{format_currency, format_pct};

use crate::poller::DashboardState;

const STYLE: &str = "body{font-family:sans-serif;margin:24px;background:#fafafa;color:#222}\
.grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(576px,1fr));gap:16px}\
.card{background:#fff;border:1px solid #ddd;border-radius:4px;padding:8px}\
table{border-collapse:collapse}td{padding:4px 12px;border-bottom:1px solid #eee}\
td.v{text-align:right;font-family:monospace}\
.error{background:#fdecea;border:1px solid #C73E1D;padding:8px;margin-bottom:16px}\
.meta{color:#666;font-size:90%}";

/// Render the full page for the current state.
///
/// The page reloads itself every `refresh` (rounded up to whole seconds).
pub fn render_page(
    state: &DashboardState,
    options: &ChartOptions,
    refresh: Duration,
    source: &str,
) -> String {
    let reload_secs = refresh.as_millis().div_ceil(1000).max(1);

    let mut out = String::with_capacity(64 * 1024);
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"{reload_secs}\">\n\
         <title>QuantRush Real-Time Dashboard</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>QuantRush Real-Time Dashboard</h1>\n"
    );

    let _ = write!(out, "<p class=\"meta\">Source: {}", escape(source));
    if let Some(at) = state.last_refresh {
        let _ = write!(out, " | Last refresh: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    let _ = writeln!(out, " | Refreshes: {}</p>", state.refresh_count);

    if let Some(failure) = &state.last_error {
        let _ = writeln!(
            out,
            "<div class=\"error\">Refresh failed ({}): {}</div>",
            failure.code,
            escape(&failure.message)
        );
    }

    match &state.snapshot {
        Some(snapshot) => {
            let s = &snapshot.summary;
            let rows = [
                ("Total P&amp;L", format_currency(s.total_pnl)),
                ("Peak P&amp;L", format_currency(s.peak_pnl)),
                ("Sharpe Ratio", format!("{:.2}", s.avg_sharpe)),
                ("Max Drawdown", format_pct(s.max_drawdown_pct)),
                ("Win Rate", format_pct(s.win_rate_pct)),
                ("Avg Spread", format!("{:.4}", s.avg_spread)),
                ("Max Inventory", format!("{:.0}", s.max_abs_inventory)),
                ("Total Periods", s.total_periods.to_string()),
            ];

            out.push_str("<table>\n");
            for (label, value) in rows {
                let _ = writeln!(out, "<tr><td>{label}</td><td class=\"v\">{value}</td></tr>");
            }
            out.push_str("</table>\n<div class=\"grid\">\n");
            for chart in dashboard_charts(snapshot, options) {
                let _ = writeln!(
                    out,
                    "<div class=\"card\" id=\"{}\">{}</div>",
                    chart.name, chart.svg
                );
            }
            out.push_str("</div>\n");
        }
        None => out.push_str("<p>Waiting for data...</p>\n"),
    }

    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use perf_analytics::ErrorCode;
    use test_case::test_case;

    use super::*;
    use crate::poller::RefreshFailure;

    #[test]
    fn test_waiting_page() {
        let html = render_page(
            &DashboardState::default(),
            &ChartOptions::default(),
            Duration::from_millis(5000),
            "data/perf.csv",
        );

        assert!(html.contains("content=\"5\""));
        assert!(html.contains("Waiting for data"));
        assert!(!html.contains("<svg"));
    }

    #[test_case(1500, 2 ; "rounds up")]
    #[test_case(200, 1 ; "at least one second")]
    #[test_case(10_000, 10 ; "whole seconds")]
    fn test_reload_interval(ms: u64, expected: u128) {
        let html = render_page(
            &DashboardState::default(),
            &ChartOptions::default(),
            Duration::from_millis(ms),
            "x",
        );
        assert!(html.contains(&format!("content=\"{expected}\"")));
    }

    #[test]
    fn test_error_message_is_escaped() {
        let state = DashboardState {
            last_error: Some(RefreshFailure {
                code: ErrorCode::MalformedSource,
                message: "bad <value> & more".to_string(),
                at: Utc::now(),
            }),
            ..DashboardState::default()
        };
        let html = render_page(
            &state,
            &ChartOptions::default(),
            Duration::from_secs(5),
            "<src>",
        );

        assert!(html.contains("MALFORMED_SOURCE"));
        assert!(html.contains("bad &lt;value&gt; &amp; more"));
        assert!(html.contains("&lt;src&gt;"));
    }
}
