//! Report generator configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Static report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving summary files and charts.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Inventory risk limit drawn as guide lines on the inventory chart.
    #[serde(default = "default_inventory_limit")]
    pub inventory_limit: f64,
    /// Target Sharpe drawn on the rolling Sharpe chart.
    #[serde(default = "default_target_sharpe")]
    pub target_sharpe: f64,
    /// Render SVG charts alongside the summary.
    #[serde(default = "default_true")]
    pub charts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            inventory_limit: default_inventory_limit(),
            target_sharpe: default_target_sharpe(),
            charts: true,
        }
    }
}

fn default_output_dir() -> String {
    "results".to_string()
}

const fn default_inventory_limit() -> f64 {
    500.0
}

const fn default_target_sharpe() -> f64 {
    2.0
}
