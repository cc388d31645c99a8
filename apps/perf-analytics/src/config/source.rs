//! Record source configuration.

use serde::{Deserialize, Serialize};

/// Where period records are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path of the CSV file holding period records.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "data/sample_performance.csv".to_string()
}
