//! Live dashboard configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Dashboard HTTP server and poll loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// HTTP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Interval between source re-reads, in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl DashboardConfig {
    /// Poll cadence as a `Duration`.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

const fn default_refresh_interval_ms() -> u64 {
    5000
}
