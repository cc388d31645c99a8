// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::needless_pass_by_value
    )
)]

//! Performance Dashboard
//!
//! Live view over a performance CSV: a poll loop re-reads the source on a
//! fixed cadence, recomputes every metric from scratch and publishes the
//! result; an HTTP server renders the latest published state.
//!
//! # Components
//!
//! - [`DashboardContext`]: config, record source and calculator, built once
//!   and shared by reference
//! - [`Poller`]: the cancellable refresh loop publishing [`DashboardState`]
//!   through a `watch` channel
//! - [`DashboardServer`]: HTML page, JSON snapshot API, health checks and
//!   Prometheus metrics

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Dashboard context.
pub mod context;

/// Prometheus metrics.
pub mod monitoring;

/// Refresh loop and published state.
pub mod poller;

/// HTTP server.
pub mod server;

pub use context::{DashboardContext, RefreshError};
pub use monitoring::{get_metrics_handle, init_metrics};
pub use poller::{DashboardState, Poller, RefreshFailure};
pub use server::{DashboardServer, DashboardServerError, ServerState};
