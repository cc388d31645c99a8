//! Caller-owned refresh loop.
//!
//! Every `refresh_interval` the poller re-reads the source on the blocking
//! pool, recomputes the snapshot and publishes a [`DashboardState`] through a
//! `watch` channel. A failed refresh is published as `last_error` while the
//! previous snapshot stays visible. Cancelling the token stops the loop at
//! its next await point.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use perf_analytics::{ErrorCode, PerformanceSnapshot};

use crate::context::DashboardContext;
use crate::monitoring::{RefreshOutcome, record_refresh, set_snapshot_gauges};

/// Why the most recent refresh failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshFailure {
    /// Error code.
    pub code: ErrorCode,
    /// Error message.
    pub message: String,
    /// When the refresh failed.
    pub at: DateTime<Utc>,
}

/// State published after every refresh attempt.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Latest successfully computed snapshot.
    pub snapshot: Option<Arc<PerformanceSnapshot>>,
    /// Time of the last successful refresh.
    pub last_refresh: Option<DateTime<Utc>>,
    /// Set when the most recent attempt failed; cleared on success.
    pub last_error: Option<RefreshFailure>,
    /// Successful refreshes.
    pub refresh_count: u64,
    /// Failed refreshes.
    pub failure_count: u64,
}

impl DashboardState {
    /// True once a snapshot has been published.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Periodic refresh loop.
pub struct Poller {
    context: Arc<DashboardContext>,
    state_tx: watch::Sender<DashboardState>,
    cancel: CancellationToken,
}

impl Poller {
    /// Create a poller and the receiver its state is published on.
    #[must_use]
    pub fn new(
        context: Arc<DashboardContext>,
        cancel: CancellationToken,
    ) -> (Self, watch::Receiver<DashboardState>) {
        let (state_tx, state_rx) = watch::channel(DashboardState::default());
        (
            Self {
                context,
                state_tx,
                cancel,
            },
            state_rx,
        )
    }

    /// Another receiver of the published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state_tx.subscribe()
    }

    /// Run until the token is cancelled. The first refresh happens
    /// immediately.
    pub async fn run(self) {
        let interval = self.context.refresh_interval();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            source = %self.context.source_description(),
            "Poller started"
        );

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.refresh_once().await;
                }
            }
        }

        tracing::info!("Poller stopped");
    }

    /// Perform one refresh and publish the result. Returns `true` on success.
    pub async fn refresh_once(&self) -> bool {
        let context = Arc::clone(&self.context);
        let started = Instant::now();
        let result = tokio::task::spawn_blocking(move || context.refresh()).await;
        let elapsed = started.elapsed();
        let now = Utc::now();

        let failure = match result {
            Ok(Ok(snapshot)) => {
                record_refresh(RefreshOutcome::Success, elapsed);
                set_snapshot_gauges(&snapshot, now);
                tracing::debug!(
                    records = snapshot.len(),
                    total_pnl = snapshot.summary.total_pnl,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Snapshot refreshed"
                );

                let snapshot = Arc::new(snapshot);
                self.state_tx.send_modify(|state| {
                    state.snapshot = Some(snapshot);
                    state.last_refresh = Some(now);
                    state.last_error = None;
                    state.refresh_count += 1;
                });
                return true;
            }
            Ok(Err(e)) => RefreshFailure {
                code: e.code(),
                message: e.to_string(),
                at: now,
            },
            Err(e) => join_failure(&e, now),
        };

        record_refresh(RefreshOutcome::Failure, elapsed);
        tracing::warn!(
            code = %failure.code,
            error = %failure.message,
            "Refresh failed, keeping previous snapshot"
        );
        self.state_tx.send_modify(|state| {
            state.last_error = Some(failure);
            state.failure_count += 1;
        });
        false
    }
}

/// A refresh task that panicked or was cancelled never reached the source.
fn join_failure(err: &tokio::task::JoinError, at: DateTime<Utc>) -> RefreshFailure {
    RefreshFailure {
        code: ErrorCode::InternalError,
        message: format!("refresh task failed: {err}"),
        at,
    }
}
