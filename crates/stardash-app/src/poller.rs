//! Dashboard polling loader.
//!
//! Periodically refreshes the read-only dashboard data (health, current
//! metrics, recent history) and republishes it over a watch channel for the
//! rendering layer. The poller is an explicit start/stop handle owned by the
//! view, not a free-running global interval, so teardown is guaranteed: once
//! stopped (or the handle is dropped) no refresh fires again.

use async_trait::async_trait;
use stardash_client::SystemService;
use stardash_client::dto::{MetricsSample, SystemHealth, SystemMetrics};
use stardash_core::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

/// Banner text shown when a refresh cycle fails. The previous snapshot
/// stays on screen; only the banner changes.
pub const REFRESH_ERROR_BANNER: &str = "Failed to load dashboard data";

/// Read-only source of dashboard data. `SystemService` is the production
/// implementation; tests substitute their own.
#[async_trait]
pub trait MetricsSource: Send + Sync + 'static {
    async fn health(&self) -> Result<SystemHealth>;
    async fn metrics(&self) -> Result<SystemMetrics>;
    async fn metrics_history(&self, timeframe: &str) -> Result<Vec<MetricsSample>>;
}

#[async_trait]
impl MetricsSource for SystemService {
    async fn health(&self) -> Result<SystemHealth> {
        SystemService::health(self).await
    }

    async fn metrics(&self) -> Result<SystemMetrics> {
        SystemService::metrics(self).await
    }

    async fn metrics_history(&self, timeframe: &str) -> Result<Vec<MetricsSample>> {
        SystemService::metrics_history(self, timeframe).await
    }
}

/// One complete fetch cycle's worth of data.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub health: SystemHealth,
    pub metrics: SystemMetrics,
    pub history: Vec<MetricsSample>,
}

/// What the rendering layer consumes. On refresh failure `snapshot` keeps
/// the last successful data and only `error` is populated.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub snapshot: Option<DashboardSnapshot>,
    pub error: Option<String>,
    pub loading: bool,
}

#[derive(Debug, Clone)]
pub struct PollerOptions {
    /// Fixed refresh period.
    pub interval: Duration,
    /// Timeframe passed to the history fetch, e.g. "24h".
    pub history_timeframe: String,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(stardash_core::config::DEFAULT_POLL_INTERVAL_MS),
            history_timeframe: stardash_core::config::DEFAULT_HISTORY_TIMEFRAME.to_string(),
        }
    }
}

/// Spawns and owns the recurring refresh task.
pub struct DashboardPoller;

impl DashboardPoller {
    /// Starts polling: one immediate refresh, then one per interval.
    ///
    /// Returns the control handle and the state receiver. The task exits
    /// when the handle is stopped or dropped.
    pub fn spawn(
        source: Arc<dyn MetricsSource>,
        options: PollerOptions,
    ) -> (PollerHandle, watch::Receiver<DashboardState>) {
        let (state_tx, state_rx) = watch::channel(DashboardState::default());
        let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(options.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    // Shutdown wins over a simultaneously-ready tick so no
                    // refresh can fire after deactivation.
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        Self::refresh(source.as_ref(), &options.history_timeframe, &state_tx).await;
                    }
                    // A manual refresh runs immediately and does not reset
                    // the interval's phase.
                    recv = refresh_rx.recv() => match recv {
                        Some(()) => {
                            Self::refresh(source.as_ref(), &options.history_timeframe, &state_tx).await;
                        }
                        None => break,
                    },
                }
            }
        });

        let handle = PollerHandle {
            shutdown: Some(shutdown_tx),
            refresh_tx,
            task,
        };
        (handle, state_rx)
    }

    /// One refresh cycle: all three fetches issued concurrently; the cycle
    /// completes when all resolve or any one fails.
    async fn refresh(
        source: &dyn MetricsSource,
        timeframe: &str,
        state_tx: &watch::Sender<DashboardState>,
    ) {
        state_tx.send_modify(|state| state.loading = true);

        let fetched = tokio::try_join!(
            source.health(),
            source.metrics(),
            source.metrics_history(timeframe),
        );

        match fetched {
            Ok((health, metrics, history)) => {
                state_tx.send_modify(|state| {
                    state.snapshot = Some(DashboardSnapshot {
                        health,
                        metrics,
                        history,
                    });
                    state.error = None;
                    state.loading = false;
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "dashboard refresh failed");
                state_tx.send_modify(|state| {
                    // Last-known-good snapshot stays in place.
                    state.error = Some(REFRESH_ERROR_BANNER.to_string());
                    state.loading = false;
                });
            }
        }
    }
}

/// Start/stop handle for the poll task, owned by the view.
pub struct PollerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    refresh_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl PollerHandle {
    /// Requests an immediate refresh, independent of the timer phase.
    pub async fn refresh_now(&self) {
        // A full queue means a manual refresh is already pending; coalesce.
        let _ = self.refresh_tx.try_send(());
    }

    /// Stops the poller and waits for the task to wind down. No refresh
    /// fires after this returns.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        // Dropping the handle without stop() still tears the task down via
        // the closed shutdown channel.
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardash_client::dto::HealthStatus;
    use stardash_core::error::StardashError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn health() -> SystemHealth {
        SystemHealth {
            status: HealthStatus::Healthy,
            version: "1.0.0".to_string(),
            uptime_seconds: 3600,
            services: vec![],
        }
    }

    fn metrics() -> SystemMetrics {
        SystemMetrics {
            cpu_usage: 10.0,
            memory_usage: 40.0,
            disk_usage: 55.0,
            active_connections: 12,
            requests_per_minute: 180.0,
            error_rate: 0.1,
            timestamp: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    /// Counts cycles; optionally fails every fetch.
    #[derive(Default)]
    struct CountingSource {
        cycles: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingSource {
        fn cycles(&self) -> usize {
            self.cycles.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetricsSource for CountingSource {
        async fn health(&self) -> Result<SystemHealth> {
            self.cycles.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(StardashError::http("connection refused"))
            } else {
                Ok(health())
            }
        }

        async fn metrics(&self) -> Result<SystemMetrics> {
            Ok(metrics())
        }

        async fn metrics_history(&self, _timeframe: &str) -> Result<Vec<MetricsSample>> {
            Ok(vec![])
        }
    }

    /// Lets the spawned poll task run everything currently ready.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn options() -> PollerOptions {
        PollerOptions {
            interval: Duration::from_secs(30),
            history_timeframe: "24h".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_refresh_then_one_per_interval() {
        let source = Arc::new(CountingSource::default());
        let (handle, rx) = DashboardPoller::spawn(source.clone(), options());

        settle().await;
        assert_eq!(source.cycles(), 1);
        assert!(rx.borrow().snapshot.is_some());

        for expected in 2..=4 {
            tokio::time::advance(Duration::from_secs(30)).await;
            settle().await;
            assert_eq!(source.cycles(), expected);
        }

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_refresh_after_stop() {
        let source = Arc::new(CountingSource::default());
        let (handle, _rx) = DashboardPoller::spawn(source.clone(), options());

        settle().await;
        assert_eq!(source.cycles(), 1);

        handle.stop().await;

        tokio::time::advance(Duration::from_secs(300)).await;
        settle().await;
        assert_eq!(source.cycles(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let source = Arc::new(CountingSource::default());
        let (handle, _rx) = DashboardPoller::spawn(source.clone(), options());

        settle().await;
        drop(handle);
        settle().await;

        tokio::time::advance(Duration::from_secs(300)).await;
        settle().await;
        assert_eq!(source.cycles(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_runs_between_ticks() {
        let source = Arc::new(CountingSource::default());
        let (handle, _rx) = DashboardPoller::spawn(source.clone(), options());

        settle().await;
        assert_eq!(source.cycles(), 1);

        handle.refresh_now().await;
        settle().await;
        assert_eq!(source.cycles(), 2);

        // The manual refresh did not reset the timer phase: the next
        // periodic cycle still fires at the original 30s mark.
        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(source.cycles(), 3);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_last_good_snapshot_and_sets_banner() {
        let source = Arc::new(CountingSource::default());
        let (handle, rx) = DashboardPoller::spawn(source.clone(), options());

        settle().await;
        let good = rx.borrow().snapshot.clone();
        assert!(good.is_some());
        assert_eq!(rx.borrow().error, None);

        source.fail.store(true, Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;

        let state = rx.borrow().clone();
        assert_eq!(state.snapshot, good);
        assert_eq!(state.error.as_deref(), Some(REFRESH_ERROR_BANNER));
        assert!(!state.loading);

        // Recovery clears the banner
        source.fail.store(false, Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(rx.borrow().error, None);

        handle.stop().await;
    }
}
