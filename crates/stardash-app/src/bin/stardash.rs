//! Headless dashboard runner.
//!
//! Restores (or establishes) a session against the configured backend and
//! polls the system status endpoints, logging each refresh. Useful as an
//! ops-side watcher and as a living exercise of the full client stack.
//!
//! Credentials come from `STARDASH_USERNAME` / `STARDASH_PASSWORD` when no
//! persisted session can be restored.

use anyhow::{Result, bail};
use stardash_app::{DashboardPoller, PollerOptions, bootstrap};
use stardash_core::{MemoryNavigator, Navigator, Route, TokenStore};
use stardash_infrastructure::{ConfigService, FileTokenStore};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ConfigService::new().get_config();
    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new()?);
    let navigator: Arc<dyn Navigator> = Arc::new(MemoryNavigator::new(Route::Login));

    let ctx = bootstrap::build(config.clone(), tokens, navigator)?;

    ctx.session.initialize().await;
    if !ctx.session.is_authenticated() {
        let username = env::var("STARDASH_USERNAME").unwrap_or_default();
        let password = env::var("STARDASH_PASSWORD").unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            bail!(
                "no persisted session; set STARDASH_USERNAME and STARDASH_PASSWORD to log in"
            );
        }

        if !ctx.session.login(&username, &password).await {
            bail!(
                "login failed: {}",
                ctx.session.auth_error().unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }

    if let Some(user) = ctx.session.current_user() {
        info!(username = %user.username, roles = ?user.roles, "session established");
    }

    let options = PollerOptions {
        interval: Duration::from_millis(config.dashboard.poll_interval_ms),
        history_timeframe: config.dashboard.history_timeframe.clone(),
    };
    let (handle, mut state_rx) = DashboardPoller::spawn(Arc::new(ctx.system.clone()), options);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow().clone();
                if state.loading {
                    continue;
                }
                if let Some(banner) = &state.error {
                    warn!(%banner, "dashboard refresh failed");
                } else if let Some(snapshot) = &state.snapshot {
                    info!(
                        status = ?snapshot.health.status,
                        cpu = snapshot.metrics.cpu_usage,
                        memory = snapshot.metrics.memory_usage,
                        rpm = snapshot.metrics.requests_per_minute,
                        history_points = snapshot.history.len(),
                        "dashboard refreshed"
                    );
                }
            }
        }
    }

    info!("shutting down");
    handle.stop().await;
    Ok(())
}
