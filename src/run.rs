//! Platform service lifecycle
//!
//! Wires config, secrets, database, and the webserver together, spawns the
//! background maintenance loops, and blocks until shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::database::Database;
use crate::logger::{self, LogTag};
use crate::market::MarketDataEngine;
use crate::paths;
use crate::secrets::Secrets;
use crate::shutdown;
use crate::webserver::{self, state::AppState};

/// Run the platform service until shutdown
pub async fn run_platform() -> Result<()> {
    let config = Config::load(&paths::get_config_path())?;
    let secrets = Secrets::load(&paths::get_secrets_path())?;

    let db = Database::open_default().context("Failed to open platform database")?;
    let state = Arc::new(
        AppState::new(config, &secrets, db)
            .map_err(|e| anyhow::anyhow!("Failed to initialize platform state: {}", e))?,
    );

    shutdown::install_ctrlc_handler();

    spawn_cache_cleanup_loop(Arc::clone(&state));
    if state.config.alerts.enabled {
        spawn_alert_loop(Arc::clone(&state));
    }

    logger::info(
        LogTag::System,
        &format!(
            "{} v{} starting",
            state.config.general.platform_name,
            env!("CARGO_PKG_VERSION")
        ),
    );

    webserver::start_server(state)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    logger::info(LogTag::System, "Platform stopped");
    logger::flush();
    Ok(())
}

/// Periodically drop expired market-data cache rows
fn spawn_cache_cleanup_loop(state: Arc<AppState>) {
    let interval = Duration::from_secs(state.config.database.cleanup_interval_hours * 3600);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown::wait_for_shutdown() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            match state.db.cleanup_expired_cache() {
                Ok(0) => {}
                Ok(removed) => {
                    logger::info(
                        LogTag::Database,
                        &format!("Cache cleanup removed {} expired entries", removed),
                    );
                }
                Err(e) => {
                    logger::warning(LogTag::Database, &format!("Cache cleanup failed: {}", e));
                }
            }
        }
    });
}

/// Periodically evaluate pending price alerts
fn spawn_alert_loop(state: Arc<AppState>) {
    let interval = Duration::from_secs(state.config.alerts.eval_interval_secs);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown::wait_for_shutdown() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            match evaluate_alerts(&state.db, &state.engine).await {
                Ok(0) => {}
                Ok(fired) => {
                    logger::info(LogTag::System, &format!("{} alerts fired", fired));
                }
                Err(e) => {
                    logger::warning(LogTag::System, &format!("Alert evaluation failed: {}", e));
                }
            }
        }
    });
}

/// Check every pending alert against the current price
///
/// Supported alert types: `price_above` and `price_below`. Returns how
/// many alerts fired this pass.
pub async fn evaluate_alerts(db: &Database, engine: &MarketDataEngine) -> Result<u64> {
    let pending = db.get_pending_alerts()?;
    let mut fired = 0;

    for alert in pending {
        let price = engine.get_price(&alert.ticker).await;

        let should_fire = match alert.alert_type.as_str() {
            "price_above" => price >= alert.threshold,
            "price_below" => price <= alert.threshold,
            other => {
                logger::warning(
                    LogTag::System,
                    &format!("Unknown alert type '{}' on {}", other, alert.alert_id),
                );
                false
            }
        };

        if should_fire {
            db.mark_alert_triggered(&alert.alert_id)?;
            logger::info(
                LogTag::System,
                &format!(
                    "Alert fired: {} {} {} (price {:.2})",
                    alert.ticker, alert.alert_type, alert.threshold, price
                ),
            );
            fired += 1;
        }
    }

    Ok(fired)
}
