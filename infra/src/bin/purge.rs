//! Reclaim dead OAuth2 token records from the command line.
//!
//! Runs a single sweep by default. With `watch`, keeps the reclaimer running
//! on its configured interval until interrupted.
//!
//! Settings come from `O2S_*` environment variables, optionally loaded from a
//! `.env` file.

use anyhow::{bail, Context};
use tracing::info;

use o2s_core::repositories::TokenStore;
use o2s_infra::open_token_store;
use o2s_shared::config::{AppConfig, ReclaimConfig, TokenStoreConfig};
use o2s_shared::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config.logging).context("failed to initialise logging")?;

    match std::env::args().nth(1).as_deref() {
        None | Some("once") => purge_once(config.token_store).await,
        Some("watch") => watch(config.token_store).await,
        Some(other) => bail!("unknown mode {:?}; expected `once` or `watch`", other),
    }
}

async fn purge_once(config: TokenStoreConfig) -> anyhow::Result<()> {
    let config = TokenStoreConfig {
        reclaim: ReclaimConfig::disabled(),
        ..config
    };
    let store = open_token_store(&config)
        .await
        .context("failed to open token store")?;

    let pool = store.engine().pool();
    match pool.health_check().await {
        Ok(true) => info!(pool = %pool.statistics(), "Database reachable"),
        Ok(false) => {
            store.close().await;
            bail!("database health check returned an unexpected value");
        }
        Err(e) => {
            store.close().await;
            return Err(e)
                .with_context(|| format!("database unreachable at {}", config.database.redacted_url()));
        }
    }

    let outcome = store.purge().await;
    store.close().await;
    let outcome = outcome.context("purge failed")?;

    info!(
        table = config.table_name(),
        matched = outcome.matched,
        deleted = outcome.deleted,
        "Purge finished"
    );
    Ok(())
}

async fn watch(config: TokenStoreConfig) -> anyhow::Result<()> {
    if config.reclaim.disabled {
        bail!("reclamation is disabled; unset O2S_RECLAIM_DISABLED to watch");
    }

    let store = open_token_store(&config)
        .await
        .context("failed to open token store")?;

    info!(
        interval_secs = config.reclaim.interval().as_secs(),
        "Reclaiming until interrupted"
    );
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!(pool = %store.engine().pool().statistics(), "Shutting down");
    store.close().await;
    Ok(())
}
