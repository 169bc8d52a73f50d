use anyhow::{Context, Result};
use std::sync::Arc;

use collector::logging;
use collector::persist::{MemoryStore, Persister, SeaOrmStore};
use collector::pipeline::{Pipeline, RunManifest};
use collector::source::BinanceRestClient;
use migration::{Migrator, MigratorTrait};
use shared::{get_db_connection, Config};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;
    let _log_guard = logging::init(config.log_dir.as_deref())?;

    tracing::info!("Starting collector...");

    let source = BinanceRestClient::new(&config.binance_base_url, config.http_timeout)
        .context("Failed to build Binance REST client")?;
    tracing::info!("Binance REST client ready at {}", source.base_url());

    let store = build_store(&config).await?;
    let pipeline = Pipeline::new(Arc::new(source), store);

    match config.collect_interval {
        None => {
            let manifest = pipeline.run().await?;
            report(&manifest);
        }
        Some(period) => {
            tracing::info!("Collecting every {}s, Ctrl-C to stop", period.as_secs());
            let completed = pipeline
                .run_every(period, shutdown_signal(), |manifest| report(&manifest))
                .await;
            tracing::info!("Shutdown requested after {} completed runs", completed);
        }
    }

    tracing::info!("Collector stopped");
    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn Persister>> {
    if config.dry_run {
        tracing::warn!("DRY_RUN set: rows are kept in memory and discarded on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let conn = config
        .conn
        .as_deref()
        .context("CONN must be set to the store connection string")?;
    let db = get_db_connection(conn).await?;

    if config.run_migrations {
        Migrator::up(&db, None).await.context("Failed to apply migrations")?;
        tracing::info!("Migrations applied");
    }

    Ok(Arc::new(SeaOrmStore::new(db)))
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C, run until killed: {}", e);
        std::future::pending::<()>().await;
    }
}

fn report(manifest: &RunManifest) {
    let symbols: Vec<&str> = manifest.ranked.iter().map(|r| r.symbol.as_str()).collect();
    tracing::info!(
        "Run {} at {}: {:?}, {} units ok, {} skipped, {} failed, {} rows",
        manifest.run_id,
        manifest.collected_at,
        symbols,
        manifest.succeeded(),
        manifest.skipped(),
        manifest.failed(),
        manifest.rows_written()
    );
    match serde_json::to_string(manifest) {
        Ok(json) => tracing::debug!("Manifest: {}", json),
        Err(e) => tracing::warn!("Could not serialize manifest: {}", e),
    }
}
