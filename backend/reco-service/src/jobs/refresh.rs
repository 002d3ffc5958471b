//! Model Refresh Background Job
//!
//! Polls the interaction log and rebuilds the engine when enough new
//! events have accumulated since the last fit. The rebuild happens off
//! to the side; requests keep scoring against the old state until the
//! engine swaps in the new one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use sqlx::PgPool;
use tokio::time::sleep;

use reco_engine::RecoEngine;

use crate::config::RefreshConfig;
use crate::db::{CatalogRepo, InteractionRepo};
use crate::metrics::refresh as metrics;

pub async fn start_refresh_job(db: PgPool, engine: Arc<RecoEngine>, config: RefreshConfig) {
    tracing::info!(
        interval_secs = config.interval_secs,
        min_events = config.min_events,
        "Starting model refresh background job"
    );

    let catalog = CatalogRepo::new(db.clone());
    let interactions = InteractionRepo::new(db);
    let interval = Duration::from_secs(config.interval_secs);

    loop {
        sleep(interval).await;

        match run_refresh_cycle(&catalog, &interactions, &engine, config.min_events).await {
            Ok(true) => metrics::record_refresh_run("refreshed"),
            Ok(false) => metrics::record_refresh_run("skipped"),
            Err(e) => {
                metrics::record_refresh_run("error");
                tracing::error!(error = %e, "Model refresh failed");
            }
        }
    }
}

/// One staleness check. Returns Ok(true) when a rebuild ran.
async fn run_refresh_cycle(
    catalog: &CatalogRepo,
    interactions: &InteractionRepo,
    engine: &Arc<RecoEngine>,
    min_events: i64,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let live = interactions.count().await?;
    metrics::set_interactions_seen(live);

    let fitted = engine.interaction_count().unwrap_or(0) as i64;
    let new_events = live - fitted;
    if new_events < min_events {
        tracing::debug!(live, fitted, new_events, "Refresh skipped, log not stale enough");
        return Ok(false);
    }

    tracing::info!(live, fitted, new_events, "Refreshing engine from database");
    let cycle_start = Instant::now();

    let snapshot = catalog.load_snapshot().await?;

    let refresh_engine = Arc::clone(engine);
    tokio::task::spawn_blocking(move || refresh_engine.refresh(&snapshot, Utc::now())).await??;

    metrics::record_refresh_duration("total", cycle_start.elapsed());
    tracing::info!(
        duration_ms = cycle_start.elapsed().as_millis() as u64,
        "Engine refresh completed"
    );

    Ok(true)
}
