//! News pulse service: binary entrypoint.
//! Boots the Axum HTTP server with the pulse pipeline, an in-memory store and `/metrics`.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_pulse::api::{create_router, AppState};
use news_pulse::metrics::Metrics;
use news_pulse::store::{InMemoryStore, PulseStore};
use news_pulse::{PulseConfig, PulsePipeline, PulseService};

/// Compact tracing logs, opt-in through PULSE_LOG=1. `try_init` leaves an existing
/// subscriber (installed by the hosting runtime) in place.
fn enable_tracing() {
    let enabled = std::env::var("PULSE_LOG").ok().is_some_and(|v| v == "1");
    if !enabled {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_pulse=info,pulse=info,provider=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    enable_tracing();

    let cfg = PulseConfig::from_env().context("loading pulse config")?;
    tracing::info!(
        semantic = cfg.semantic_enabled(),
        enrichment = cfg.enrichment_enabled(),
        "pulse config loaded"
    );

    let store: Arc<dyn PulseStore> = Arc::new(InMemoryStore::new());
    let service = PulseService::new(PulsePipeline::from_config(cfg), Some(store));
    let metrics = Metrics::init()?;

    let router = create_router(AppState::new(service)).merge(metrics.router());
    Ok(router.into())
}
