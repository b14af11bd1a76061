use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use shuttle_axum::axum::{routing::get, Router};

static DESCRIBED: OnceCell<()> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if another recorder is already set.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe_series();
        Ok(Self { handle })
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// Register help text for every pulse series once per process.
pub fn describe_series() {
    DESCRIBED.get_or_init(|| {
        describe_counter!("pulse_runs_total", "Snapshot pipeline runs");
        describe_counter!("pulse_topics_total", "Topics processed across runs");
        describe_counter!("pulse_articles_total", "Articles emitted in snapshots");
        describe_counter!(
            "pulse_provider_errors_total",
            "Provider calls that failed (timeout, status, parse)"
        );
        describe_counter!("pulse_policy_filtered_total", "Items removed by source policy");
        describe_counter!("pulse_enrich_failures_total", "Enrichment attempts that failed");
        describe_histogram!("pulse_latency_ms", Unit::Milliseconds, "Pipeline wall-clock time");
        describe_histogram!("pulse_provider_ms", Unit::Milliseconds, "Successful provider call time");
        describe_gauge!("pulse_last_run_ts", Unit::Seconds, "Unix time of the last run");
    });
}
