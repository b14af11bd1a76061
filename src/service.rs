//! Owner-scoped wrapper around the pipeline: loads policy and feedback from the store,
//! runs, persists. Store trouble only ever becomes a note.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::model::Snapshot;
use crate::pipeline::{PulsePipeline, PulseRequest};
use crate::store::PulseStore;

/// Feedback votes older than this are ignored when building the signal.
pub const FEEDBACK_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseRun {
    pub snapshot: Snapshot,
    pub latency_ms: u64,
    pub persisted: bool,
}

#[derive(Clone)]
pub struct PulseService {
    pipeline: PulsePipeline,
    store: Option<Arc<dyn PulseStore>>,
}

impl PulseService {
    pub fn new(pipeline: PulsePipeline, store: Option<Arc<dyn PulseStore>>) -> Self {
        Self { pipeline, store }
    }

    pub fn store(&self) -> Option<&Arc<dyn PulseStore>> {
        self.store.as_ref()
    }

    pub async fn run(&self, owner: &str, interests: Vec<String>) -> PulseRun {
        let mut notes = Vec::new();
        let mut req = PulseRequest {
            interests,
            ..PulseRequest::default()
        };

        if let Some(store) = &self.store {
            match store.load_source_policy(owner).await {
                Ok(policy) => req.source_policy = policy,
                Err(e) => {
                    warn!(target: "pulse", owner, error = %e, "source policy load failed");
                    notes.push(format!("source policy unavailable: {e}"));
                }
            }
            match store.load_feedback_signal(owner, FEEDBACK_WINDOW_DAYS).await {
                Ok(signal) => req.feedback_signal = Some(signal),
                Err(e) => {
                    warn!(target: "pulse", owner, error = %e, "feedback signal load failed");
                    notes.push(format!("feedback signal unavailable: {e}"));
                }
            }
        }

        let out = self.pipeline.run(req).await;
        let mut snapshot = out.snapshot;
        snapshot.notes.extend(notes);

        let persisted = match &self.store {
            None => {
                snapshot.notes.push("persist skipped: no store configured".to_string());
                false
            }
            Some(store) => match store.upsert_snapshot(owner, &snapshot).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(target: "pulse", owner, error = %e, "snapshot persist failed");
                    snapshot.notes.push(format!("persist skipped: {e}"));
                    false
                }
            },
        };

        PulseRun {
            snapshot,
            latency_ms: out.latency_ms,
            persisted,
        }
    }
}
