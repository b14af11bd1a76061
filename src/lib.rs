// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod model;
pub mod text;

// Discovery
pub mod providers;
pub mod query;

// Per-topic processing
pub mod feedback;
pub mod merge;
pub mod policy;
pub mod scoring;
pub mod trust;

// Cross-topic aggregation + orchestration
pub mod coverage;
pub mod pipeline;
pub mod trends;

// Collaborators and HTTP surface
pub mod api;
pub mod metrics;
pub mod service;
pub mod store;

pub use crate::api::create_router;
pub use crate::config::PulseConfig;
pub use crate::model::Snapshot;
pub use crate::pipeline::{PulseOutput, PulsePipeline, PulseRequest};
pub use crate::service::PulseService;
