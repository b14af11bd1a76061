// src/config.rs
//! Pipeline configuration value object.
//!
//! The pipeline never reads the process environment; the binary builds a `PulseConfig`
//! (TOML file + API keys from env) once and passes it in.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "PULSE_CONFIG_PATH";
pub const ENV_SEMANTIC_API_KEY: &str = "EXA_API_KEY";
pub const ENV_ENRICHMENT_API_KEY: &str = "FIRECRAWL_API_KEY";
pub const DEFAULT_CONFIG_PATH: &str = "config/pulse.toml";

/// Upper bound on interests accepted per run.
pub const MAX_INTERESTS: usize = 12;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Appended to interests without a preset query.
    pub region_qualifier: String,
    pub feed_endpoint: String,
    /// Feed-search locale parameters (`hl`, `gl`, `ceid`).
    pub feed_language: String,
    pub feed_country: String,
    pub feed_edition: String,
    pub semantic_endpoint: String,
    pub semantic_api_key: Option<String>,
    pub enrichment_endpoint: String,
    pub enrichment_api_key: Option<String>,
    pub request_timeout_ms: u64,
    /// Feed search runs only when semantic search returns fewer results than this.
    pub semantic_min_results: usize,
    pub semantic_num_results: usize,
    pub enrich_top_n: usize,
    pub max_articles_per_topic: usize,
    pub summary_chars: usize,
    pub evidence_chars: usize,
    /// Semantic search lookback window.
    pub lookback_hours: i64,
    pub default_interests: Vec<String>,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            region_qualifier: "latest news".to_string(),
            feed_endpoint: "https://news.google.com/rss/search".to_string(),
            feed_language: "en-US".to_string(),
            feed_country: "US".to_string(),
            feed_edition: "US:en".to_string(),
            semantic_endpoint: "https://api.exa.ai/search".to_string(),
            semantic_api_key: None,
            enrichment_endpoint: "https://api.firecrawl.dev/v1/scrape".to_string(),
            enrichment_api_key: None,
            request_timeout_ms: 10_000,
            semantic_min_results: 5,
            semantic_num_results: 10,
            enrich_top_n: 2,
            max_articles_per_topic: 8,
            summary_chars: 320,
            evidence_chars: 220,
            lookback_hours: 72,
            default_interests: ["AI", "Technology", "Business", "World"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl PulseConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn semantic_enabled(&self) -> bool {
        self.semantic_api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn enrichment_enabled(&self) -> bool {
        self.enrichment_api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing pulse config toml")
    }

    /// Load from an explicit TOML path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pulse config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolve config for the binary:
    /// 1) $PULSE_CONFIG_PATH (must exist)
    /// 2) config/pulse.toml
    /// 3) built-in defaults
    ///
    /// then overlay API keys from $EXA_API_KEY / $FIRECRAWL_API_KEY.
    pub fn from_env() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                Self::load_from(&default_path)?
            } else {
                Self::default()
            }
        };

        if let Some(k) = non_empty_env(ENV_SEMANTIC_API_KEY) {
            cfg.semantic_api_key = Some(k);
        }
        if let Some(k) = non_empty_env(ENV_ENRICHMENT_API_KEY) {
            cfg.enrichment_api_key = Some(k);
        }
        Ok(cfg)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim, collapse whitespace, drop case-insensitive duplicates and cap at `MAX_INTERESTS`.
/// An empty result is replaced by `defaults`.
pub fn sanitize_interests<S: AsRef<str>>(raw: &[S], defaults: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for it in raw {
        let cleaned = it.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() || !seen.insert(cleaned.to_lowercase()) {
            continue;
        }
        out.push(cleaned);
        if out.len() == MAX_INTERESTS {
            break;
        }
    }
    if out.is_empty() {
        return defaults.to_vec();
    }
    out
}
