//! Semantic / neural search (Exa `/search`).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::histogram;
use serde::{Deserialize, Serialize};

use super::{bounded, ensure_success, http_client, SearchHit, SearchProvider};
use crate::config::PulseConfig;
use crate::error::ProviderError;
use crate::model::Provenance;
use crate::text::{clean_summary, iso, normalize_text, parse_timestamp};

const TEXT_MAX_CHARS: usize = 1_200;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequestBody<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(rename = "type")]
    kind: &'static str,
    category: &'static str,
    start_published_date: String,
    contents: Contents,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Contents {
    text: TextOptions,
    summary: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOptions {
    max_characters: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultRow {
    url: Option<String>,
    title: Option<String>,
    text: Option<String>,
    summary: Option<String>,
    published_date: Option<String>,
}

pub struct SemanticSearchProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    num_results: usize,
    lookback_hours: i64,
    summary_chars: usize,
    timeout: Duration,
}

impl SemanticSearchProvider {
    /// `None` when no API key is configured.
    pub fn from_config(cfg: &PulseConfig) -> Option<Self> {
        let key = cfg.semantic_api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        let timeout = cfg.request_timeout();
        Some(Self {
            client: http_client(timeout),
            endpoint: cfg.semantic_endpoint.clone(),
            api_key: key.to_string(),
            num_results: cfg.semantic_num_results.max(1),
            lookback_hours: cfg.lookback_hours.max(1),
            summary_chars: cfg.summary_chars,
            timeout,
        })
    }

    async fn post(&self, query: &str, now: DateTime<Utc>) -> Result<SearchResponse, ProviderError> {
        let since = chrono::Duration::try_hours(self.lookback_hours)
            .and_then(|d| now.checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let body = SearchRequestBody {
            query,
            num_results: self.num_results,
            kind: "auto",
            category: "news",
            start_published_date: iso(since),
            contents: Contents {
                text: TextOptions {
                    max_characters: TEXT_MAX_CHARS,
                },
                summary: true,
            },
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp, self.name()).await?;
        let raw = resp.text().await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl SearchProvider for SemanticSearchProvider {
    async fn search(
        &self,
        topic: &str,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let t0 = Instant::now();
        let parsed = bounded(self.timeout, self.post(query, now)).await?;
        let hits = hits_from_rows(parsed.results, self.summary_chars);
        histogram!("pulse_provider_ms", "provider" => self.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(target: "provider", topic, provider = self.name(), hits = hits.len(), "semantic search ok");
        Ok(hits)
    }

    fn provenance(&self) -> Provenance {
        Provenance::Semantic
    }

    fn name(&self) -> &'static str {
        "semantic"
    }
}

/// Validate rows at the boundary: rows without a title or URL are dropped.
fn hits_from_rows(rows: Vec<ResultRow>, summary_chars: usize) -> Vec<SearchHit> {
    rows.into_iter()
        .filter_map(|row| {
            let url = row.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
            let title = row.title.map(|t| normalize_text(&t)).filter(|t| !t.is_empty())?;
            let summary = row
                .summary
                .as_deref()
                .or(row.text.as_deref())
                .map(|s| clean_summary(s, summary_chars))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| title.clone());
            Some(SearchHit {
                title,
                summary,
                source: None,
                source_url: None,
                published_at: row.published_date.as_deref().and_then(parse_timestamp),
                url,
            })
        })
        .collect()
}
