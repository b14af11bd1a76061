// src/providers/mod.rs
//! Discovery and enrichment providers.
//!
//! Every outbound call goes through [`bounded`]: the whole request (send + body read) is
//! cancelled after the configured timeout and surfaces as `ProviderError::Timeout`.

pub mod enrich;
pub mod feed_search;
pub mod semantic_search;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ProviderError;
use crate::model::Provenance;

pub use enrich::EnrichmentClient;
pub use feed_search::FeedSearchProvider;
pub use semantic_search::SemanticSearchProvider;

const USER_AGENT: &str = "news-pulse/0.1 (+https://github.com/news-pulse)";

/// One validated search result row. Malformed rows never get this far.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Extracted page content from the enrichment provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedPage {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub excerpt: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for one topic. `topic` is the interest label, `query` the built query, `now`
    /// the run clock.
    async fn search(
        &self,
        topic: &str,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SearchHit>, ProviderError>;
    fn provenance(&self) -> Provenance;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait ContentEnricher: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, ProviderError>;
    fn name(&self) -> &'static str;
}

/// Shared client builder. The client-level timeout is only a backstop behind [`bounded`].
/// Falls back to a default client if the builder fails.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout.min(Duration::from_secs(4)))
        .timeout(timeout + Duration::from_secs(1))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Run `fut` under `timeout`; expiry drops the in-flight request.
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    }
}

/// Map a non-2xx response to `ProviderError::Status`, keeping a short body excerpt.
pub async fn ensure_success(
    resp: reqwest::Response,
    provider: &'static str,
) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message: String = body.chars().take(200).collect();
    Err(ProviderError::Status {
        status: status.as_u16(),
        message: if message.trim().is_empty() {
            format!("{provider} returned {status}")
        } else {
            message
        },
    })
}
