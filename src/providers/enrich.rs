//! Content enrichment via a scrape endpoint (Firecrawl `/v1/scrape`).

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{bounded, ensure_success, http_client, ContentEnricher, ScrapedPage};
use crate::config::PulseConfig;
use crate::error::ProviderError;
use crate::text::{clean_summary, normalize_text, parse_timestamp};

static RE_MD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("markdown link regex"));
static RE_MD_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(#{1,6}|>|[-*+]\s)|[*_`~|]+").expect("markdown markup regex"));

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    #[serde(default)]
    metadata: ScrapeMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeMetadata {
    title: Option<String>,
    description: Option<String>,
    og_description: Option<String>,
    published_time: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequestBody<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    only_main_content: bool,
    timeout: u64,
}

pub struct EnrichmentClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    summary_chars: usize,
    evidence_chars: usize,
    timeout: Duration,
}

impl EnrichmentClient {
    /// `None` when no API key is configured.
    pub fn from_config(cfg: &PulseConfig) -> Option<Self> {
        let key = cfg.enrichment_api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        let timeout = cfg.request_timeout();
        Some(Self {
            client: http_client(timeout),
            endpoint: cfg.enrichment_endpoint.clone(),
            api_key: key.to_string(),
            summary_chars: cfg.summary_chars,
            evidence_chars: cfg.evidence_chars,
            timeout,
        })
    }

    async fn post(&self, url: &str) -> Result<String, ProviderError> {
        let body = ScrapeRequestBody {
            url,
            formats: ["markdown"],
            only_main_content: true,
            timeout: self.timeout.as_millis() as u64,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp, self.name()).await?;
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl ContentEnricher for EnrichmentClient {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, ProviderError> {
        let raw = bounded(self.timeout, self.post(url)).await?;
        parse_scrape(&raw, self.summary_chars, self.evidence_chars)
    }

    fn name(&self) -> &'static str {
        "enrichment"
    }
}

/// Map a scrape payload to a page. `success: false` or a missing `data` object is a parse
/// failure; empty fields become `None`.
pub fn parse_scrape(
    raw: &str,
    summary_chars: usize,
    evidence_chars: usize,
) -> Result<ScrapedPage, ProviderError> {
    let resp: ScrapeResponse = serde_json::from_str(raw)?;
    let data = match (resp.success, resp.data) {
        (true, Some(d)) => d,
        (_, _) => {
            let reason = resp.error.unwrap_or_else(|| "unsuccessful scrape".to_string());
            return Err(ProviderError::Parse(reason));
        }
    };

    let meta = data.metadata;
    let body_text = data.markdown.as_deref().map(markdown_to_text).unwrap_or_default();
    let summary = meta
        .description
        .or(meta.og_description)
        .map(|d| clean_summary(&d, summary_chars))
        .filter(|d| !d.is_empty())
        .or_else(|| non_empty(clean_summary(&body_text, summary_chars)));

    Ok(ScrapedPage {
        title: meta.title.map(|t| normalize_text(&t)).filter(|t| !t.is_empty()),
        summary,
        excerpt: non_empty(clean_summary(&body_text, evidence_chars)),
        published_at: meta.published_time.as_deref().and_then(parse_timestamp),
    })
}

fn markdown_to_text(md: &str) -> String {
    let unlinked = RE_MD_LINK.replace_all(md, "$1");
    let plain = RE_MD_MARKUP.replace_all(&unlinked, " ");
    normalize_text(&plain)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
