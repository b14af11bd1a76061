//! Public news-search feed (Google News RSS search).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use metrics::histogram;
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::{Captures, Regex};
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};
use url::Url;

use super::{bounded, ensure_success, http_client, SearchHit, SearchProvider};
use crate::config::PulseConfig;
use crate::error::ProviderError;
use crate::model::Provenance;
use crate::text::{clean_summary, normalize_text, parse_timestamp};

const XML_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

static RE_NAMED_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]{1,31});").expect("entity regex"));

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<ItemSource>,
}
#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "$text")]
    name: Option<String>,
}

pub struct FeedSearchProvider {
    client: reqwest::Client,
    endpoint: String,
    language: String,
    country: String,
    edition: String,
    timeout: Duration,
    summary_chars: usize,
}

impl FeedSearchProvider {
    pub fn new(cfg: &PulseConfig) -> Self {
        let timeout = cfg.request_timeout();
        Self {
            client: http_client(timeout),
            endpoint: cfg.feed_endpoint.clone(),
            language: cfg.feed_language.clone(),
            country: cfg.feed_country.clone(),
            edition: cfg.feed_edition.clone(),
            timeout,
            summary_chars: cfg.summary_chars,
        }
    }

    /// Search URL with `q`, `hl`, `gl` and `ceid` query parameters.
    pub fn request_url(&self, query: &str) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", query),
                ("hl", self.language.as_str()),
                ("gl", self.country.as_str()),
                ("ceid", self.edition.as_str()),
            ],
        )
        .map_err(|e| ProviderError::Parse(format!("invalid feed endpoint: {e}")))
    }

    async fn fetch(&self, url: Url) -> Result<String, ProviderError> {
        let resp = self.client.get(url).send().await?;
        let resp = ensure_success(resp, self.name()).await?;
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl SearchProvider for FeedSearchProvider {
    async fn search(
        &self,
        topic: &str,
        query: &str,
        _now: DateTime<Utc>,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        let url = self.request_url(query)?;
        let t0 = Instant::now();
        let body = bounded(self.timeout, self.fetch(url)).await?;
        let hits = parse_feed(&body, self.summary_chars)?;
        histogram!("pulse_provider_ms", "provider" => self.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(target: "provider", topic, provider = self.name(), hits = hits.len(), "feed search ok");
        Ok(hits)
    }

    fn provenance(&self) -> Provenance {
        Provenance::Rss
    }

    fn name(&self) -> &'static str {
        "feed"
    }
}

/// Parse an RSS search feed into validated hits. Items without a title or link are skipped.
pub fn parse_feed(xml: &str, summary_chars: usize) -> Result<Vec<SearchHit>, ProviderError> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).map_err(|e| ProviderError::Parse(format!("feed xml: {e}")))?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let raw_title = normalize_text(it.title.as_deref().unwrap_or_default());
        let link = it.link.as_deref().map(str::trim).unwrap_or_default();
        if raw_title.is_empty() || link.is_empty() {
            continue;
        }

        let (source_name, source_url) = match it.source {
            Some(s) => (
                s.name.map(|n| normalize_text(&n)).filter(|n| !n.is_empty()),
                s.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
            ),
            None => (None, None),
        };
        let (title, source) = split_publisher(&raw_title, source_name);

        let summary = it
            .description
            .as_deref()
            .map(|d| clean_summary(d, summary_chars))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| title.clone());

        out.push(SearchHit {
            title,
            summary,
            url: link.to_string(),
            source,
            source_url,
            published_at: it.pub_date.as_deref().and_then(parse_pub_date),
        });
    }
    Ok(out)
}

/// Feed titles read `"Headline - Publisher"`. Drop the suffix, using it as the publisher
/// when the item carries no `<source>`.
fn split_publisher(title: &str, source: Option<String>) -> (String, Option<String>) {
    match source {
        Some(src) => {
            let suffix = format!(" - {src}");
            let stripped = title.strip_suffix(suffix.as_str()).unwrap_or(title).trim();
            let t = if stripped.is_empty() { title } else { stripped };
            (t.to_string(), Some(src))
        }
        None => match title.rsplit_once(" - ") {
            Some((head, tail)) if !head.trim().is_empty() && !tail.trim().is_empty() => {
                (head.trim().to_string(), Some(tail.trim().to_string()))
            }
            _ => (title.to_string(), None),
        },
    }
}

fn parse_pub_date(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .or_else(|| parse_timestamp(ts))
}

/// Named HTML entities are not valid XML. Decode them up front, keeping the five XML
/// entities intact; anything unknown is escaped so it survives as literal text.
fn scrub_html_entities_for_xml(s: &str) -> String {
    let s = s
        .replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...");

    RE_NAMED_ENTITY
        .replace_all(&s, |caps: &Captures| {
            let name = &caps[1];
            if XML_ENTITIES.contains(&name) {
                return caps[0].to_string();
            }
            let decoded = html_escape::decode_html_entities(&caps[0]);
            if decoded == caps[0] {
                format!("&amp;{name};")
            } else {
                html_escape::encode_text(&decoded).into_owned()
            }
        })
        .into_owned()
}
