// tests/common/mod.rs
//
// In-process provider doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use news_pulse::error::ProviderError;
use news_pulse::model::Provenance;
use news_pulse::providers::{ContentEnricher, ScrapedPage, SearchHit, SearchProvider};

#[derive(Clone)]
pub enum Outcome {
    Hits(Vec<SearchHit>),
    Status(u16),
    Timeout,
}

/// Scripted search provider: per-topic outcome, empty result for unknown topics.
pub struct MockSearch {
    name: &'static str,
    provenance: Provenance,
    script: HashMap<String, Outcome>,
    calls: Mutex<Vec<String>>,
    clocks: Mutex<Vec<DateTime<Utc>>>,
}

impl MockSearch {
    pub fn new(name: &'static str, provenance: Provenance) -> Self {
        Self {
            name,
            provenance,
            script: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            clocks: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, topic: &str, outcome: Outcome) -> Self {
        self.script.insert(topic.to_string(), outcome);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Run clocks seen by `search`, in call order.
    pub fn clocks(&self) -> Vec<DateTime<Utc>> {
        self.clocks.lock().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(
        &self,
        topic: &str,
        _query: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        self.calls.lock().push(topic.to_string());
        self.clocks.lock().push(now);
        match self.script.get(topic).cloned() {
            None => Ok(Vec::new()),
            Some(Outcome::Hits(h)) => Ok(h),
            Some(Outcome::Status(code)) => Err(ProviderError::Status {
                status: code,
                message: "upstream unavailable".into(),
            }),
            Some(Outcome::Timeout) => Err(ProviderError::Timeout(Duration::from_secs(10))),
        }
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Enricher that succeeds for URLs in `pages` and fails for everything else.
pub struct MockEnricher {
    pages: HashMap<String, ScrapedPage>,
    calls: Mutex<Vec<String>>,
}

impl MockEnricher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn page(mut self, url: &str, page: ScrapedPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ContentEnricher for MockEnricher {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, ProviderError> {
        self.calls.lock().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ProviderError::Parse("unsuccessful scrape".into()))
    }

    fn name(&self) -> &'static str {
        "mock-enricher"
    }
}

pub fn hit(title: &str, url: &str, source: Option<&str>, published_at: DateTime<Utc>) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        summary: format!("{title} (summary)"),
        url: url.to_string(),
        source: source.map(String::from),
        source_url: None,
        published_at: Some(published_at),
    }
}
