//! Historical feedback signal: aggregated up/down vote bias per domain, category and
//! keyword. Built once per run (see `FeedbackSignal::from_votes`) and read-only afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::text::normalize_domain;

const DOMAIN_WEIGHT: f64 = 0.55;
const CATEGORY_WEIGHT: f64 = 0.30;
const KEYWORD_WEIGHT: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn value(self) -> f64 {
        match self {
            VoteDirection::Up => 1.0,
            VoteDirection::Down => -1.0,
        }
    }
}

/// One historical vote on an article, as recorded by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackVote {
    pub owner_key: String,
    pub article_id: String,
    pub domain: String,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub direction: VoteDirection,
    pub created_at: DateTime<Utc>,
}

/// Normalized table keys. Constructors lowercase/trim so lookups agree with writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainKey(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordKey(String);

impl DomainKey {
    pub fn new(domain: &str) -> Self {
        Self(normalize_domain(domain))
    }
}

impl CategoryKey {
    pub fn new(category: &str) -> Self {
        Self(category.trim().to_lowercase())
    }
}

impl KeywordKey {
    pub fn new(keyword: &str) -> Self {
        Self(keyword.trim().to_lowercase())
    }
}

/// Immutable bias tables, every value in [-1, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSignal {
    domains: HashMap<DomainKey, f64>,
    categories: HashMap<CategoryKey, f64>,
    keywords: HashMap<KeywordKey, f64>,
    total_signals: u64,
}

impl FeedbackSignal {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from explicit tables. Values are clamped to [-1, 1].
    pub fn from_tables(
        domains: impl IntoIterator<Item = (DomainKey, f64)>,
        categories: impl IntoIterator<Item = (CategoryKey, f64)>,
        keywords: impl IntoIterator<Item = (KeywordKey, f64)>,
        total_signals: u64,
    ) -> Self {
        Self {
            domains: domains.into_iter().map(|(k, v)| (k, clamp_bias(v))).collect(),
            categories: categories.into_iter().map(|(k, v)| (k, clamp_bias(v))).collect(),
            keywords: keywords.into_iter().map(|(k, v)| (k, clamp_bias(v))).collect(),
            total_signals,
        }
    }

    /// Aggregate votes: each key's bias is the mean vote value (+1 up, -1 down).
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a FeedbackVote>) -> Self {
        let mut domains: HashMap<DomainKey, (f64, u32)> = HashMap::new();
        let mut categories: HashMap<CategoryKey, (f64, u32)> = HashMap::new();
        let mut keywords: HashMap<KeywordKey, (f64, u32)> = HashMap::new();
        let mut total = 0u64;

        for v in votes {
            total += 1;
            let val = v.direction.value();
            bump(&mut domains, DomainKey::new(&v.domain), val);
            bump(&mut categories, CategoryKey::new(&v.category), val);
            for kw in &v.keywords {
                bump(&mut keywords, KeywordKey::new(kw), val);
            }
        }

        Self::from_tables(mean(domains), mean(categories), mean(keywords), total)
    }

    pub fn total_signals(&self) -> u64 {
        self.total_signals
    }

    pub fn is_empty(&self) -> bool {
        self.total_signals == 0
    }

    pub fn domain_bias(&self, domain: &str) -> f64 {
        self.domains.get(&DomainKey::new(domain)).copied().unwrap_or(0.0)
    }

    pub fn category_bias(&self, category: &str) -> f64 {
        self.categories.get(&CategoryKey::new(category)).copied().unwrap_or(0.0)
    }

    /// Mean over the given keywords; absent keywords count as 0.
    pub fn keyword_bias<S: AsRef<str>>(&self, keywords: &[S]) -> f64 {
        if keywords.is_empty() {
            return 0.0;
        }
        let sum: f64 = keywords
            .iter()
            .map(|k| self.keywords.get(&KeywordKey::new(k.as_ref())).copied().unwrap_or(0.0))
            .sum();
        sum / keywords.len() as f64
    }

    /// 55% domain + 30% category + 15% mean keyword bias, clamped to [-1, 1].
    /// Always 0 when the signal has no observations.
    pub fn bias_for<S: AsRef<str>>(&self, domain: &str, category: &str, keywords: &[S]) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let raw = DOMAIN_WEIGHT * self.domain_bias(domain)
            + CATEGORY_WEIGHT * self.category_bias(category)
            + KEYWORD_WEIGHT * self.keyword_bias(keywords);
        clamp_bias(raw)
    }
}

fn bump<K: std::hash::Hash + Eq>(map: &mut HashMap<K, (f64, u32)>, key: K, val: f64) {
    let e = map.entry(key).or_insert((0.0, 0));
    e.0 += val;
    e.1 += 1;
}

fn mean<K>(map: HashMap<K, (f64, u32)>) -> impl Iterator<Item = (K, f64)> {
    map.into_iter()
        .map(|(k, (sum, n))| (k, if n == 0 { 0.0 } else { sum / n as f64 }))
}

fn clamp_bias(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-1.0, 1.0)
    }
}
