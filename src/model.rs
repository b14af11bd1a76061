//! Snapshot data model: articles, citations, topic categories, trends, coverage.
//!
//! Everything here serializes to the camelCase JSON shape consumed by the persistence
//! collaborator and the HTTP surface.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse reliability tier derived from the publisher string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrustTier {
    A,
    B,
    C,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrustTier::A => "A",
            TrustTier::B => "B",
            TrustTier::C => "C",
            TrustTier::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Which discovery path produced (or last touched) an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderTag {
    #[serde(rename = "RSS")]
    Rss,
    #[serde(rename = "SEMANTIC")]
    Semantic,
    #[serde(rename = "SEMANTIC+ENRICHED")]
    SemanticEnriched,
    #[serde(rename = "MIXED")]
    Mixed,
    #[serde(rename = "FALLBACK")]
    Fallback,
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderTag::Rss => "RSS",
            ProviderTag::Semantic => "SEMANTIC",
            ProviderTag::SemanticEnriched => "SEMANTIC+ENRICHED",
            ProviderTag::Mixed => "MIXED",
            ProviderTag::Fallback => "FALLBACK",
        };
        f.write_str(s)
    }
}

/// Provenance of one citation. Distinct values count towards corroboration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Provenance {
    Rss,
    Semantic,
    Enrichment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
}

/// One piece of evidence backing an article. The list only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    pub retrieved_at: String,
    pub provider: Provenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub published_at: String,
    pub trust_tier: TrustTier,
    pub category: String,
    pub provider: ProviderTag,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub domain: String,
    pub confidence_score: f64,
    pub confidence_label: ConfidenceLabel,
    #[serde(default)]
    pub confidence_reasons: Vec<String>,
    pub relevance_bias: f64,
}

/// Result for one interest topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    pub query: String,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSignal {
    pub label: String,
    pub count: u32,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCoverage {
    pub source: String,
    pub tier: TrustTier,
    pub count: u32,
}

/// Scoring provenance: version tag plus the effective inputs that shaped the scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quality {
    pub scoring_version: String,
    pub feedback_signals: u64,
    pub allow_domains: Vec<String>,
    pub deny_domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    /// UTC calendar day, `YYYY-MM-DD`.
    pub date_key: String,
    pub generated_at: String,
    pub interests: Vec<String>,
    pub categories: Vec<Category>,
    pub trends: Vec<TrendSignal>,
    pub source_coverage: Vec<SourceCoverage>,
    pub notes: Vec<String>,
    pub provider: ProviderTag,
    pub quality: Quality,
}
