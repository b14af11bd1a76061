//! # Trust Classifier
//!
//! Maps a publisher string (e.g. "Reuters", "www.bbc.co.uk", "Some Guy's Substack") to a
//! coarse reliability tier.
//!
//! - Input is normalized first: lowercase, dashes/underscores/slashes to spaces, collapsed.
//! - Patterns are evaluated in table order; the first match wins.
//! - Tier A: global wire services and financial press.
//! - Tier B: recognized national/regional outlets and established trade press.
//! - Tier C: blogs, forums, opinion-flagged sources.
//! - Anything else is `Unknown`.

use crate::model::TrustTier;
use once_cell::sync::Lazy;
use regex::Regex;

const TIER_TABLE: &[(TrustTier, &str)] = &[
    // Opinion flags outrank the outlet name: "Reuters Breakingviews opinion" is still opinion.
    (TrustTier::C, r"\b(opinion|op ed|editorial|commentary|sponsored|press release)\b"),
    (
        TrustTier::A,
        r"\b(reuters|associated press|ap news|apnews|bloomberg|financial times|ft com|wall street journal|wsj|the economist|economist com|bbc|afp|agence france presse|nikkei)\b",
    ),
    (
        TrustTier::B,
        r"\b(new york times|nytimes|washington post|washingtonpost|the guardian|theguardian|cnbc|cnn|npr|politico|axios|the hill|thehill|nbc news|nbcnews|abc news|cbs news|cbsnews|sky news|al jazeera|aljazeera|deutsche welle|dw com|le monde|the verge|theverge|techcrunch|wired|ars technica|arstechnica|engadget|zdnet|venturebeat|the information|forbes|fortune|business insider|businessinsider|marketwatch|barron s|barrons|the times of india|times of india|timesofindia|hindustan times|the hindu|thehindu|indian express|livemint|mint|economic times|economictimes|south china morning post|scmp|straits times|straitstimes|japan times|the atlantic|time com|los angeles times|latimes|usa today|usatoday|the independent|independent co uk|telegraph|sydney morning herald|abc net au|cbc)\b",
    ),
    (
        TrustTier::C,
        r"\b(blog|blogs|blogspot|wordpress|medium|substack|tumblr|reddit|forum|forums|quora|discussion|newsletter)\b",
    ),
];

static COMPILED: Lazy<Vec<(TrustTier, Regex)>> = Lazy::new(|| {
    TIER_TABLE
        .iter()
        .filter_map(|(tier, pat)| Regex::new(pat).ok().map(|re| (*tier, re)))
        .collect()
});

/// Classify a publisher/source string. Stateless and pure.
pub fn classify(source: &str) -> TrustTier {
    let s = normalize(source);
    if s.is_empty() {
        return TrustTier::Unknown;
    }
    COMPILED
        .iter()
        .find(|(_, re)| re.is_match(&s))
        .map(|(tier, _)| *tier)
        .unwrap_or(TrustTier::Unknown)
}

/// Fixed weight used by the confidence scorer.
pub fn tier_weight(tier: TrustTier) -> f64 {
    match tier {
        TrustTier::A => 1.0,
        TrustTier::B => 0.8,
        TrustTier::C => 0.58,
        TrustTier::Unknown => 0.45,
    }
}

/// Lowercase, turn separators and dots into spaces, collapse whitespace.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_lowercase();
    for ch in ['—', '–', '-', '_', '/', '\\', '.', '\'', '’', ','] {
        out = out.replace(ch, " ");
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
