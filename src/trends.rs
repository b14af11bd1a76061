//! Cross-topic trend extraction over article titles.
//!
//! Two strategies feed one bucket map keyed by label:
//! 1. alias table: canonical labels matched by lowercase substrings
//! 2. generic mining: tokens (>= 3 chars, leading letter) minus stop-words
//!
//! A label counts at most once per title. Buckets below `MIN_TREND_COUNT` are dropped;
//! the rest are ranked by count desc, label asc, and capped at `MAX_TRENDS`.

use std::collections::{BTreeSet, HashMap};

use crate::model::TrendSignal;
use crate::text::{is_stop_word, tokens};

pub const MIN_TREND_COUNT: u32 = 2;
pub const MAX_TRENDS: usize = 12;
pub const MAX_TREND_CATEGORIES: usize = 3;

const ALIASES: &[(&str, &[&str])] = &[
    ("GLM-5", &["glm-5", "glm 5", "glm5"]),
    (
        "Open Source AI",
        &["open source ai", "open-source ai", "open source model", "open-source model", "open-weight", "open weights"],
    ),
    ("OpenAI", &["openai", "chatgpt", "gpt-5"]),
    ("AI Regulation", &["ai act", "ai regulation", "ai safety", "ai rules"]),
    ("Semiconductors", &["semiconductor", "chipmaker", "chip export", "chips act"]),
    ("Interest Rates", &["interest rate", "rate cut", "rate hike", "rate decision"]),
    ("Inflation", &["inflation", "consumer prices", "cpi "]),
    ("Tariffs", &["tariff", "trade war"]),
    ("Earnings", &["earnings", "quarterly results", "quarterly profit"]),
    ("Layoffs", &["layoff", "job cuts", "lays off"]),
    ("IPO", &["ipo", "initial public offering"]),
    ("Elections", &["election", "polls open", "ballot"]),
    ("Crypto", &["bitcoin", "crypto", "ethereum", "stablecoin"]),
    ("Climate", &["climate", "emissions", "heatwave"]),
    ("Cybersecurity", &["cyberattack", "ransomware", "data breach", "hackers"]),
];

#[derive(Default)]
struct Bucket {
    count: u32,
    categories: Vec<String>,
}

/// Extract trends from (title, category) pairs.
pub fn extract_trends<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<TrendSignal> {
    let mut buckets: HashMap<String, Bucket> = HashMap::new();

    for (title, category) in items {
        for label in labels_for_title(title) {
            let b = buckets.entry(label).or_default();
            b.count += 1;
            if b.categories.len() < MAX_TREND_CATEGORIES && !b.categories.iter().any(|c| c == category)
            {
                b.categories.push(category.to_string());
            }
        }
    }

    let mut out: Vec<TrendSignal> = buckets
        .into_iter()
        .filter(|(_, b)| b.count >= MIN_TREND_COUNT)
        .map(|(label, b)| TrendSignal {
            label,
            count: b.count,
            categories: b.categories,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out.truncate(MAX_TRENDS);
    out
}

/// Distinct labels produced by both strategies for one title.
fn labels_for_title(title: &str) -> BTreeSet<String> {
    let lower = title.to_lowercase();
    let mut labels = BTreeSet::new();

    for (label, aliases) in ALIASES {
        if aliases.iter().any(|a| lower.contains(a)) {
            labels.insert((*label).to_string());
        }
    }

    for tok in tokens(title) {
        if is_stop_word(tok) {
            continue;
        }
        labels.insert(display_label(tok));
    }
    labels
}

/// All-caps and mixed-case tokens are kept; single-case lowercase tokens are title-cased.
fn display_label(tok: &str) -> String {
    let has_upper_after_first = tok.chars().skip(1).any(|c| c.is_uppercase());
    let first_upper = tok.chars().next().is_some_and(|c| c.is_uppercase());
    if has_upper_after_first || first_upper {
        return tok.to_string();
    }
    let mut chars = tok.chars();
    match chars.next() {
        Some(f) => f.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
