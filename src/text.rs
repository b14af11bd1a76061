//! Text, URL and timestamp helpers shared by providers and the pipeline.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use url::Url;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static RE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9]{2,}").expect("token regex"));

/// Maximum number of derived keywords per article.
pub const MAX_KEYWORDS: usize = 8;

/// Stop-words dropped from keyword and trend mining (English, Spanish, French, German,
/// Portuguese, plus newsroom filler).
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // en
        "the", "and", "for", "with", "from", "that", "this", "are", "was", "were", "has",
        "have", "had", "its", "into", "over", "after", "before", "about", "amid", "than",
        "but", "not", "you", "your", "our", "their", "they", "them", "his", "her", "she",
        "who", "what", "when", "where", "why", "how", "will", "would", "can", "could",
        "should", "may", "might", "more", "most", "less", "new", "all", "any", "out", "off",
        "via", "per", "also", "just", "now", "get", "gets", "got", "one", "two", "three",
        "first", "last", "says", "said", "say", "year", "years", "week", "weeks", "day",
        "days", "today", "yesterday", "tomorrow", "news", "latest", "live", "update",
        "updates", "report", "reports", "here", "there", "some", "many", "much", "back",
        "being", "been", "does", "did", "done", "make", "makes", "made", "take", "takes",
        "under", "against", "between", "during", "while", "these", "those", "which", "again",
        "still", "why", "video", "watch", "photos", "top",
        // es
        "los", "las", "del", "una", "por", "para", "con", "que", "como", "sus", "más", "mas",
        "sobre", "entre", "pero", "este", "esta",
        // fr
        "les", "des", "une", "pour", "dans", "avec", "sur", "par", "qui", "est", "aux", "ses",
        "pas", "plus",
        // de
        "der", "die", "das", "und", "mit", "für", "fur", "von", "den", "dem", "ein", "eine",
        "ist", "auf", "nicht", "auch", "bei", "nach",
        // pt
        "dos", "das", "uma", "com", "não", "nao", "pelo", "pela",
    ]
    .into_iter()
    .collect()
});

/// Decode HTML entities, strip tags, normalize typographic quotes and collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();
    let stripped = RE_TAGS.replace_all(&decoded, " ");
    let quoted = stripped
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{00A0}', " ");
    RE_WS.replace_all(&quoted, " ").trim().to_string()
}

/// Cap `s` at `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// `normalize_text` followed by `truncate_chars`.
pub fn clean_summary(s: &str, max_chars: usize) -> String {
    truncate_chars(&normalize_text(s), max_chars)
}

/// Canonical form used as the dedup key: scheme + host + path, no query, no fragment,
/// no trailing slash (except the root path).
pub fn canonical_url(raw: &str) -> String {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(u) if u.host_str().is_some() => {
            let host = u.host_str().unwrap_or_default().to_ascii_lowercase();
            let mut path = u.path().to_string();
            while path.len() > 1 && path.ends_with('/') {
                path.pop();
            }
            if path == "/" {
                path.clear();
            }
            format!("{}://{}{}", u.scheme(), host, path)
        }
        _ => raw.split('#').next().unwrap_or_default().to_string(),
    }
}

/// Normalize a domain-ish string: lowercase, drop scheme, `www.`, path, port and trailing
/// dots. Returns an empty string when nothing host-like remains.
pub fn normalize_domain(raw: &str) -> String {
    let mut s = raw.trim().to_ascii_lowercase();
    if let Some(idx) = s.find("://") {
        s = s[idx + 3..].to_string();
    }
    if let Some(idx) = s.find(['/', '?', '#']) {
        s.truncate(idx);
    }
    if let Some(idx) = s.rfind('@') {
        s = s[idx + 1..].to_string();
    }
    if let Some(idx) = s.find(':') {
        s.truncate(idx);
    }
    let s = s.trim_end_matches('.');
    s.strip_prefix("www.").unwrap_or(s).to_string()
}

/// Publisher display name derived from a URL host when the provider gives none.
pub fn source_name_from_url(raw: &str) -> String {
    let d = normalize_domain(raw);
    if d.is_empty() {
        "Unknown".to_string()
    } else {
        d
    }
}

/// Deterministic short id: first 8 bytes of SHA-256 over the parts, hex-encoded.
pub fn stable_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update([0x1f]);
        }
        hasher.update(p.as_bytes());
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Article id from (topic, link, ordinal).
pub fn article_id(topic: &str, link: &str, ordinal: usize) -> String {
    stable_id(&[topic, link, &ordinal.to_string()])
}

/// Parse the timestamp shapes providers emit: RFC 3339, RFC 2822, bare `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// ISO-8601 with millisecond precision and `Z` suffix.
pub fn iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Alphanumeric tokens of length >= 3 starting with a letter, in order of appearance.
pub fn tokens(s: &str) -> impl Iterator<Item = &str> {
    RE_TOKEN.find_iter(s).map(|m| m.as_str())
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token.to_lowercase().as_str())
}

/// Lowercase, distinct, stop-word-free title keywords (at most `MAX_KEYWORDS`).
pub fn extract_keywords(title: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tok in tokens(title) {
        let lower = tok.to_lowercase();
        if STOP_WORDS.contains(lower.as_str()) || !seen.insert(lower.clone()) {
            continue;
        }
        out.push(lower);
        if out.len() == MAX_KEYWORDS {
            break;
        }
    }
    out
}
