//! Interest label → provider search query.
//!
//! Known interests map to boosted boolean queries; anything else falls back to
//! `"<interest> <region qualifier>"`. Pure, no I/O.

/// Preset table keyed by canonical interest name (matched case-insensitively).
const PRESETS: &[(&str, &str)] = &[
    (
        "ai",
        r#"("artificial intelligence" OR "generative AI" OR LLM OR "open source AI" OR OpenAI OR Anthropic OR "AI model")"#,
    ),
    (
        "technology",
        r#"(technology OR "big tech" OR smartphone OR software OR semiconductor OR "tech industry")"#,
    ),
    (
        "business",
        r#"(business OR earnings OR "mergers and acquisitions" OR startup OR "corporate results")"#,
    ),
    (
        "markets",
        r#"("stock market" OR stocks OR "bond yields" OR "Wall Street" OR Nasdaq OR "S&P 500")"#,
    ),
    (
        "finance",
        r#"(finance OR banking OR "central bank" OR "interest rates" OR inflation OR fintech)"#,
    ),
    (
        "economy",
        r#"(economy OR GDP OR inflation OR "jobs report" OR recession OR "trade policy")"#,
    ),
    (
        "politics",
        r#"(politics OR election OR parliament OR congress OR "prime minister" OR government)"#,
    ),
    (
        "world",
        r#"("world news" OR diplomacy OR conflict OR "united nations" OR summit OR geopolitics)"#,
    ),
    (
        "science",
        r#"(science OR research OR "scientists" OR space OR NASA OR physics OR biology)"#,
    ),
    (
        "health",
        r#"(health OR medicine OR "public health" OR vaccine OR hospital OR "clinical trial")"#,
    ),
    (
        "climate",
        r#"(climate OR "climate change" OR emissions OR "renewable energy" OR heatwave OR COP)"#,
    ),
    (
        "crypto",
        r#"(crypto OR bitcoin OR ethereum OR blockchain OR stablecoin OR "crypto regulation")"#,
    ),
    (
        "startups",
        r#"(startup OR "venture capital" OR funding OR "Series A" OR unicorn OR founders)"#,
    ),
    (
        "cybersecurity",
        r#"(cybersecurity OR ransomware OR "data breach" OR cyberattack OR vulnerability OR hackers)"#,
    ),
    (
        "sports",
        r#"(sports OR football OR cricket OR tennis OR basketball OR "world cup")"#,
    ),
    (
        "entertainment",
        r#"(entertainment OR movies OR music OR streaming OR "box office" OR celebrity)"#,
    ),
];

/// Build the provider query for one interest.
pub fn build_query(interest: &str, region_qualifier: &str) -> String {
    let key = interest.trim().to_lowercase();
    if let Some((_, q)) = PRESETS.iter().find(|(name, _)| *name == key) {
        return (*q).to_string();
    }
    let region = region_qualifier.trim();
    if region.is_empty() {
        interest.trim().to_string()
    } else {
        format!("{} {}", interest.trim(), region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_lookup_is_case_insensitive() {
        assert_eq!(build_query("AI", "news"), build_query("ai", "whatever"));
        assert!(build_query(" Ai ", "news").contains("artificial intelligence"));
        assert!(build_query("CRYPTO", "news").starts_with("(crypto OR"));
    }

    #[test]
    fn unknown_interest_falls_back_to_region_qualifier() {
        assert_eq!(build_query("Quantum Computing", "latest news"), "Quantum Computing latest news");
        assert_eq!(build_query("Quantum Computing", "  "), "Quantum Computing");
    }
}
