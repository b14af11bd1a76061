//! Randomized scoring invariants (seeded, deterministic).
//!
//! - score always in [0, 100] with one decimal
//! - label matches the 80 / 60 thresholds
//! - fresher beats older when everything else is equal
//! - feedback moves the score by at most 5 points either way

use chrono::{Duration, TimeZone, Utc};
use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};

use news_pulse::feedback::{CategoryKey, DomainKey, FeedbackSignal, KeywordKey};
use news_pulse::model::{
    Article, Citation, ConfidenceLabel, Provenance, ProviderTag, TrustTier,
};
use news_pulse::scoring::{composite, label_for, score_article, ScoreInputs};
use news_pulse::text::iso;

const TIERS: [TrustTier; 4] = [TrustTier::A, TrustTier::B, TrustTier::C, TrustTier::Unknown];
const PROVS: [Provenance; 3] = [Provenance::Rss, Provenance::Semantic, Provenance::Enrichment];

fn article(tier: TrustTier, published_at: String, citations: Vec<Citation>) -> Article {
    Article {
        id: "x".into(),
        title: "Central bank holds rates".into(),
        summary: String::new(),
        url: "https://example.com/a".into(),
        source: "Example".into(),
        source_url: None,
        published_at,
        trust_tier: tier,
        category: "Finance".into(),
        provider: ProviderTag::Mixed,
        citations,
        keywords: vec!["central".into(), "bank".into(), "rates".into()],
        domain: "example.com".into(),
        confidence_score: 0.0,
        confidence_label: ConfidenceLabel::Low,
        confidence_reasons: vec![],
        relevance_bias: 0.0,
    }
}

fn citation(p: Provenance) -> Citation {
    Citation {
        label: "Example".into(),
        url: "https://example.com/a".into(),
        publisher: None,
        published_at: None,
        retrieved_at: "2026-10-19T00:00:00.000Z".into(),
        provider: p,
        evidence: None,
    }
}

fn random_signal(rng: &mut StdRng) -> FeedbackSignal {
    FeedbackSignal::from_tables(
        [(DomainKey::new("example.com"), rng.random_range(-1.5..1.5))],
        [(CategoryKey::new("Finance"), rng.random_range(-1.0..1.0))],
        [(KeywordKey::new("rates"), rng.random_range(-1.0..1.0))],
        rng.random_range(0..20),
    )
}

#[test]
fn score_bounds_and_labels_hold_for_random_inputs() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

    for _ in 0..500 {
        let tier = *TIERS.choose(&mut rng).unwrap();
        let age_h = rng.random_range(-24i64..24 * 30);
        let n = rng.random_range(0..10usize);
        let cites = (0..n).map(|_| citation(*PROVS.choose(&mut rng).unwrap())).collect();
        let published = if rng.random_bool(0.1) {
            "garbage".to_string()
        } else {
            iso(now - Duration::hours(age_h))
        };
        let a = article(tier, published, cites);
        let signal = random_signal(&mut rng);

        let b = score_article(&a, &signal, now);
        assert!((0.0..=100.0).contains(&b.score), "score {}", b.score);
        assert_eq!((b.score * 10.0).round() / 10.0, b.score, "one decimal");
        assert_eq!(b.label, label_for(b.score));
        assert!((-1.0..=1.0).contains(&b.inputs.feedback_bias));
    }
}

#[test]
fn label_thresholds_are_inclusive_on_the_low_side() {
    assert_eq!(label_for(100.0), ConfidenceLabel::High);
    assert_eq!(label_for(80.0), ConfidenceLabel::High);
    assert_eq!(label_for(79.9), ConfidenceLabel::Medium);
    assert_eq!(label_for(60.0), ConfidenceLabel::Medium);
    assert_eq!(label_for(59.9), ConfidenceLabel::Low);
    assert_eq!(label_for(0.0), ConfidenceLabel::Low);
}

#[test]
fn fresher_never_scores_lower() {
    let mut rng = StdRng::seed_from_u64(42);
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

    for _ in 0..300 {
        let tier = *TIERS.choose(&mut rng).unwrap();
        let cites: Vec<Citation> = (0..rng.random_range(0..5usize))
            .map(|_| citation(*PROVS.choose(&mut rng).unwrap()))
            .collect();
        let newer_h = rng.random_range(0i64..200);
        let older_h = newer_h + rng.random_range(1i64..200);
        let signal = random_signal(&mut rng);

        let newer = article(tier, iso(now - Duration::hours(newer_h)), cites.clone());
        let older = article(tier, iso(now - Duration::hours(older_h)), cites);
        let s_new = score_article(&newer, &signal, now).score;
        let s_old = score_article(&older, &signal, now).score;
        assert!(s_new >= s_old, "newer {s_new} < older {s_old}");
    }
}

#[test]
fn feedback_contribution_is_bounded() {
    let base = ScoreInputs::new(0.8, 0.5, 0.5, 0.0);
    let up = ScoreInputs::new(0.8, 0.5, 0.5, 1.0);
    let down = ScoreInputs::new(0.8, 0.5, 0.5, -1.0);
    assert!((composite(&up) - composite(&base) - 5.0).abs() < 0.11);
    assert!((composite(&base) - composite(&down) - 5.0).abs() < 0.11);
    // out-of-range inputs are clamped
    assert_eq!(composite(&ScoreInputs::new(3.0, 3.0, 3.0, 3.0)), 100.0);
    assert_eq!(composite(&ScoreInputs::new(-1.0, -1.0, -1.0, -3.0)), 0.0);
}

#[test]
fn zero_signal_is_neutral() {
    let now = Utc::now();
    let a = article(TrustTier::A, iso(now), vec![citation(Provenance::Rss)]);
    let empty = score_article(&a, &FeedbackSignal::empty(), now);
    let zero_votes = FeedbackSignal::from_tables(
        [(DomainKey::new("example.com"), 1.0)],
        Vec::<(CategoryKey, f64)>::new(),
        Vec::<(KeywordKey, f64)>::new(),
        0,
    );
    let zero = score_article(&a, &zero_votes, now);
    assert_eq!(empty.score, zero.score);
    assert_eq!(zero.inputs.feedback_normalized(), 0.5);
}
