//! Confidence scoring.
//!
//! Four normalized signals in [0,1]:
//! - `trust`         : fixed weight of the publisher's trust tier
//! - `freshness`     : `exp(-age_hours / 72)`, or a neutral 0.4 for unparseable dates
//! - `corroboration` : `(citations + distinct providers) / 6`
//! - `feedback`      : blended historical bias in [-1,1] remapped to [0,1]
//!
//! Composite = 100 * (0.50 trust + 0.22 freshness + 0.18 corroboration + 0.10 feedback),
//! rounded to one decimal. Pure: re-derivable from the stored article fields.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::feedback::FeedbackSignal;
use crate::model::{Article, Citation, ConfidenceLabel};
use crate::text::parse_timestamp;
use crate::trust::tier_weight;

/// Bump when weights or signal definitions change.
pub const SCORING_VERSION: &str = "confidence-v1";

const W_TRUST: f64 = 0.50;
const W_FRESHNESS: f64 = 0.22;
const W_CORROBORATION: f64 = 0.18;
const W_FEEDBACK: f64 = 0.10;

const FRESHNESS_DECAY_HOURS: f64 = 72.0;
const NEUTRAL_FRESHNESS: f64 = 0.4;
const CORROBORATION_SATURATION: f64 = 6.0;

pub const HIGH_THRESHOLD: f64 = 80.0;
pub const MEDIUM_THRESHOLD: f64 = 60.0;

/// Normalized inputs in [0,1] (feedback bias in [-1,1]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreInputs {
    pub trust: f64,
    pub freshness: f64,
    pub corroboration: f64,
    pub feedback_bias: f64,
}

impl ScoreInputs {
    /// Safe constructor with clamping.
    pub fn new(trust: f64, freshness: f64, corroboration: f64, feedback_bias: f64) -> Self {
        Self {
            trust: clamp01(trust),
            freshness: clamp01(freshness),
            corroboration: clamp01(corroboration),
            feedback_bias: feedback_bias.clamp(-1.0, 1.0),
        }
    }

    /// Bias remapped from [-1,1] to [0,1]; 0.5 is neutral.
    pub fn feedback_normalized(&self) -> f64 {
        (self.feedback_bias + 1.0) / 2.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreBreakdown {
    pub inputs: ScoreInputs,
    pub score: f64,
    pub label: ConfidenceLabel,
    pub reasons: Vec<String>,
}

pub fn freshness(published_at: &str, now: DateTime<Utc>) -> f64 {
    match parse_timestamp(published_at) {
        Some(ts) => {
            let age_hours = (now - ts).num_seconds() as f64 / 3600.0;
            clamp01((-age_hours / FRESHNESS_DECAY_HOURS).exp())
        }
        None => NEUTRAL_FRESHNESS,
    }
}

pub fn distinct_providers(citations: &[Citation]) -> usize {
    citations.iter().map(|c| c.provider).collect::<HashSet<_>>().len()
}

pub fn corroboration(citations: &[Citation]) -> f64 {
    let raw = (citations.len() + distinct_providers(citations)) as f64;
    clamp01(raw / CORROBORATION_SATURATION)
}

pub fn composite(inputs: &ScoreInputs) -> f64 {
    let raw = W_TRUST * inputs.trust
        + W_FRESHNESS * inputs.freshness
        + W_CORROBORATION * inputs.corroboration
        + W_FEEDBACK * inputs.feedback_normalized();
    round1((100.0 * raw).clamp(0.0, 100.0))
}

pub fn label_for(score: f64) -> ConfidenceLabel {
    if score >= HIGH_THRESHOLD {
        ConfidenceLabel::High
    } else if score >= MEDIUM_THRESHOLD {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    }
}

/// Derive all inputs from the article's stored fields and compute the breakdown.
pub fn score_article(article: &Article, signal: &FeedbackSignal, now: DateTime<Utc>) -> ScoreBreakdown {
    let bias = signal.bias_for(&article.domain, &article.category, &article.keywords);
    let inputs = ScoreInputs::new(
        tier_weight(article.trust_tier),
        freshness(&article.published_at, now),
        corroboration(&article.citations),
        bias,
    );
    let score = composite(&inputs);

    let mut reasons = vec![
        format!("Trust tier {}", article.trust_tier),
        format!("Freshness {}%", pct(inputs.freshness)),
        format!(
            "Corroboration {}% ({} citations, {} providers)",
            pct(inputs.corroboration),
            article.citations.len(),
            distinct_providers(&article.citations)
        ),
    ];
    if !signal.is_empty() {
        reasons.push(format!("Feedback {}%", pct(inputs.feedback_normalized())));
    }

    ScoreBreakdown {
        inputs,
        score,
        label: label_for(score),
        reasons,
    }
}

/// Score in place: writes score, label, reasons and relevance bias.
pub fn apply_score(article: &mut Article, signal: &FeedbackSignal, now: DateTime<Utc>) {
    let b = score_article(article, signal, now);
    article.confidence_score = b.score;
    article.confidence_label = b.label;
    article.confidence_reasons = b.reasons;
    article.relevance_bias = b.inputs.feedback_bias;
}

/// Confidence desc, then publish time desc (unparseable dates last).
pub fn rank(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.confidence_score
            .total_cmp(&a.confidence_score)
            .then_with(|| parse_timestamp(&b.published_at).cmp(&parse_timestamp(&a.published_at)))
    });
}

fn pct(x: f64) -> i64 {
    (x * 100.0).round() as i64
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
