//! Persistence collaborator: snapshots keyed by (owner, dateKey), per-owner source policy,
//! feedback votes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::StoreError;
use crate::feedback::{FeedbackSignal, FeedbackVote};
use crate::model::Snapshot;
use crate::policy::SourcePolicy;

#[async_trait]
pub trait PulseStore: Send + Sync {
    /// Idempotent: a second upsert for the same (owner, dateKey) replaces the first.
    async fn upsert_snapshot(&self, owner: &str, snapshot: &Snapshot) -> Result<(), StoreError>;
    /// Snapshots from the last `days` UTC days, newest first.
    async fn load_history(&self, owner: &str, days: u32) -> Result<Vec<Snapshot>, StoreError>;
    async fn load_source_policy(&self, owner: &str) -> Result<Option<SourcePolicy>, StoreError>;
    async fn save_source_policy(&self, owner: &str, policy: &SourcePolicy) -> Result<(), StoreError>;
    async fn record_feedback(&self, vote: FeedbackVote) -> Result<(), StoreError>;
    async fn load_feedback_signal(&self, owner: &str, days: u32) -> Result<FeedbackSignal, StoreError>;
}

#[derive(Default)]
struct Tables {
    snapshots: HashMap<(String, String), Snapshot>,
    policies: HashMap<String, SourcePolicy>,
    votes: Vec<FeedbackVote>,
}

/// Process-local store for the binary and tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> Result<T, StoreError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        Ok(f(&mut guard))
    }

    pub fn history_at(&self, owner: &str, days: u32, now: DateTime<Utc>) -> Result<Vec<Snapshot>, StoreError> {
        let cutoff = window_start(now, i64::from(days.max(1)) - 1).date_naive();
        self.with_tables(|t| {
            let mut out: Vec<Snapshot> = t
                .snapshots
                .iter()
                .filter(|((o, date_key), _)| {
                    o == owner
                        && NaiveDate::parse_from_str(date_key, "%Y-%m-%d")
                            .map(|d| d >= cutoff)
                            .unwrap_or(false)
                })
                .map(|(_, s)| s.clone())
                .collect();
            out.sort_by(|a, b| b.date_key.cmp(&a.date_key));
            out
        })
    }

    pub fn feedback_at(&self, owner: &str, days: u32, now: DateTime<Utc>) -> Result<FeedbackSignal, StoreError> {
        let cutoff = window_start(now, i64::from(days.max(1)));
        self.with_tables(|t| {
            FeedbackSignal::from_votes(
                t.votes
                    .iter()
                    .filter(|v| v.owner_key == owner && v.created_at >= cutoff),
            )
        })
    }
}

/// `now - days`, or no cutoff at all when the window reaches past the representable range.
fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[async_trait]
impl PulseStore for InMemoryStore {
    async fn upsert_snapshot(&self, owner: &str, snapshot: &Snapshot) -> Result<(), StoreError> {
        if owner.trim().is_empty() {
            return Err(StoreError::Rejected("empty owner key".to_string()));
        }
        self.with_tables(|t| {
            t.snapshots
                .insert((owner.to_string(), snapshot.date_key.clone()), snapshot.clone());
        })
    }

    async fn load_history(&self, owner: &str, days: u32) -> Result<Vec<Snapshot>, StoreError> {
        self.history_at(owner, days, Utc::now())
    }

    async fn load_source_policy(&self, owner: &str) -> Result<Option<SourcePolicy>, StoreError> {
        self.with_tables(|t| t.policies.get(owner).cloned())
    }

    async fn save_source_policy(&self, owner: &str, policy: &SourcePolicy) -> Result<(), StoreError> {
        let normalized = policy.normalized();
        self.with_tables(|t| {
            t.policies.insert(owner.to_string(), normalized);
        })
    }

    async fn record_feedback(&self, vote: FeedbackVote) -> Result<(), StoreError> {
        if vote.article_id.trim().is_empty() {
            return Err(StoreError::Rejected("feedback vote without article id".to_string()));
        }
        self.with_tables(|t| t.votes.push(vote))
    }

    async fn load_feedback_signal(&self, owner: &str, days: u32) -> Result<FeedbackSignal, StoreError> {
        self.feedback_at(owner, days, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::VoteDirection;
    use crate::model::{ProviderTag, Quality};
    use chrono::TimeZone;

    fn snap(date_key: &str, id: &str) -> Snapshot {
        Snapshot {
            id: id.into(),
            date_key: date_key.into(),
            generated_at: format!("{date_key}T08:00:00.000Z"),
            interests: vec!["AI".into()],
            categories: vec![],
            trends: vec![],
            source_coverage: vec![],
            notes: vec![],
            provider: ProviderTag::Fallback,
            quality: Quality {
                scoring_version: "confidence-v1".into(),
                feedback_signals: 0,
                allow_domains: vec![],
                deny_domains: vec![],
            },
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_same_day() {
        let store = InMemoryStore::new();
        store.upsert_snapshot("me", &snap("2026-10-19", "first")).await.unwrap();
        store.upsert_snapshot("me", &snap("2026-10-19", "second")).await.unwrap();
        store.upsert_snapshot("me", &snap("2026-10-18", "yesterday")).await.unwrap();
        store.upsert_snapshot("other", &snap("2026-10-19", "theirs")).await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let hist = store.history_at("me", 7, now).unwrap();
        let ids: Vec<_> = hist.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "yesterday"]);

        let today_only = store.history_at("me", 1, now).unwrap();
        assert_eq!(today_only.len(), 1);
    }

    #[tokio::test]
    async fn empty_owner_is_rejected() {
        let store = InMemoryStore::new();
        let err = store.upsert_snapshot("  ", &snap("2026-10-19", "x")).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
    }

    #[tokio::test]
    async fn policy_is_normalized_on_save() {
        let store = InMemoryStore::new();
        assert_eq!(store.load_source_policy("me").await.unwrap(), None);
        let raw = SourcePolicy {
            allow_domains: vec!["https://www.Reuters.com/".into()],
            deny_domains: vec![],
        };
        store.save_source_policy("me", &raw).await.unwrap();
        let got = store.load_source_policy("me").await.unwrap().unwrap();
        assert_eq!(got.allow_domains, vec!["reuters.com"]);
    }

    #[tokio::test]
    async fn feedback_window_and_owner_scoping() {
        let store = InMemoryStore::new();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let vote = |owner: &str, age_days: i64, dir| FeedbackVote {
            owner_key: owner.into(),
            article_id: "a1".into(),
            domain: "reuters.com".into(),
            category: "AI".into(),
            keywords: vec!["glm".into()],
            direction: dir,
            created_at: now - Duration::days(age_days),
        };
        store.record_feedback(vote("me", 1, VoteDirection::Up)).await.unwrap();
        store.record_feedback(vote("me", 40, VoteDirection::Down)).await.unwrap();
        store.record_feedback(vote("you", 1, VoteDirection::Down)).await.unwrap();

        let sig = store.feedback_at("me", 30, now).unwrap();
        assert_eq!(sig.total_signals(), 1);
        assert_eq!(sig.domain_bias("reuters.com"), 1.0);
    }

    #[tokio::test]
    async fn huge_windows_mean_no_cutoff() {
        let store = InMemoryStore::new();
        store.upsert_snapshot("me", &snap("2026-10-19", "today")).await.unwrap();
        store.upsert_snapshot("me", &snap("1999-01-01", "ancient")).await.unwrap();
        store
            .record_feedback(FeedbackVote {
                owner_key: "me".into(),
                article_id: "a1".into(),
                domain: "reuters.com".into(),
                category: "AI".into(),
                keywords: vec![],
                direction: VoteDirection::Up,
                created_at: Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap(),
            })
            .await
            .unwrap();

        let hist = store.load_history("me", u32::MAX).await.unwrap();
        assert_eq!(hist.len(), 2);
        let sig = store.load_feedback_signal("me", u32::MAX).await.unwrap();
        assert_eq!(sig.total_signals(), 1);
        let sig = store.load_feedback_signal("me", 200_000_000).await.unwrap();
        assert_eq!(sig.total_signals(), 1);
    }
}
