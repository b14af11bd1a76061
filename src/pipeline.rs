//! # Snapshot pipeline
//! Runs every interest as an independent tokio task (query → discover → merge → policy →
//! score → enrich → rank), joins them, then aggregates trends and coverage into one
//! `Snapshot`. Provider failures degrade a topic to partial or empty results plus a note;
//! they never fail the run.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use metrics::{counter, gauge, histogram};
use tracing::{debug, info, warn};

use crate::config::{sanitize_interests, PulseConfig};
use crate::coverage::aggregate_coverage;
use crate::feedback::FeedbackSignal;
use crate::merge::merge_articles;
use crate::model::{
    Article, Category, Citation, ConfidenceLabel, Provenance, ProviderTag, Quality, Snapshot,
};
use crate::policy::SourcePolicy;
use crate::providers::{
    ContentEnricher, EnrichmentClient, FeedSearchProvider, SearchHit, SearchProvider,
    SemanticSearchProvider,
};
use crate::query::build_query;
use crate::scoring::{apply_score, rank, SCORING_VERSION};
use crate::text::{
    article_id, canonical_url, extract_keywords, iso, normalize_domain, source_name_from_url,
    stable_id,
};
use crate::trends::extract_trends;
use crate::trust::classify;

/// Caller inputs for one run. Absent policy / signal behave as empty.
#[derive(Debug, Clone, Default)]
pub struct PulseRequest {
    pub interests: Vec<String>,
    pub source_policy: Option<SourcePolicy>,
    pub feedback_signal: Option<FeedbackSignal>,
}

#[derive(Debug, Clone)]
pub struct PulseOutput {
    pub snapshot: Snapshot,
    pub latency_ms: u64,
}

struct Providers {
    cfg: PulseConfig,
    feed: Arc<dyn SearchProvider>,
    semantic: Option<Arc<dyn SearchProvider>>,
    enricher: Option<Arc<dyn ContentEnricher>>,
}

/// Immutable per-run inputs shared by all topic tasks.
struct RunContext {
    policy: SourcePolicy,
    signal: FeedbackSignal,
    now: DateTime<Utc>,
}

struct TopicResult {
    category: Category,
    notes: Vec<String>,
}

#[derive(Clone)]
pub struct PulsePipeline {
    inner: Arc<Providers>,
}

impl PulsePipeline {
    /// Real HTTP providers; semantic search and enrichment only when their keys are set.
    pub fn from_config(cfg: PulseConfig) -> Self {
        let feed: Arc<dyn SearchProvider> = Arc::new(FeedSearchProvider::new(&cfg));
        let semantic = SemanticSearchProvider::from_config(&cfg)
            .map(|p| Arc::new(p) as Arc<dyn SearchProvider>);
        let enricher = EnrichmentClient::from_config(&cfg)
            .map(|e| Arc::new(e) as Arc<dyn ContentEnricher>);
        Self::with_providers(cfg, feed, semantic, enricher)
    }

    pub fn with_providers(
        cfg: PulseConfig,
        feed: Arc<dyn SearchProvider>,
        semantic: Option<Arc<dyn SearchProvider>>,
        enricher: Option<Arc<dyn ContentEnricher>>,
    ) -> Self {
        Self {
            inner: Arc::new(Providers {
                cfg,
                feed,
                semantic,
                enricher,
            }),
        }
    }

    pub async fn run(&self, req: PulseRequest) -> PulseOutput {
        self.run_at(req, Utc::now()).await
    }

    /// Same as [`run`](Self::run) with an explicit clock for scoring and ids.
    pub async fn run_at(&self, req: PulseRequest, now: DateTime<Utc>) -> PulseOutput {
        let t0 = Instant::now();
        let cfg = &self.inner.cfg;
        let interests = sanitize_interests(&req.interests[..], &cfg.default_interests);
        let policy = req.source_policy.map(|p| p.normalized()).unwrap_or_default();
        let signal = req.feedback_signal.unwrap_or_default();

        // 1) Run-level notes
        let mut notes = Vec::new();
        if self.inner.semantic.is_none() {
            notes.push("semantic search disabled: no API key configured".to_string());
        }
        if self.inner.enricher.is_none() {
            notes.push("enrichment disabled: no API key configured".to_string());
        }
        if !signal.is_empty() {
            notes.push(format!(
                "Feedback signal applied from {} vote(s)",
                signal.total_signals()
            ));
        }

        // 2) Fan out one task per topic, join in interest order
        let ctx = Arc::new(RunContext {
            policy: policy.clone(),
            signal,
            now,
        });
        let handles: Vec<_> = interests
            .iter()
            .cloned()
            .map(|topic| {
                let inner = Arc::clone(&self.inner);
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move { run_topic(inner, ctx, topic).await })
            })
            .collect();

        let mut categories = Vec::with_capacity(interests.len());
        for (topic, joined) in interests.iter().zip(join_all(handles).await) {
            match joined {
                Ok(res) => {
                    notes.extend(res.notes);
                    categories.push(res.category);
                }
                Err(e) => {
                    warn!(target: "pulse", topic = %topic, error = ?e, "topic task aborted");
                    notes.push(format!("{topic}: topic pipeline aborted: {e}"));
                    categories.push(Category {
                        name: topic.clone(),
                        query: build_query(topic, &cfg.region_qualifier),
                        articles: Vec::new(),
                    });
                }
            }
        }

        // 3) Cross-topic aggregation
        let all: Vec<&Article> = categories.iter().flat_map(|c| c.articles.iter()).collect();
        let trends = extract_trends(all.iter().map(|a| (a.title.as_str(), a.category.as_str())));
        let source_coverage = aggregate_coverage(all.iter().copied());
        let provider = dominant_provider(all.iter().copied());
        let article_count = all.len();

        let generated_at = iso(now);
        let date_key = now.format("%Y-%m-%d").to_string();
        let snapshot = Snapshot {
            id: stable_id(&[&date_key, &generated_at, &interests.join("|")]),
            date_key,
            generated_at,
            interests,
            categories,
            trends,
            source_coverage,
            notes,
            provider,
            quality: Quality {
                scoring_version: SCORING_VERSION.to_string(),
                feedback_signals: ctx.signal.total_signals(),
                allow_domains: policy.allow_domains,
                deny_domains: policy.deny_domains,
            },
        };

        let latency_ms = t0.elapsed().as_millis() as u64;
        counter!("pulse_runs_total").increment(1);
        counter!("pulse_topics_total").increment(snapshot.categories.len() as u64);
        counter!("pulse_articles_total").increment(article_count as u64);
        histogram!("pulse_latency_ms").record(latency_ms as f64);
        gauge!("pulse_last_run_ts").set(now.timestamp() as f64);
        info!(
            target: "pulse",
            topics = snapshot.categories.len(),
            articles = article_count,
            provider = %snapshot.provider,
            latency_ms,
            "pulse snapshot assembled"
        );

        PulseOutput {
            snapshot,
            latency_ms,
        }
    }
}

async fn run_topic(inner: Arc<Providers>, ctx: Arc<RunContext>, topic: String) -> TopicResult {
    let cfg = &inner.cfg;
    let query = build_query(&topic, &cfg.region_qualifier);
    let mut notes = Vec::new();
    let mut raw: Vec<Article> = Vec::new();

    // 1) Semantic first; the feed only when it came back short
    let mut semantic_hits = 0usize;
    if let Some(semantic) = &inner.semantic {
        match semantic.search(&topic, &query, ctx.now).await {
            Ok(hits) => {
                semantic_hits = hits.len();
                push_hits(&mut raw, &topic, hits, semantic.provenance(), ctx.now);
            }
            Err(e) => {
                warn!(target: "provider", topic = %topic, provider = semantic.name(), error = %e, "semantic search failed");
                counter!("pulse_provider_errors_total", "provider" => semantic.name()).increment(1);
                notes.push(format!("{topic}: semantic search failed: {e}"));
            }
        }
    }
    if semantic_hits < cfg.semantic_min_results {
        match inner.feed.search(&topic, &query, ctx.now).await {
            Ok(hits) => push_hits(&mut raw, &topic, hits, inner.feed.provenance(), ctx.now),
            Err(e) => {
                warn!(target: "provider", topic = %topic, provider = inner.feed.name(), error = %e, "feed search failed");
                counter!("pulse_provider_errors_total", "provider" => inner.feed.name()).increment(1);
                notes.push(format!("{topic}: feed search failed: {e}"));
            }
        }
    }

    // 2) Merge + policy
    let merged = merge_articles(raw);
    let (mut articles, removed) = ctx.policy.filter(merged, |a| a.domain.as_str());
    if removed > 0 {
        counter!("pulse_policy_filtered_total").increment(removed as u64);
        notes.push(format!("{topic}: {removed} item(s) removed by source policy"));
    }

    // 3) Score, enrich the top slice, rescore
    for a in articles.iter_mut() {
        apply_score(a, &ctx.signal, ctx.now);
    }
    rank(&mut articles);

    if let Some(enricher) = &inner.enricher {
        let n = cfg.enrich_top_n.min(articles.len());
        if n > 0 {
            let rest = articles.split_off(n);
            let enriched = join_all(
                articles
                    .into_iter()
                    .map(|a| enrich_article(enricher.as_ref(), a, ctx.now)),
            )
            .await;
            articles = enriched.into_iter().chain(rest).collect();
            for a in articles.iter_mut().take(n) {
                apply_score(a, &ctx.signal, ctx.now);
            }
            rank(&mut articles);
        }
    }

    articles.truncate(cfg.max_articles_per_topic);
    if articles.is_empty() {
        notes.push(format!("{topic}: no articles found"));
    }
    debug!(target: "pulse", topic = %topic, articles = articles.len(), "topic done");

    TopicResult {
        category: Category {
            name: topic,
            query,
            articles,
        },
        notes,
    }
}

fn push_hits(
    out: &mut Vec<Article>,
    topic: &str,
    hits: Vec<SearchHit>,
    provenance: Provenance,
    now: DateTime<Utc>,
) {
    for hit in hits {
        let ordinal = out.len();
        out.push(article_from_hit(topic, hit, ordinal, provenance, now));
    }
}

/// Build an unscored article with a single citation from the discovering provider.
pub fn article_from_hit(
    topic: &str,
    hit: SearchHit,
    ordinal: usize,
    provenance: Provenance,
    now: DateTime<Utc>,
) -> Article {
    let url = canonical_url(&hit.url);
    let homepage = hit.source_url.as_deref().unwrap_or(&url);
    let source = hit
        .source
        .clone()
        .unwrap_or_else(|| source_name_from_url(homepage));
    let domain = normalize_domain(homepage);
    let published_at = iso(hit.published_at.unwrap_or(now));
    let provider = match provenance {
        Provenance::Semantic => ProviderTag::Semantic,
        Provenance::Rss => ProviderTag::Rss,
        Provenance::Enrichment => ProviderTag::Mixed,
    };

    Article {
        id: article_id(topic, &url, ordinal),
        keywords: extract_keywords(&hit.title),
        trust_tier: classify(&source),
        citations: vec![Citation {
            label: source.clone(),
            url: url.clone(),
            publisher: Some(source.clone()),
            published_at: hit.published_at.map(iso),
            retrieved_at: iso(now),
            provider: provenance,
            evidence: None,
        }],
        title: hit.title,
        summary: hit.summary,
        url,
        source,
        source_url: hit.source_url,
        published_at,
        category: topic.to_string(),
        provider,
        domain,
        confidence_score: 0.0,
        confidence_label: ConfidenceLabel::Low,
        confidence_reasons: Vec::new(),
        relevance_bias: 0.0,
    }
}

/// Best-effort scrape. Any failure returns the article unchanged.
async fn enrich_article(
    enricher: &dyn ContentEnricher,
    mut article: Article,
    now: DateTime<Utc>,
) -> Article {
    let page = match enricher.scrape(&article.url).await {
        Ok(p) => p,
        Err(e) => {
            debug!(target: "provider", url = %article.url, error = %e, "enrichment skipped");
            counter!("pulse_enrich_failures_total").increment(1);
            return article;
        }
    };

    if let Some(title) = page.title.filter(|t| !t.is_empty()) {
        article.keywords = extract_keywords(&title);
        article.title = title;
    }
    if let Some(summary) = page.summary.filter(|s| !s.is_empty()) {
        article.summary = summary;
    }
    article.citations.push(Citation {
        label: article.title.clone(),
        url: article.url.clone(),
        publisher: Some(article.source.clone()),
        published_at: page.published_at.map(iso),
        retrieved_at: iso(now),
        provider: Provenance::Enrichment,
        evidence: page.excerpt,
    });
    article.provider = match article.provider {
        ProviderTag::Semantic | ProviderTag::SemanticEnriched => ProviderTag::SemanticEnriched,
        _ => ProviderTag::Mixed,
    };
    article
}

/// One shared tag if all articles agree; enriched-semantic wins among mixed tags; `MIXED`
/// otherwise; `FALLBACK` with no articles.
pub fn dominant_provider<'a>(articles: impl IntoIterator<Item = &'a Article>) -> ProviderTag {
    let tags: HashSet<ProviderTag> = articles.into_iter().map(|a| a.provider).collect();
    match tags.len() {
        0 => ProviderTag::Fallback,
        1 => tags.into_iter().next().unwrap_or(ProviderTag::Fallback),
        _ if tags.contains(&ProviderTag::SemanticEnriched) => ProviderTag::SemanticEnriched,
        _ => ProviderTag::Mixed,
    }
}
