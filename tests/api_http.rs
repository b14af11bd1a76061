// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /pulse (+ history)
// - PUT/GET /policy
// - POST /feedback (accepted, bad request)
// - no store configured -> 503

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use common::{hit, MockSearch, Outcome};
use news_pulse::api::AppState;
use news_pulse::model::Provenance;
use news_pulse::providers::SearchProvider;
use news_pulse::store::{InMemoryStore, PulseStore};
use news_pulse::{create_router, PulseConfig, PulsePipeline, PulseService};

const BODY_LIMIT: usize = 1024 * 1024;

fn service(store: Option<Arc<dyn PulseStore>>) -> PulseService {
    let t = Utc::now() - Duration::hours(3);
    let feed = MockSearch::new("feed", Provenance::Rss).on(
        "AI",
        Outcome::Hits(vec![hit(
            "GLM-5 launches open source AI model",
            "https://www.reuters.com/technology/glm-5",
            Some("Reuters"),
            t,
        )]),
    );
    let pipeline = PulsePipeline::with_providers(
        PulseConfig::default(),
        Arc::new(feed) as Arc<dyn SearchProvider>,
        None,
        None,
    );
    PulseService::new(pipeline, store)
}

/// Router backed by a fresh in-memory store.
fn test_router() -> Router {
    let store: Arc<dyn PulseStore> = Arc::new(InMemoryStore::new());
    create_router(AppState::new(service(Some(store))))
}

fn json_request(method: &str, uri: &str, payload: Json) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build json request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET request")
}

async fn read_json(resp: shuttle_axum::axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let resp = test_router().oneshot(get("/health")).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8"), "ok");
}

#[tokio::test]
async fn api_pulse_returns_snapshot_and_persists_it() {
    let app = test_router();

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/pulse", json!({ "owner": "alice", "interests": ["AI"] })))
        .await
        .expect("oneshot /pulse");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["persisted"], json!(true));
    assert!(v["latencyMs"].is_u64());
    let snap = &v["snapshot"];
    assert_eq!(snap["interests"], json!(["AI"]));
    let article = &snap["categories"][0]["articles"][0];
    assert_eq!(article["domain"], json!("reuters.com"));
    assert_eq!(article["trustTier"], json!("A"));
    assert!(article["confidenceScore"].is_number());

    let resp = app
        .oneshot(get("/pulse/history?owner=alice&days=500"))
        .await
        .expect("oneshot /pulse/history");
    assert_eq!(resp.status(), StatusCode::OK);
    let history = read_json(resp).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));
    assert_eq!(history[0]["id"], snap["id"]);
}

#[tokio::test]
async fn api_policy_round_trips_normalized() {
    let app = test_router();

    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/policy?owner=alice",
            json!({ "allowDomains": [], "denyDomains": ["https://www.Spam.com/x", "spam.com"] }),
        ))
        .await
        .expect("oneshot PUT /policy");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["denyDomains"], json!(["spam.com"]));

    let resp = app
        .clone()
        .oneshot(get("/policy?owner=alice"))
        .await
        .expect("oneshot GET /policy");
    let v = read_json(resp).await;
    assert_eq!(v["denyDomains"], json!(["spam.com"]));
    assert_eq!(v["allowDomains"], json!([]));

    let resp = app.oneshot(get("/policy?owner=bob")).await.expect("oneshot GET /policy");
    assert_eq!(read_json(resp).await["denyDomains"], json!([]));
}

#[tokio::test]
async fn api_feedback_accepts_votes_and_rejects_missing_article() {
    let app = test_router();

    let vote = json!({
        "owner": "alice",
        "articleId": "abc123",
        "domain": "reuters.com",
        "category": "AI",
        "keywords": ["glm"],
        "direction": "up"
    });
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/feedback", vote))
        .await
        .expect("oneshot /feedback");
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let bad = json!({
        "articleId": " ",
        "domain": "reuters.com",
        "category": "AI",
        "direction": "down"
    });
    let resp = app
        .oneshot(json_request("POST", "/feedback", bad))
        .await
        .expect("oneshot /feedback");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_without_store_reports_unavailable_but_still_runs() {
    let app = create_router(AppState::new(service(None)));

    let resp = app
        .clone()
        .oneshot(get("/pulse/history"))
        .await
        .expect("oneshot /pulse/history");
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let resp = app
        .oneshot(json_request("POST", "/pulse", json!({ "interests": ["AI"] })))
        .await
        .expect("oneshot /pulse");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["persisted"], json!(false));
}
