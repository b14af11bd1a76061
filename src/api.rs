use chrono::Utc;
use serde::Deserialize;
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::error::StoreError;
use crate::feedback::{FeedbackVote, VoteDirection};
use crate::model::Snapshot;
use crate::policy::SourcePolicy;
use crate::service::{PulseRun, PulseService};
use crate::store::PulseStore;

const DEFAULT_OWNER: &str = "default";
const DEFAULT_HISTORY_DAYS: u32 = 7;
const MAX_HISTORY_DAYS: u32 = 90;

#[derive(Clone)]
pub struct AppState {
    service: PulseService,
}

impl AppState {
    pub fn new(service: PulseService) -> Self {
        Self { service }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/pulse", post(run_pulse))
        .route("/pulse/history", get(pulse_history))
        .route("/policy", get(get_policy).put(put_policy))
        .route("/feedback", post(post_feedback))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    NoStore,
    Store(StoreError),
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::NoStore => (StatusCode::SERVICE_UNAVAILABLE, "no store configured".to_string()),
            ApiError::Store(StoreError::Rejected(m)) => (StatusCode::UNPROCESSABLE_ENTITY, m),
            ApiError::Store(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
        };
        (status, msg).into_response()
    }
}

fn store_of(state: &AppState) -> Result<&dyn PulseStore, ApiError> {
    state.service.store().map(|s| s.as_ref()).ok_or(ApiError::NoStore)
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_string()
}

#[derive(Deserialize)]
struct PulseReq {
    #[serde(default = "default_owner")]
    owner: String,
    #[serde(default)]
    interests: Vec<String>,
}

async fn run_pulse(State(state): State<AppState>, Json(body): Json<PulseReq>) -> Json<PulseRun> {
    Json(state.service.run(&body.owner, body.interests).await)
}

#[derive(Deserialize)]
struct OwnerQuery {
    #[serde(default = "default_owner")]
    owner: String,
    days: Option<u32>,
}

async fn pulse_history(
    State(state): State<AppState>,
    Query(q): Query<OwnerQuery>,
) -> Result<Json<Vec<Snapshot>>, ApiError> {
    let days = q.days.unwrap_or(DEFAULT_HISTORY_DAYS).clamp(1, MAX_HISTORY_DAYS);
    let rows = store_of(&state)?.load_history(&q.owner, days).await?;
    Ok(Json(rows))
}

async fn get_policy(
    State(state): State<AppState>,
    Query(q): Query<OwnerQuery>,
) -> Result<Json<SourcePolicy>, ApiError> {
    let policy = store_of(&state)?.load_source_policy(&q.owner).await?;
    Ok(Json(policy.unwrap_or_default()))
}

async fn put_policy(
    State(state): State<AppState>,
    Query(q): Query<OwnerQuery>,
    Json(policy): Json<SourcePolicy>,
) -> Result<Json<SourcePolicy>, ApiError> {
    let normalized = policy.normalized();
    store_of(&state)?.save_source_policy(&q.owner, &normalized).await?;
    Ok(Json(normalized))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackReq {
    #[serde(default = "default_owner")]
    owner: String,
    article_id: String,
    domain: String,
    category: String,
    #[serde(default)]
    keywords: Vec<String>,
    direction: VoteDirection,
}

async fn post_feedback(
    State(state): State<AppState>,
    Json(body): Json<FeedbackReq>,
) -> Result<StatusCode, ApiError> {
    if body.article_id.trim().is_empty() {
        return Err(ApiError::BadRequest("articleId is required".to_string()));
    }
    let vote = FeedbackVote {
        owner_key: body.owner,
        article_id: body.article_id,
        domain: body.domain,
        category: body.category,
        keywords: body.keywords,
        direction: body.direction,
        created_at: Utc::now(),
    };
    store_of(&state)?.record_feedback(vote).await?;
    Ok(StatusCode::ACCEPTED)
}
