use crate::{
    pipeline::Job,
    types::{AppError, HealthResponse, NewsRequest, NewsResponse, Result},
    AppState,
};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// Start a news pipeline job
///
/// Returns as soon as the job is registered; progress is streamed on
/// `/ws/status/{job_id}`.
#[utoipa::path(
    post,
    path = "/process_news",
    request_body = NewsRequest,
    responses(
        (status = 200, description = "Job started", body = NewsResponse),
        (status = 400, description = "Empty topic")
    ),
    tag = "news"
)]
pub async fn process_news(
    State(state): State<AppState>,
    Json(payload): Json<NewsRequest>,
) -> Result<Json<NewsResponse>> {
    let topic = payload.topic.trim();
    if topic.is_empty() {
        return Err(AppError::InvalidInput("Topic cannot be empty".to_string()));
    }

    let job = Job::new(topic, payload.user_preferences);
    let job_id = job.id.clone();

    // Registered before the id is returned so a client can attach immediately.
    state.progress.register(&job_id);

    let stage_timeout = state.config_manager.config().pipeline.stage_timeout();
    let pipeline = state.pipeline.with_stage_timeout(stage_timeout);
    tokio::spawn(async move {
        // Failures are already logged and published by the orchestrator.
        let _ = pipeline.run(job).await;
    });

    tracing::info!(job_id = %job_id, "News job accepted");
    Ok(Json(NewsResponse {
        message: "Process started".to_string(),
        job_id,
    }))
}

/// Liveness message
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Backend is running")),
    tag = "system"
)]
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Backend is running" }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Server health", body = HealthResponse)),
    tag = "system"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_jobs: state.progress.active_jobs(),
    })
}
