use crate::{
    types::{AppError, Report, ReportSummary, Result},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListParams {
    /// Maximum number of reports to return (default 20, max 100)
    pub limit: Option<usize>,
}

/// Fetch a stored report
#[utoipa::path(
    get,
    path = "/reports/{job_id}",
    params(("job_id" = String, Path, description = "Job identifier")),
    responses(
        (status = 200, description = "Stored report", body = Report),
        (status = 404, description = "No report for this job")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Report>> {
    state
        .store
        .get_report(&job_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No report for job {}", job_id)))
}

/// List recent reports
#[utoipa::path(
    get,
    path = "/reports",
    params(ListParams),
    responses((status = 200, description = "Recent reports", body = Vec<ReportSummary>)),
    tag = "reports"
)]
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ReportSummary>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    Ok(Json(state.store.list_reports(limit).await?))
}
