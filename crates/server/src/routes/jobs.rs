use axum::{
    Router,
    extract::{Path, Query, State, rejection::{JsonRejection, PathRejection, QueryRejection}},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::job::{CreateJob, Job, JobFilter, UpdateJob};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

const CREATE_FAILED: &str = "Failed to create job";

/// GET /api/jobs
/// `?department=` narrows the list, ignoring case.
pub async fn list_jobs(
    State(state): State<AppState>,
    filter: Result<Query<JobFilter>, QueryRejection>,
) -> Result<ResponseJson<ApiResponse<Vec<Job>>>, ApiError> {
    let Query(filter) = filter.map_err(ApiError::invalid_query("Failed to fetch jobs"))?;
    let jobs = state
        .storage()
        .list_jobs(&filter)
        .await
        .map_err(ApiError::storage("Failed to fetch jobs"))?;
    Ok(ResponseJson(ApiResponse::success(jobs)))
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<Job>>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to fetch job"))?;
    let job = state
        .storage()
        .get_job(id)
        .await
        .map_err(ApiError::storage("Failed to fetch job"))?
        .ok_or(ApiError::NotFound("Job"))?;
    Ok(ResponseJson(ApiResponse::success(job)))
}

/// POST /api/jobs
/// The job number and `jobLes` are assigned here; any that the body carries
/// are ignored. Failures report only a generic message.
pub async fn create_job(
    State(state): State<AppState>,
    payload: Result<ResponseJson<CreateJob>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Job>>), ApiError> {
    let ResponseJson(payload) = payload.map_err(ApiError::invalid_body(CREATE_FAILED))?;
    let job = state
        .storage()
        .create_job(&payload)
        .await
        .map_err(ApiError::storage(CREATE_FAILED))?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(job))))
}

/// PUT /api/jobs/{id}
pub async fn update_job(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<ResponseJson<UpdateJob>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<Job>>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to update job"))?;
    let ResponseJson(payload) = payload.map_err(ApiError::invalid_body("Failed to update job"))?;
    let job = state
        .storage()
        .update_job(id, &payload)
        .await
        .map_err(ApiError::storage("Failed to update job"))?;
    Ok(ResponseJson(ApiResponse::success(job)))
}

/// DELETE /api/jobs/{id}
pub async fn delete_job(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to delete job"))?;
    state
        .storage()
        .delete_job(id)
        .await
        .map_err(ApiError::storage("Failed to delete job"))?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/{id}", get(get_job).put(update_job).delete(delete_job))
}
