use axum::{
    Router,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::job_item::{CreateJobItem, JobItem, UpdateJobItem};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct BulkSaveJobItems {
    pub job_id: Uuid,
    pub items: Vec<CreateJobItem>,
}

/// GET /api/jobs/{id}/items
/// GET /api/job-items/{id}
pub async fn list_job_items(
    State(state): State<AppState>,
    job_id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<Vec<JobItem>>>, ApiError> {
    let Path(job_id) = job_id.map_err(ApiError::invalid_path("Failed to fetch job items"))?;
    let items = state
        .storage()
        .list_job_items(job_id)
        .await
        .map_err(ApiError::storage("Failed to fetch job items"))?;
    Ok(ResponseJson(ApiResponse::success(items)))
}

/// POST /api/jobs/{id}/items
pub async fn create_job_item(
    State(state): State<AppState>,
    job_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<ResponseJson<CreateJobItem>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<JobItem>>), ApiError> {
    let Path(job_id) = job_id.map_err(ApiError::invalid_path("Failed to create job item"))?;
    let ResponseJson(payload) =
        payload.map_err(ApiError::invalid_body("Failed to create job item"))?;
    let item = state
        .storage()
        .create_job_item(job_id, &payload)
        .await
        .map_err(ApiError::storage("Failed to create job item"))?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(item))))
}

/// POST /api/job-items/bulk
/// Replace every item of `jobId` with `items`.
pub async fn bulk_save_job_items(
    State(state): State<AppState>,
    payload: Result<ResponseJson<BulkSaveJobItems>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<Vec<JobItem>>>, ApiError> {
    let ResponseJson(payload) =
        payload.map_err(ApiError::invalid_body("Failed to save job items"))?;
    let items = state
        .storage()
        .replace_job_items(payload.job_id, &payload.items)
        .await
        .map_err(ApiError::storage("Failed to save job items"))?;
    Ok(ResponseJson(ApiResponse::success(items)))
}

/// PUT /api/job-items/{id}
pub async fn update_job_item(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<ResponseJson<UpdateJobItem>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<JobItem>>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to update job item"))?;
    let ResponseJson(payload) =
        payload.map_err(ApiError::invalid_body("Failed to update job item"))?;
    let item = state
        .storage()
        .update_job_item(id, &payload)
        .await
        .map_err(ApiError::storage("Failed to update job item"))?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

/// DELETE /api/job-items/{id}
pub async fn delete_job_item(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to delete job item"))?;
    state
        .storage()
        .delete_job_item(id)
        .await
        .map_err(ApiError::storage("Failed to delete job item"))?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    // GET /job-items/{id} takes a job id; PUT and DELETE take an item id.
    Router::new()
        .route("/jobs/{id}/items", get(list_job_items).post(create_job_item))
        .route("/job-items/bulk", post(bulk_save_job_items))
        .route(
            "/job-items/{id}",
            get(list_job_items)
                .put(update_job_item)
                .delete(delete_job_item),
        )
}
