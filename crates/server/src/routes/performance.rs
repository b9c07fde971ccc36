use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::job::JobFilter;
use services::services::performance::{PerformanceService, PerformanceSummary};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET /api/performance/summary
pub async fn performance_summary(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<PerformanceSummary>>, ApiError> {
    let storage = state.storage();
    let jobs = storage
        .list_jobs(&JobFilter::default())
        .await
        .map_err(ApiError::storage("Failed to build performance summary"))?;
    let clients = storage
        .list_clients()
        .await
        .map_err(ApiError::storage("Failed to build performance summary"))?;
    Ok(ResponseJson(ApiResponse::success(
        PerformanceService::summary(&jobs, &clients),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/performance/summary", get(performance_summary))
}
