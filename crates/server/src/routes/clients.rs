use axum::{
    Router,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::client::{Client, CreateClient, UpdateClient};
use services::services::client_review::ClientReviewService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// GET /api/clients
/// Active clients only.
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Client>>>, ApiError> {
    let clients = state
        .storage()
        .list_clients()
        .await
        .map_err(ApiError::storage("Failed to fetch clients"))?;
    Ok(ResponseJson(ApiResponse::success(clients)))
}

/// GET /api/clients/{id}
pub async fn get_client(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to fetch client"))?;
    let client = state
        .storage()
        .get_client(id)
        .await
        .map_err(ApiError::storage("Failed to fetch client"))?
        .ok_or(ApiError::NotFound("Client"))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// POST /api/clients
pub async fn create_client(
    State(state): State<AppState>,
    payload: Result<ResponseJson<CreateClient>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Client>>), ApiError> {
    let ResponseJson(payload) =
        payload.map_err(ApiError::invalid_body("Failed to create client"))?;
    let client = state
        .storage()
        .create_client(&payload)
        .await
        .map_err(ApiError::storage("Failed to create client"))?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(client))))
}

/// PUT /api/clients/{id}
pub async fn update_client(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<ResponseJson<UpdateClient>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to update client"))?;
    let ResponseJson(payload) =
        payload.map_err(ApiError::invalid_body("Failed to update client"))?;
    let client = state
        .storage()
        .update_client(id, &payload)
        .await
        .map_err(ApiError::storage("Failed to update client"))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// DELETE /api/clients/{id}
pub async fn delete_client(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to delete client"))?;
    state
        .storage()
        .delete_client(id)
        .await
        .map_err(ApiError::storage("Failed to delete client"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/clients/{id}/approve
pub async fn approve_client(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to approve client"))?;
    let client = ClientReviewService::approve(state.storage(), id)
        .await
        .map_err(ApiError::review("Failed to approve client"))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// PUT /api/clients/{id}/reject
pub async fn reject_client(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to reject client"))?;
    let client = ClientReviewService::reject(state.storage(), id)
        .await
        .map_err(ApiError::review("Failed to reject client"))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/clients",
        Router::new()
            .route("/", get(list_clients).post(create_client))
            .route(
                "/{id}",
                get(get_client).put(update_client).delete(delete_client),
            )
            .route("/{id}/approve", put(approve_client))
            .route("/{id}/reject", put(reject_client)),
    )
}
