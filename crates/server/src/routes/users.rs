use axum::{
    Router,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::user::{CreateUser, UpdateUser, User};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, ApiError> {
    let users = state
        .storage()
        .list_users()
        .await
        .map_err(ApiError::storage("Failed to fetch users"))?;
    Ok(ResponseJson(ApiResponse::success(users)))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to fetch user"))?;
    let user = state
        .storage()
        .get_user(id)
        .await
        .map_err(ApiError::storage("Failed to fetch user"))?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<ResponseJson<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<User>>), ApiError> {
    let ResponseJson(payload) = payload.map_err(ApiError::invalid_body("Failed to create user"))?;
    let user = state
        .storage()
        .create_user(&payload)
        .await
        .map_err(ApiError::storage("Failed to create user"))?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(user))))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<ResponseJson<UpdateUser>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to update user"))?;
    let ResponseJson(payload) = payload.map_err(ApiError::invalid_body("Failed to update user"))?;
    let user = state
        .storage()
        .update_user(id, &payload)
        .await
        .map_err(ApiError::storage("Failed to update user"))?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(ApiError::invalid_path("Failed to delete user"))?;
    state
        .storage()
        .delete_user(id)
        .await
        .map_err(ApiError::storage("Failed to delete user"))?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/users",
        Router::new()
            .route("/", get(list_users).post(create_user))
            .route("/{id}", get(get_user).put(update_user).delete(delete_user)),
    )
}
