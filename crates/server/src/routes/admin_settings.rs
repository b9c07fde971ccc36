use axum::{
    Router,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::admin_setting::{AdminSetting, CreateAdminSetting, UpdateAdminSetting};
use tracing::info;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET /api/admin/settings
pub async fn list_settings(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<AdminSetting>>>, ApiError> {
    let settings = state
        .storage()
        .list_admin_settings()
        .await
        .map_err(ApiError::storage("Failed to fetch admin settings"))?;
    Ok(ResponseJson(ApiResponse::success(settings)))
}

/// GET /api/admin/settings/{key}
pub async fn get_setting(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
) -> Result<ResponseJson<ApiResponse<AdminSetting>>, ApiError> {
    let Path(key) = key.map_err(ApiError::invalid_path("Failed to fetch admin setting"))?;
    let setting = state
        .storage()
        .get_admin_setting(&key)
        .await
        .map_err(ApiError::storage("Failed to fetch admin setting"))?
        .ok_or(ApiError::NotFound("Setting"))?;
    Ok(ResponseJson(ApiResponse::success(setting)))
}

/// POST /api/admin/settings
pub async fn create_setting(
    State(state): State<AppState>,
    payload: Result<ResponseJson<CreateAdminSetting>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<AdminSetting>>), ApiError> {
    let ResponseJson(payload) =
        payload.map_err(ApiError::invalid_body("Failed to create admin setting"))?;
    let setting = state
        .storage()
        .create_admin_setting(&payload)
        .await
        .map_err(ApiError::storage("Failed to create admin setting"))?;
    info!(setting_key = %setting.setting_key, "Created admin setting");
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(setting))))
}

/// PUT /api/admin/settings/{key}
pub async fn update_setting(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
    payload: Result<ResponseJson<UpdateAdminSetting>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<AdminSetting>>, ApiError> {
    let Path(key) = key.map_err(ApiError::invalid_path("Failed to update admin setting"))?;
    let ResponseJson(payload) =
        payload.map_err(ApiError::invalid_body("Failed to update admin setting"))?;
    let setting = state
        .storage()
        .update_admin_setting(&key, &payload)
        .await
        .map_err(ApiError::storage("Failed to update admin setting"))?;
    Ok(ResponseJson(ApiResponse::success(setting)))
}

/// DELETE /api/admin/settings/{key}
pub async fn delete_setting(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(key) = key.map_err(ApiError::invalid_path("Failed to delete admin setting"))?;
    state
        .storage()
        .delete_admin_setting(&key)
        .await
        .map_err(ApiError::storage("Failed to delete admin setting"))?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/admin/settings",
        Router::new()
            .route("/", get(list_settings).post(create_setting))
            .route(
                "/{key}",
                get(get_setting).put(update_setting).delete(delete_setting),
            ),
    )
}
