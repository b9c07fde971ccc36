use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{client_review::ClientReviewError, storage::StorageError};
use thiserror::Error;
use tracing::{error, warn};
use utils::response::ApiResponse;

/// Handler failure. `message` is what the caller sees; the underlying cause
/// is logged and never sent back.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}: {source}")]
    Storage {
        message: &'static str,
        source: StorageError,
    },
    #[error("{message}: {source}")]
    ClientReview {
        message: &'static str,
        source: ClientReviewError,
    },
    #[error("{message}: {detail}")]
    BadRequest { message: &'static str, detail: String },
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl ApiError {
    pub fn storage(message: &'static str) -> impl FnOnce(StorageError) -> ApiError {
        move |source| ApiError::Storage { message, source }
    }

    pub fn review(message: &'static str) -> impl FnOnce(ClientReviewError) -> ApiError {
        move |source| ApiError::ClientReview { message, source }
    }

    pub fn invalid_body(message: &'static str) -> impl FnOnce(JsonRejection) -> ApiError {
        move |rejection| ApiError::BadRequest {
            message,
            detail: rejection.body_text(),
        }
    }

    pub fn invalid_path(message: &'static str) -> impl FnOnce(PathRejection) -> ApiError {
        move |rejection| ApiError::BadRequest {
            message,
            detail: rejection.body_text(),
        }
    }

    pub fn invalid_query(message: &'static str) -> impl FnOnce(QueryRejection) -> ApiError {
        move |rejection| ApiError::BadRequest {
            message,
            detail: rejection.body_text(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage { source, .. } => storage_status(source),
            Self::ClientReview { source, .. } => match source {
                ClientReviewError::ClientNotFound(_) => StatusCode::NOT_FOUND,
                ClientReviewError::Storage(e) => storage_status(e),
            },
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Storage {
                source: StorageError::NotFound(entity),
                ..
            } => format!("{entity} not found"),
            Self::ClientReview {
                source: ClientReviewError::ClientNotFound(_),
                ..
            } => "Client not found".to_string(),
            Self::Storage { message, .. }
            | Self::ClientReview { message, .. }
            | Self::BadRequest { message, .. } => message.to_string(),
            Self::NotFound(entity) => format!("{entity} not found"),
        }
    }
}

fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::Conflict(_) => StatusCode::CONFLICT,
        StorageError::InvalidReference(_) | StorageError::MissingField(_) => {
            StatusCode::BAD_REQUEST
        }
        StorageError::Database(_) | StorageError::JobNumber(_) | StorageError::Password(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ApiResponse::<()>::error(&self.public_message());
        (status, Json(body)).into_response()
    }
}
