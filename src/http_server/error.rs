use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};
use thiserror::Error;

use crate::services::auth::AuthError;

/// Errors surfaced by the REST handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404 with an empty body
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Error uploading file")]
    UploadFailed,
    /// Logged in full, never shown to the client
    #[error("{0:?}")]
    Internal(color_eyre::Report),
}

// Produced via `?` on any `color_eyre::Result`
impl From<color_eyre::Report> for ApiError {
    fn from(err: color_eyre::Report) -> Self {
        ApiError::Internal(err)
    }
}

// Unknown email and wrong password look the same to the client
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailInUse => ApiError::BadRequest("Email already in use".to_string()),
            AuthError::UnknownEmail | AuthError::PasswordMismatch => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::Storage(report) => ApiError::Internal(report),
        }
    }
}

// Tell axum how to convert `ApiError` into a response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response<Body> {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message).into_response(),
            ApiError::UploadFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error uploading file".to_string(),
            )
                .into_response(),
            ApiError::Internal(err) => {
                log::error!("{err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
