use crate::recipes::ServiceError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error returned by HTTP handlers, rendered as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Recipe not found")]
    NotFound,
    /// The provider answered but produced nothing usable.
    #[error("{action}: {reason}")]
    GenerationFailure { action: &'static str, reason: String },
    #[error("{action}: {reason}")]
    Unhandled { action: &'static str, reason: String },
    /// Body or query string that failed to deserialize.
    #[error("{0}")]
    InvalidRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Attaches the failing operation ("Failed to generate recipe", ...) to a service error.
    pub fn during(action: &'static str) -> impl FnOnce(ServiceError) -> ApiError {
        move |err| match err {
            ServiceError::NotFound => ApiError::NotFound,
            ServiceError::NoImage => ApiError::GenerationFailure { action, reason: err.to_string() },
            other => ApiError::Unhandled { action, reason: other.to_string() },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::GenerationFailure { .. } | ApiError::Unhandled { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        }
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
