//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crudkit_domain::error::{CrudError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps failures into an HTTP response with an appropriate status code.
pub enum ApiError {
    /// Raised by the application or domain layer.
    Crud(CrudError),
    /// The request body could not be read.
    Body(BytesRejection),
    /// The request body is not valid JSON.
    Json(serde_json::Error),
    /// The query string could not be decoded.
    Query(QueryRejection),
}

impl From<CrudError> for ApiError {
    fn from(err: CrudError) -> Self {
        Self::Crud(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Crud(err.into())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::Body(rejection)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Query(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Crud(CrudError::Validation(err)) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Crud(CrudError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Crud(CrudError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            Self::Body(rejection) => {
                tracing::debug!(error = %rejection, "unreadable request body");
                (rejection.status(), rejection.body_text())
            }
            Self::Json(err) => {
                tracing::debug!(error = %err, "malformed JSON body");
                (
                    StatusCode::BAD_REQUEST,
                    "Request body must be valid JSON".to_string(),
                )
            }
            Self::Query(rejection) => {
                tracing::debug!(error = %rejection, "rejected query string");
                (rejection.status(), rejection.body_text())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
