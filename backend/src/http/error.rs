//! HTTP error handling and response types.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::db::{RepositoryError, ServiceError};
use crate::models::FieldErrors;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured details (field-level validation messages, hints)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Where invalid input was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLocation {
    Json,
    Query,
}

impl InputLocation {
    fn as_str(&self) -> &'static str {
        match self {
            InputLocation::Json => "json",
            InputLocation::Query => "query",
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid API token
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Malformed request (unparseable body, query or path)
    BadRequest(String),
    /// Field-level validation failure
    Validation {
        location: InputLocation,
        errors: FieldErrors,
    },
    /// Destructive operation requested without confirmation
    ConfirmationMissing,
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("UNAUTHORIZED", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::new("BAD_REQUEST", msg),
            ),
            AppError::Validation { location, errors } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("VALIDATION_ERROR", "Validation error")
                    .with_details(json!({ location.as_str(): errors })),
            ),
            AppError::ConfirmationMissing => (
                StatusCode::BAD_REQUEST,
                ApiError::new("BAD_REQUEST", "confirmation is missing")
                    .with_details(json!({ "error": "check the API for how to confirm" })),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) if e.is_not_found() => (
                StatusCode::NOT_FOUND,
                ApiError::new("NOT_FOUND", e.message()),
            ),
            AppError::Repository(e) => {
                tracing::error!(error = %e, "Repository failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("REPOSITORY_ERROR", e.message()),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Repository(e) => AppError::Repository(e),
            ServiceError::Validation(errors) => AppError::Validation {
                location: InputLocation::Json,
                errors,
            },
            ServiceError::ConfirmationMissing => AppError::ConfirmationMissing,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_repository_not_found_maps_to_404() {
        let (status, body) =
            render(RepositoryError::not_found("Coverage 4 not found").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Coverage 4 not found");
    }

    #[tokio::test]
    async fn test_validation_details_are_keyed_by_location() {
        let mut errors = FieldErrors::new();
        errors.add("gbg", "Missing data for required field.");
        let (status, body) = render(ServiceError::Validation(errors).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["details"]["json"]["gbg"][0],
            "Missing data for required field."
        );
    }

    #[tokio::test]
    async fn test_confirmation_missing_body() {
        let (status, body) = render(AppError::ConfirmationMissing).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "confirmation is missing");
        assert_eq!(body["details"]["error"], "check the API for how to confirm");
    }

    #[tokio::test]
    async fn test_query_failure_is_500() {
        let (status, body) = render(RepositoryError::query("relation missing").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "REPOSITORY_ERROR");
        assert!(body.get("details").is_none());
    }
}
