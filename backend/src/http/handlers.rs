//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for validation and lookups.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use super::dto::{
    CoverageDraft, CoverageListResponse, HealthResponse, ListQuery, MessageResponse,
    RecreateQuery,
};
use super::error::{ApiError, AppError, InputLocation};
use super::openapi;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{Coverage, CoverageKey, PageRequest};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

const ROOT_MESSAGE: &str = "This is the South America Coverage API server";

// =============================================================================
// Service
// =============================================================================

/// GET /
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Greeting", body = MessageResponse))
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new(ROOT_MESSAGE))
}

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses((status = 200, description = "Service status", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: API_VERSION.to_string(),
        database: db_status,
    }))
}

/// GET /openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::openapi())
}

// =============================================================================
// Coverage lookups
// =============================================================================

/// GET /coverages/gbg/{gbg}
///
/// First record whose GBG contains the given text, ignoring case.
#[utoipa::path(
    get,
    path = "/coverages/gbg/{gbg}",
    tag = "coverages",
    params(("gbg" = String, Path, description = "Text contained in the GBG")),
    responses(
        (status = 200, description = "Matching coverage record", body = Coverage),
        (status = 401, description = "Missing or invalid API token", body = ApiError),
        (status = 404, description = "No record matches", body = ApiError)
    ),
    security(("ApiKey" = []))
)]
pub async fn get_coverage_by_gbg(
    State(state): State<AppState>,
    Path(gbg): Path<String>,
) -> HandlerResult<Coverage> {
    let coverage = db_services::find_coverage_by_gbg(state.repository.as_ref(), &gbg).await?;
    Ok(Json(coverage))
}

/// GET /coverages/name/{short_name}
///
/// First record whose short name contains the given text, ignoring case.
/// A `+` matches any single character.
#[utoipa::path(
    get,
    path = "/coverages/name/{short_name}",
    tag = "coverages",
    params(("short_name" = String, Path, description = "Text contained in the short name; '+' matches any character")),
    responses(
        (status = 200, description = "Matching coverage record", body = Coverage),
        (status = 401, description = "Missing or invalid API token", body = ApiError),
        (status = 404, description = "No record matches", body = ApiError)
    ),
    security(("ApiKey" = []))
)]
pub async fn get_coverage_by_name(
    State(state): State<AppState>,
    Path(short_name): Path<String>,
) -> HandlerResult<Coverage> {
    let coverage =
        db_services::find_coverage_by_name(state.repository.as_ref(), &short_name).await?;
    Ok(Json(coverage))
}

// =============================================================================
// Coverage CRUD
// =============================================================================

/// GET /coverages
#[utoipa::path(
    get,
    path = "/coverages",
    tag = "coverages",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of coverage records", body = CoverageListResponse),
        (status = 400, description = "Invalid paging parameters", body = ApiError),
        (status = 401, description = "Missing or invalid API token", body = ApiError)
    ),
    security(("ApiKey" = []))
)]
pub async fn list_coverages(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> HandlerResult<CoverageListResponse> {
    let Query(query) = query?;
    let request = PageRequest::new(query.page, query.per_page).map_err(|errors| {
        AppError::Validation {
            location: InputLocation::Query,
            errors,
        }
    })?;

    let page = db_services::list_coverages(state.repository.as_ref(), request).await?;
    Ok(Json(page.into()))
}

/// POST /coverages
#[utoipa::path(
    post,
    path = "/coverages",
    tag = "coverages",
    request_body = CoverageDraft,
    responses(
        (status = 201, description = "Created coverage record", body = Coverage),
        (status = 400, description = "Invalid record", body = ApiError),
        (status = 401, description = "Missing or invalid API token", body = ApiError)
    ),
    security(("ApiKey" = []))
)]
pub async fn create_coverage(
    State(state): State<AppState>,
    payload: Result<Json<CoverageDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Coverage>), AppError> {
    let Json(draft) = payload?;
    let created = db_services::create_coverage(state.repository.as_ref(), draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /coverages/{index}
#[utoipa::path(
    delete,
    path = "/coverages/{index}",
    tag = "coverages",
    params(("index" = i64, Path, description = "Record key")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 401, description = "Missing or invalid API token", body = ApiError),
        (status = 404, description = "No record with this key", body = ApiError)
    ),
    security(("ApiKey" = []))
)]
pub async fn delete_coverage(
    State(state): State<AppState>,
    index: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(index) = index?;
    db_services::delete_coverage(state.repository.as_ref(), CoverageKey::new(index)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Maintenance
// =============================================================================

/// POST /database/recreate
///
/// Drops and recreates the coverage table, then inserts the sample rows.
#[utoipa::path(
    post,
    path = "/database/recreate",
    tag = "maintenance",
    params(RecreateQuery),
    responses(
        (status = 200, description = "Table recreated", body = MessageResponse),
        (status = 400, description = "Confirmation missing or invalid", body = ApiError),
        (status = 401, description = "Missing or invalid API token", body = ApiError)
    ),
    security(("ApiKey" = []))
)]
pub async fn recreate_database(
    State(state): State<AppState>,
    query: Result<Query<RecreateQuery>, QueryRejection>,
) -> HandlerResult<MessageResponse> {
    let Query(query) = query?;
    let confirmed = query.confirmed().map_err(|errors| AppError::Validation {
        location: InputLocation::Query,
        errors,
    })?;

    db_services::recreate_coverages(state.repository.as_ref(), confirmed).await?;
    Ok(Json(MessageResponse::new("database recreated")))
}
