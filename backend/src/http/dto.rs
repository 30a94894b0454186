//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{Coverage, FieldErrors, Page};

pub use crate::models::CoverageDraft;

/// Path of the paginated collection; used to build pagination links.
pub const COVERAGES_PATH: &str = "/coverages";

/// Plain message body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Query parameters for listing coverages.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number (default 1)
    pub page: Option<i64>,
    /// Page size (default 20, at most 255)
    pub per_page: Option<i64>,
}

/// Query parameters for the recreate operation.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecreateQuery {
    /// Must be a true-ish flag (`true`, `yes`, `1`, ...) for anything to happen
    pub confirmation: Option<String>,
}

impl RecreateQuery {
    /// Whether the caller confirmed. Absent means no.
    pub fn confirmed(&self) -> Result<bool, FieldErrors> {
        match self.confirmation.as_deref() {
            None => Ok(false),
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                let mut errors = FieldErrors::new();
                errors.add("confirmation", "Not a valid boolean.");
                errors
            }),
        }
    }
}

/// Parse a boolean query flag the way form libraries usually do.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Pagination metadata with relative navigation links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub pages: u64,
    pub total: u64,
    pub current: String,
    pub first: String,
    pub last: String,
    pub next: Option<String>,
    pub prev: Option<String>,
}

impl PaginationMeta {
    pub fn from_page<T>(page: &Page<T>, path: &str) -> Self {
        let link = |n: u64| format!("{}?page={}&per_page={}", path, n, page.per_page);
        let current = page.page as u64;

        Self {
            page: page.page,
            per_page: page.per_page,
            pages: page.pages(),
            total: page.total,
            current: link(current),
            first: link(1),
            last: link(page.pages().max(1)),
            next: page.has_next().then(|| link(current + 1)),
            prev: page.has_prev().then(|| link(current - 1)),
        }
    }
}

/// One page of coverage records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoverageListResponse {
    pub coverages: Vec<Coverage>,
    pub pagination: PaginationMeta,
}

impl From<Page<Coverage>> for CoverageListResponse {
    fn from(page: Page<Coverage>) -> Self {
        let pagination = PaginationMeta::from_page(&page, COVERAGES_PATH);
        Self {
            coverages: page.items,
            pagination,
        }
    }
}
