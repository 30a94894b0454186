//! Page requests and paged results for listing endpoints.

use serde::{Deserialize, Serialize};

use super::coverage::FieldErrors;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 255;

/// A validated request for one page of results (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Build a page request, applying defaults to absent values.
    ///
    /// Out-of-range values are reported per field.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let page = page.unwrap_or(DEFAULT_PAGE as i64);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE as i64);

        if page < 1 {
            errors.add("page", "Must be greater than or equal to 1.");
        } else if page > u32::MAX as i64 {
            errors.add("page", format!("Must be less than or equal to {}.", u32::MAX));
        }
        if per_page < 1 {
            errors.add("per_page", "Must be greater than or equal to 1.");
        } else if per_page > MAX_PER_PAGE as i64 {
            errors.add(
                "per_page",
                format!("Must be less than or equal to {}.", MAX_PER_PAGE),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            page: page as u32,
            per_page: per_page as u32,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip before this page.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total,
        }
    }

    /// Total number of pages; zero for an empty table.
    pub fn pages(&self) -> u64 {
        self.total.div_ceil(self.per_page as u64)
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) < self.pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}
