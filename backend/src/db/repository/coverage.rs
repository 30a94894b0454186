//! Coverage repository trait.
//!
//! One trait covers every operation on the `sa_coverages` table. Each method
//! maps to at most one round trip, except [`CoverageRepository::recreate`].

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Coverage, CoverageKey, NewCoverage, Page, PageRequest, SearchField};

/// Repository trait for coverage records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across request handlers.
#[async_trait]
pub trait CoverageRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Find the first record (lowest key) whose `field` matches the `ILIKE`
    /// `pattern`.
    ///
    /// # Returns
    /// * `Ok(None)` - No record matches
    async fn find_first_matching(
        &self,
        field: SearchField,
        pattern: &str,
    ) -> RepositoryResult<Option<Coverage>>;

    /// Fetch one page of records in ascending key order.
    ///
    /// A page past the end yields no items and the real total.
    async fn list_coverages(&self, request: PageRequest) -> RepositoryResult<Page<Coverage>>;

    /// Insert a record and return it with its newly assigned key.
    ///
    /// Keys are never reused, even after the record holding one is deleted.
    async fn insert_coverage(&self, coverage: NewCoverage) -> RepositoryResult<Coverage>;

    /// Delete a record by key.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - No record has this key
    async fn delete_coverage(&self, key: CoverageKey) -> RepositoryResult<()>;

    /// Drop and recreate the table, then insert `seed`.
    ///
    /// Key assignment restarts at 1. Returns the number of inserted rows.
    async fn recreate(&self, seed: &[NewCoverage]) -> RepositoryResult<usize>;
}
