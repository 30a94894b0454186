//! Service layer for coverage operations.
//!
//! These functions sit between the HTTP handlers and the repository. They
//! apply input validation, build lookup patterns, and turn "no match" into
//! a not-found error; the repository only ever sees validated input.

use log::{debug, info};

use super::repository::{CoverageRepository, ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    sample_coverages, Coverage, CoverageDraft, CoverageKey, FieldErrors, Page, PageRequest,
    SearchField,
};

/// Errors raised by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Input failed field validation.
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// A destructive operation was requested without confirmation.
    #[error("confirmation is missing")]
    ConfirmationMissing,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Check whether the repository is reachable.
pub async fn health_check(repo: &dyn CoverageRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Find the first coverage record whose GBG contains `gbg`, ignoring case.
pub async fn find_coverage_by_gbg(
    repo: &dyn CoverageRepository,
    gbg: &str,
) -> RepositoryResult<Coverage> {
    find_first_containing(repo, SearchField::Gbg, gbg).await
}

/// Find the first coverage record whose short name contains `shortname`,
/// ignoring case. A `+` in the input matches any single character.
pub async fn find_coverage_by_name(
    repo: &dyn CoverageRepository,
    shortname: &str,
) -> RepositoryResult<Coverage> {
    find_first_containing(repo, SearchField::Shortname, shortname).await
}

async fn find_first_containing(
    repo: &dyn CoverageRepository,
    field: SearchField,
    needle: &str,
) -> RepositoryResult<Coverage> {
    let pattern = field.contains_pattern(needle);
    debug!("Looking up coverage by {} ILIKE '{}'", field, pattern);

    repo.find_first_matching(field, &pattern)
        .await?
        .ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("No coverage record with {} matching '{}'", field, needle),
                ErrorContext::new("find_first_matching")
                    .with_entity("coverage")
                    .with_details(format!("{}={}", field, pattern)),
            )
        })
}

/// List one page of coverage records.
pub async fn list_coverages(
    repo: &dyn CoverageRepository,
    request: PageRequest,
) -> RepositoryResult<Page<Coverage>> {
    repo.list_coverages(request).await
}

/// Validate `draft` and insert it.
pub async fn create_coverage(
    repo: &dyn CoverageRepository,
    draft: CoverageDraft,
) -> ServiceResult<Coverage> {
    let new = draft.validate().map_err(ServiceError::Validation)?;
    let created = repo.insert_coverage(new).await?;
    info!("Created coverage {} ({})", created.index, created.shortname);
    Ok(created)
}

/// Delete the coverage record with `key`.
pub async fn delete_coverage(repo: &dyn CoverageRepository, key: CoverageKey) -> RepositoryResult<()> {
    repo.delete_coverage(key).await?;
    info!("Deleted coverage {}", key);
    Ok(())
}

/// Drop and recreate the coverage table, seeding it with the sample rows.
///
/// Nothing is touched unless `confirmed` is true.
pub async fn recreate_coverages(
    repo: &dyn CoverageRepository,
    confirmed: bool,
) -> ServiceResult<usize> {
    if !confirmed {
        return Err(ServiceError::ConfirmationMissing);
    }

    let inserted = repo.recreate(&sample_coverages()).await?;
    info!("Coverage table recreated with {} sample rows", inserted);
    Ok(inserted)
}
