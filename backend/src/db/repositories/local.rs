//! In-memory repository for unit testing and local development.
//!
//! Records live in a `BTreeMap` keyed by the integer key, so iteration order
//! is ascending key order, matching `ORDER BY index` on Postgres.

use std::collections::BTreeMap;

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;

use crate::db::repository::{
    CoverageRepository, ErrorContext, RepositoryError, RepositoryResult,
};
use crate::models::{ilike, Coverage, CoverageKey, NewCoverage, Page, PageRequest, SearchField};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, Coverage>,
    next_key: i64,
}

impl Table {
    fn empty() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_key: 1,
        }
    }

    fn insert(&mut self, coverage: NewCoverage) -> Coverage {
        let key = self.next_key;
        self.next_key += 1;
        let stored = coverage.with_key(CoverageKey::new(key));
        self.rows.insert(key, stored.clone());
        stored
    }
}

/// In-memory coverage repository.
#[derive(Debug)]
pub struct LocalRepository {
    table: RwLock<Table>,
}

impl LocalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::empty()),
        }
    }

    /// Create a repository pre-populated with `rows`, keyed from 1.
    pub fn with_rows(rows: impl IntoIterator<Item = NewCoverage>) -> Self {
        let mut table = Table::empty();
        for row in rows {
            table.insert(row);
        }
        Self {
            table: RwLock::new(table),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoverageRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn find_first_matching(
        &self,
        field: SearchField,
        pattern: &str,
    ) -> RepositoryResult<Option<Coverage>> {
        let table = self.table.read();
        Ok(table
            .rows
            .values()
            .find(|row| ilike(pattern, field.value_of(row)))
            .cloned())
    }

    async fn list_coverages(&self, request: PageRequest) -> RepositoryResult<Page<Coverage>> {
        let table = self.table.read();
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items: Vec<Coverage> = table
            .rows
            .values()
            .skip(offset)
            .take(request.per_page() as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, request, table.rows.len() as u64))
    }

    async fn insert_coverage(&self, coverage: NewCoverage) -> RepositoryResult<Coverage> {
        let stored = self.table.write().insert(coverage);
        debug!("Inserted coverage {} into local repository", stored.index);
        Ok(stored)
    }

    async fn delete_coverage(&self, key: CoverageKey) -> RepositoryResult<()> {
        match self.table.write().rows.remove(&key.value()) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::not_found_with_context(
                format!("Coverage {} not found", key),
                ErrorContext::new("delete_coverage")
                    .with_entity("coverage")
                    .with_entity_id(key),
            )),
        }
    }

    async fn recreate(&self, seed: &[NewCoverage]) -> RepositoryResult<usize> {
        let mut fresh = Table::empty();
        for row in seed {
            fresh.insert(row.clone());
        }
        *self.table.write() = fresh;
        debug!("Recreated local coverage table with {} rows", seed.len());
        Ok(seed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_coverages;

    fn coverage(shortname: &str, gbg: &str) -> NewCoverage {
        NewCoverage {
            gbg: gbg.to_string(),
            country: "Chile".to_string(),
            shortname: shortname.to_string(),
            motion: "Partner".to_string(),
            ipsbuild: "No".to_string(),
            tpsservice: "Yes".to_string(),
            covered: "Yes".to_string(),
        }
    }

    #[tokio::test]
    async fn test_keys_are_never_reused() {
        let repo = LocalRepository::new();
        let a = repo.insert_coverage(coverage("A", "1")).await.unwrap();
        let b = repo.insert_coverage(coverage("B", "2")).await.unwrap();
        repo.delete_coverage(b.index).await.unwrap();
        let c = repo.insert_coverage(coverage("C", "3")).await.unwrap();

        assert_eq!(a.index.value(), 1);
        assert_eq!(b.index.value(), 2);
        assert_eq!(c.index.value(), 3);
    }

    #[tokio::test]
    async fn test_find_returns_lowest_key_match() {
        let repo = LocalRepository::with_rows([
            coverage("Acme Norte", "G-10"),
            coverage("Acme Sur", "G-20"),
        ]);
        let found = repo
            .find_first_matching(SearchField::Shortname, "%acme%")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.shortname, "Acme Norte");

        let found = repo
            .find_first_matching(SearchField::Gbg, "%20%")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.shortname, "Acme Sur");

        let missing = repo
            .find_first_matching(SearchField::Gbg, "%nope%")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_not_found() {
        let repo = LocalRepository::new();
        let err = repo.delete_coverage(CoverageKey::new(99)).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.context().entity_id.as_deref(), Some("99"));
    }

    #[tokio::test]
    async fn test_list_pages() {
        let repo = LocalRepository::with_rows((0..5).map(|i| coverage(&format!("C{}", i), "G")));
        let page = repo
            .list_coverages(PageRequest::new(Some(2), Some(2)).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = page.items.iter().map(|c| c.shortname.as_str()).collect();
        assert_eq!(names, ["C2", "C3"]);
        assert_eq!(page.total, 5);

        let beyond = repo
            .list_coverages(PageRequest::new(Some(9), Some(2)).unwrap())
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[tokio::test]
    async fn test_recreate_resets_keys_and_rows() {
        let repo = LocalRepository::with_rows((0..4).map(|i| coverage(&format!("C{}", i), "G")));
        let inserted = repo.recreate(&sample_coverages()).await.unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(repo.len(), 2);

        let next = repo.insert_coverage(coverage("New", "G")).await.unwrap();
        assert_eq!(next.index.value(), 3);
    }
}
