use super::repositories::LocalRepository;
use super::repository::CoverageRepository;
use super::services::{self, ServiceError};
use crate::models::{CoverageDraft, CoverageKey, NewCoverage, PageRequest};

fn coverage(shortname: &str, gbg: &str) -> NewCoverage {
    NewCoverage {
        gbg: gbg.to_string(),
        country: "Argentina".to_string(),
        shortname: shortname.to_string(),
        motion: "Direct".to_string(),
        ipsbuild: "Yes".to_string(),
        tpsservice: "Yes".to_string(),
        covered: "No".to_string(),
    }
}

fn draft(shortname: &str) -> CoverageDraft {
    CoverageDraft {
        gbg: Some("GBG-77".into()),
        country: Some("Peru".into()),
        shortname: Some(shortname.into()),
        motion: Some("Partner".into()),
        ipsbuild: Some("No".into()),
        tpsservice: Some("No".into()),
        covered: Some("Yes".into()),
    }
}

#[tokio::test]
async fn test_find_by_gbg_is_case_insensitive_substring() {
    let repo = LocalRepository::with_rows([coverage("Acme", "ab-CD-123")]);
    let found = services::find_coverage_by_gbg(&repo, "cd-1").await.unwrap();
    assert_eq!(found.shortname, "Acme");
}

#[tokio::test]
async fn test_find_by_name_plus_matches_any_char() {
    let repo = LocalRepository::with_rows([coverage("Banco del Sur", "1")]);
    let found = services::find_coverage_by_name(&repo, "banco+del").await.unwrap();
    assert_eq!(found.gbg, "1");
}

#[tokio::test]
async fn test_find_without_match_is_not_found() {
    let repo = LocalRepository::with_rows([coverage("Acme", "1")]);
    let err = services::find_coverage_by_name(&repo, "zeta").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_validates_before_insert() {
    let repo = LocalRepository::new();
    let mut bad = draft("Acme");
    bad.covered = None;

    match services::create_coverage(&repo, bad).await {
        Err(ServiceError::Validation(errors)) => {
            assert_eq!(errors.fields().collect::<Vec<_>>(), ["covered"]);
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(repo.is_empty());
}

#[tokio::test]
async fn test_created_keys_are_unique() {
    let repo = LocalRepository::new();
    let a = services::create_coverage(&repo, draft("A")).await.unwrap();
    let b = services::create_coverage(&repo, draft("B")).await.unwrap();
    assert_ne!(a.index, b.index);
}

#[tokio::test]
async fn test_delete_twice_reports_not_found() {
    let repo = LocalRepository::new();
    let created = services::create_coverage(&repo, draft("A")).await.unwrap();
    services::delete_coverage(&repo, created.index).await.unwrap();
    let err = services::delete_coverage(&repo, created.index)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_recreate_requires_confirmation() {
    let repo = LocalRepository::with_rows([coverage("Keep", "1")]);
    let err = services::recreate_coverages(&repo, false).await.unwrap_err();
    assert!(matches!(err, ServiceError::ConfirmationMissing));
    assert_eq!(repo.len(), 1);
    assert!(repo.delete_coverage(CoverageKey::new(1)).await.is_ok());
}

#[tokio::test]
async fn test_recreate_leaves_only_samples() {
    let repo = LocalRepository::with_rows((0..7).map(|i| coverage(&i.to_string(), "g")));
    let inserted = services::recreate_coverages(&repo, true).await.unwrap();
    assert_eq!(inserted, 2);

    let page = services::list_coverages(&repo, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    let names: Vec<_> = page.items.iter().map(|c| c.shortname.as_str()).collect();
    assert_eq!(names, ["Sample", "Sample 2"]);
    assert_eq!(page.items[0].index.value(), 1);
}

#[tokio::test]
async fn test_list_page_size_bounds_result() {
    let repo = LocalRepository::with_rows((0..30).map(|i| coverage(&i.to_string(), "g")));
    let page = services::list_coverages(&repo, PageRequest::new(None, Some(7)).unwrap())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 7);
    assert_eq!(page.pages(), 5);
}
