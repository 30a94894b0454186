//! Tests for db::factory module - repository creation and configuration.

mod support;

use std::io::Write;
use std::str::FromStr;

use coverage_api::db::factory::{RepositoryFactory, RepositoryType};
use coverage_api::db::{RepositoryConfig, RepositoryError};

#[test]
fn test_repository_type_from_str_postgres() {
    let rt = RepositoryType::from_str("postgres").unwrap();
    assert_eq!(rt, RepositoryType::Postgres);

    let rt = RepositoryType::from_str("POSTGRES").unwrap();
    assert_eq!(rt, RepositoryType::Postgres);

    let rt = RepositoryType::from_str("pg").unwrap();
    assert_eq!(rt, RepositoryType::Postgres);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("sqlite");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/coverages")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres);
        },
    );
}

#[test]
fn test_repository_type_explicit_wins_over_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/coverages")),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_from_env_builds_working_local_repository() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_CONFIG", None),
            ("REPOSITORY_TYPE", Some("local")),
        ],
        || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let repo = RepositoryFactory::from_env().await.unwrap();
                assert!(repo.health_check().await.unwrap());
            });
        },
    );
}

#[test]
fn test_config_file_takes_precedence() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();
    let path = file.path().to_string_lossy().into_owned();

    support::with_scoped_env(
        &[
            ("REPOSITORY_CONFIG", Some(path.as_str())),
            ("REPOSITORY_TYPE", Some("postgres")),
        ],
        || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let repo = RepositoryFactory::from_env().await.unwrap();
                assert!(repo.health_check().await.unwrap());
            });
        },
    );
}

#[tokio::test]
async fn test_missing_config_file_is_configuration_error() {
    let result = RepositoryFactory::from_config_file("/nonexistent/repository.toml").await;
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[test]
fn test_config_file_bad_type() {
    let config = RepositoryConfig::from_toml("[repository]\ntype = \"oracle\"").unwrap();
    assert!(config.repository_type().is_err());
}

#[test]
fn test_config_postgres_section_defaults() {
    let config = RepositoryConfig::from_toml(
        "[repository]\ntype = \"postgres\"\n\n[postgres]\ndatabase_url = \"postgres://db/cov\"\ntable_schema = \"sa\"",
    )
    .unwrap();
    assert_eq!(config.repository_type().unwrap(), RepositoryType::Postgres);
    assert_eq!(config.postgres.database_url, "postgres://db/cov");
    assert_eq!(config.postgres.table_schema.as_deref(), Some("sa"));
    assert_eq!(config.postgres.max_connections, 10);
    assert_eq!(config.postgres.max_retries, 3);
}
