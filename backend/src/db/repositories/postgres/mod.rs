//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Optional schema qualifier applied to every pooled connection
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `TABLE_SCHEMA`: Schema holding `sa_coverages` (default: `search_path` of the role)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    CoverageRepository, ErrorContext, RepositoryError, RepositoryResult,
};
use crate::models::{Coverage, CoverageKey, NewCoverage, Page, PageRequest, SearchField};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

const TABLE_NAME: &str = "sa_coverages";

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Schema qualifier for the coverage table
    pub table_schema: Option<String>,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            table_schema: None,
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// See the module documentation for the variables read.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let table_schema = std::env::var("TABLE_SCHEMA")
            .ok()
            .filter(|s| !s.trim().is_empty());
        if let Some(schema) = table_schema.as_deref() {
            validate_schema_name(schema)?;
        }

        let defaults = Self::default();
        Ok(Self {
            database_url,
            table_schema,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    /// Table name, qualified with the configured schema if any.
    fn qualified_table(&self) -> String {
        match self.table_schema.as_deref() {
            Some(schema) => format!("\"{}\".{}", schema, TABLE_NAME),
            None => TABLE_NAME.to_string(),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Accept only plain SQL identifiers; the schema name is interpolated into DDL.
pub fn validate_schema_name(schema: &str) -> Result<(), String> {
    let mut chars = schema.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(format!(
            "TABLE_SCHEMA '{}' is not a valid schema identifier",
            schema
        ))
    }
}

fn create_table_sql(qualified_table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         \"index\" BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY, \
         gbg VARCHAR(255) NOT NULL, \
         country VARCHAR(255) NOT NULL, \
         shortname VARCHAR(255) NOT NULL, \
         motion VARCHAR(255) NOT NULL, \
         ipsbuild VARCHAR(255) NOT NULL, \
         tpsservice VARCHAR(255) NOT NULL, \
         covered VARCHAR(255) NOT NULL)",
        qualified_table
    )
}

/// Points every pooled connection's `search_path` at the configured schema.
#[derive(Debug, Clone)]
struct SearchPathCustomizer {
    schema: String,
}

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for SearchPathCustomizer {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        sql_query(format!("SET search_path TO \"{}\", public", self.schema))
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Errors
    /// Fails if the schema name is invalid, the pool cannot be built, or a
    /// migration fails.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let mut builder = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true);

        if let Some(schema) = config.table_schema.clone() {
            validate_schema_name(&schema).map_err(|e| {
                RepositoryError::configuration_with_context(e, ErrorContext::new("create_pool"))
            })?;
            builder = builder.connection_customizer(Box::new(SearchPathCustomizer { schema }));
        }

        let pool = builder.build(manager).map_err(|e| {
            RepositoryError::connection_with_context(
                e.to_string(),
                ErrorContext::new("create_pool")
                    .with_details(format!("max_size={}", config.max_pool_size)),
            )
        })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            if let Some(schema) = config.table_schema.as_deref() {
                sql_query(format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", schema))
                    .execute(&mut *conn)
                    .map_err(|e| {
                        RepositoryError::from(e).with_operation("create_schema")
                    })?;
            }
            Self::run_migrations(&mut conn)?;
        }

        info!(
            "Postgres repository ready (table={}, pool_max={})",
            config.qualified_table(),
            config.max_pool_size
        );

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Retries up to `max_retries` times on retryable errors, doubling the
    /// delay each time.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            warn!("{}; retrying", err);
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        warn!("{}; retrying", e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl CoverageRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_first_matching(
        &self,
        field: SearchField,
        pattern: &str,
    ) -> RepositoryResult<Option<Coverage>> {
        let pattern = pattern.to_string();
        self.with_conn(move |conn| {
            let row = match field {
                SearchField::Gbg => sa_coverages::table
                    .filter(sa_coverages::gbg.ilike(&pattern))
                    .order(sa_coverages::index.asc())
                    .select(CoverageRow::as_select())
                    .first::<CoverageRow>(conn)
                    .optional(),
                SearchField::Shortname => sa_coverages::table
                    .filter(sa_coverages::shortname.ilike(&pattern))
                    .order(sa_coverages::index.asc())
                    .select(CoverageRow::as_select())
                    .first::<CoverageRow>(conn)
                    .optional(),
            }
            .map_err(map_diesel_error)?;

            Ok(row.map(Coverage::from))
        })
        .await
    }

    async fn list_coverages(&self, request: PageRequest) -> RepositoryResult<Page<Coverage>> {
        self.with_conn(move |conn| {
            let total: i64 = sa_coverages::table
                .count()
                .get_result(conn)
                .map_err(map_diesel_error)?;

            let rows = sa_coverages::table
                .order(sa_coverages::index.asc())
                .limit(request.per_page() as i64)
                .offset(i64::try_from(request.offset()).unwrap_or(i64::MAX))
                .select(CoverageRow::as_select())
                .load::<CoverageRow>(conn)
                .map_err(map_diesel_error)?;

            Ok(Page::new(
                rows.into_iter().map(Coverage::from).collect(),
                request,
                total.max(0) as u64,
            ))
        })
        .await
    }

    async fn insert_coverage(&self, coverage: NewCoverage) -> RepositoryResult<Coverage> {
        let row = NewCoverageRow::from(coverage);
        self.with_conn(move |conn| {
            let inserted: CoverageRow = diesel::insert_into(sa_coverages::table)
                .values(&row)
                .returning(CoverageRow::as_returning())
                .get_result(conn)
                .map_err(|e| map_diesel_error(e).with_operation("insert_coverage"))?;
            debug!("Inserted coverage {}", inserted.index);
            Ok(Coverage::from(inserted))
        })
        .await
    }

    async fn delete_coverage(&self, key: CoverageKey) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(sa_coverages::table.find(key.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;

            if deleted == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Coverage {} not found", key),
                    ErrorContext::new("delete_coverage")
                        .with_entity("coverage")
                        .with_entity_id(key),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn recreate(&self, seed: &[NewCoverage]) -> RepositoryResult<usize> {
        let table = self.config.qualified_table();
        let rows: Vec<NewCoverageRow> = seed.iter().cloned().map(NewCoverageRow::from).collect();
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                sql_query(format!("DROP TABLE IF EXISTS {}", table)).execute(tx)?;
                sql_query(create_table_sql(&table)).execute(tx)?;
                let inserted = diesel::insert_into(sa_coverages::table)
                    .values(&rows)
                    .execute(tx)?;
                info!("Recreated {} with {} sample rows", table, inserted);
                Ok(inserted)
            })
            .map_err(|e| e.with_operation("recreate"))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_schema_name() {
        assert!(validate_schema_name("coverage_app").is_ok());
        assert!(validate_schema_name("_x1").is_ok());
        assert!(validate_schema_name("1abc").is_err());
        assert!(validate_schema_name("a;drop").is_err());
        assert!(validate_schema_name("").is_err());
    }

    #[test]
    fn test_qualified_table() {
        let mut config = PostgresConfig::with_url("postgres://localhost/test");
        assert_eq!(config.qualified_table(), "sa_coverages");
        config.table_schema = Some("watson".into());
        assert_eq!(config.qualified_table(), "\"watson\".sa_coverages");
    }

    #[test]
    fn test_create_table_sql_is_qualified() {
        let sql = create_table_sql("\"watson\".sa_coverages");
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"watson\".sa_coverages ("));
        assert!(sql.contains("GENERATED BY DEFAULT AS IDENTITY"));
    }
}
