//! SQLite database service
//!
//! Embedded backend for local use:
//! - WAL mode for concurrent reads during writes
//! - In-memory temp storage for fast queries
//! - Schema bootstrapped on startup
//!
//! For shared deployments, use PostgreSQL instead.

pub mod schema;

pub use sqlx::SqlitePool;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::ConnectOptions;
use sqlx::query::QueryAs;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions,
    SqliteRow, SqliteSynchronous,
};
use tracing::log::LevelFilter;

use crate::core::constants::{SQLITE_BUSY_TIMEOUT_SECS, SQLITE_CACHE_SIZE};
use crate::data::error::DataError;
use crate::data::sql::{SqlDialect, SqlValue, SqliteDialect, Statement};
use crate::data::traits::DataAccess;
use crate::data::types::NewCustomer;
use crate::filters::Entity;

const BACKEND: &str = "sqlite";

/// SQLite database service
///
/// Handles database initialization and connection pooling.
/// Should be created once at server startup and shared across all modules.
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Open (creating if missing) the database file and bootstrap the schema
    pub async fn init(path: &Path, max_connections: u32) -> Result<Self, DataError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .pragma("cache_size", SQLITE_CACHE_SIZE)
            .pragma("temp_store", "MEMORY")
            .log_statements(LevelFilter::Trace);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(DataError::from_sqlite)?;

        let service = Self { pool };
        service.bootstrap().await?;

        tracing::debug!(path = %path.display(), max_connections, "SqliteService initialized");
        Ok(service)
    }

    /// Private in-memory database. One connection that never expires, since each
    /// new connection to `:memory:` would see an empty database.
    pub async fn in_memory() -> Result<Self, DataError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(DataError::from_sqlite)?;

        let service = Self { pool };
        service.bootstrap().await?;
        Ok(service)
    }

    async fn bootstrap(&self) -> Result<(), DataError> {
        sqlx::raw_sql(schema::SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::schema_failed(BACKEND, e))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query to prove the pool is usable
    pub async fn ping(&self) -> Result<(), DataError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DataError::from_sqlite)?;
        Ok(())
    }

    /// Insert customers in one transaction. Existing external IDs are skipped;
    /// returns how many rows were written.
    pub async fn insert_customers(&self, customers: &[NewCustomer]) -> Result<u64, DataError> {
        let mut tx = self.pool.begin().await.map_err(DataError::from_sqlite)?;
        let mut inserted = 0;
        for c in customers {
            let result = sqlx::query(
                "INSERT INTO customers (external_id, account_id, name, email, active, tier, \
                 balance, order_count, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (external_id) DO NOTHING",
            )
            .bind(&c.external_id)
            .bind(c.account_id)
            .bind(&c.name)
            .bind(&c.email)
            .bind(c.active)
            .bind(&c.tier)
            .bind(c.balance)
            .bind(c.order_count)
            .bind(c.created_at)
            .execute(&mut *tx)
            .await
            .map_err(DataError::from_sqlite)?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(DataError::from_sqlite)?;
        tracing::debug!(inserted, requested = customers.len(), "Inserted customers");
        Ok(inserted)
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }
}

fn bind_all<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &[SqlValue],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Integer(i) => query.bind(*i),
            SqlValue::Real(f) => query.bind(*f),
            SqlValue::Bool(b) => query.bind(*b),
        };
    }
    query
}

#[async_trait]
impl<E> DataAccess<E> for SqliteService
where
    E: Entity + for<'r> sqlx::FromRow<'r, SqliteRow>,
{
    fn dialect(&self) -> &'static dyn SqlDialect {
        &SqliteDialect
    }

    async fn fetch(&self, statement: &Statement) -> Result<Vec<E>, DataError> {
        bind_all(sqlx::query_as::<_, E>(&statement.sql), &statement.params)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::from_sqlite)
    }

    async fn count(&self, statement: &Statement) -> Result<u64, DataError> {
        let (count,) = bind_all(sqlx::query_as::<_, (i64,)>(&statement.sql), &statement.params)
            .fetch_one(&self.pool)
            .await
            .map_err(DataError::from_sqlite)?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::sample_customers;
    use crate::data::types::CustomerRow;

    async fn seeded(count: u32) -> SqliteService {
        let service = SqliteService::in_memory().await.unwrap();
        service
            .insert_customers(&sample_customers(count))
            .await
            .unwrap();
        service
    }

    fn statement(sql: &str, params: Vec<SqlValue>) -> Statement {
        Statement::new(sql, params)
    }

    #[tokio::test]
    async fn test_in_memory_bootstrap() {
        let service = SqliteService::in_memory().await.unwrap();
        service.ping().await.unwrap();
        let count = DataAccess::<CustomerRow>::count(
            &service,
            &statement("SELECT COUNT(*) FROM customers WHERE 1=1", vec![]),
        )
        .await
        .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_fetch_decodes_rows() {
        let service = seeded(5).await;
        let rows: Vec<CustomerRow> = service
            .fetch(&statement(
                "SELECT * FROM customers WHERE active = ? ORDER BY id ASC LIMIT 10 OFFSET 0",
                vec![SqlValue::Bool(true)],
            ))
            .await
            .unwrap();
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.active));
        assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_like_is_case_insensitive_and_escaped() {
        let service = seeded(10).await;
        let lower = DataAccess::<CustomerRow>::count(
            &service,
            &statement(
                r"SELECT COUNT(*) FROM customers WHERE name LIKE ? ESCAPE '\'",
                vec![SqlValue::Text("%john%".to_string())],
            ),
        )
        .await
        .unwrap();
        assert!(lower > 0);

        let literal = DataAccess::<CustomerRow>::count(
            &service,
            &statement(
                r"SELECT COUNT(*) FROM customers WHERE name LIKE ? ESCAPE '\'",
                vec![SqlValue::Text(r"%\%%".to_string())],
            ),
        )
        .await
        .unwrap();
        assert_eq!(literal, 0);
    }

    #[tokio::test]
    async fn test_insert_skips_existing() {
        let service = seeded(3).await;
        let inserted = service
            .insert_customers(&sample_customers(5))
            .await
            .unwrap();
        assert_eq!(inserted, 2);
    }

    #[tokio::test]
    async fn test_bad_sql_is_backend_error() {
        let service = SqliteService::in_memory().await.unwrap();
        let result = DataAccess::<CustomerRow>::count(
            &service,
            &statement("SELECT COUNT(*) FROM nowhere", vec![]),
        )
        .await;
        assert!(matches!(result, Err(DataError::Sqlite(_))));
    }

    #[tokio::test]
    async fn test_init_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("test.db");
        let service = SqliteService::init(&path, 2).await.unwrap();
        service.ping().await.unwrap();
        assert!(path.exists());
        service.close().await;
    }
}
