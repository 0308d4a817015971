//! PostgreSQL database service
//!
//! Backend for shared deployments:
//! - Connection pooling with min/max bounds
//! - Idle connection cleanup
//! - Statement timeout protection
//!
//! The schema is bootstrapped on startup.

pub mod schema;

pub use sqlx::PgPool;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::ConnectOptions;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow, Postgres};
use sqlx::query::QueryAs;
use tracing::log::LevelFilter;

use crate::core::constants::{
    POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS, POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS,
    POSTGRES_DEFAULT_MIN_CONNECTIONS, POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS,
};
use crate::data::error::DataError;
use crate::data::sql::{PostgresDialect, SqlDialect, SqlValue, Statement};
use crate::data::traits::DataAccess;
use crate::data::types::NewCustomer;
use crate::filters::Entity;

const BACKEND: &str = "postgres";

/// PostgreSQL database service
///
/// Handles database initialization and connection pooling.
/// Should be created once at server startup and shared across all modules.
pub struct PostgresService {
    pool: PgPool,
}

impl PostgresService {
    /// Connect with the given URL and bootstrap the schema
    pub async fn init(url: &str, max_connections: u32) -> Result<Self, DataError> {
        if url.is_empty() {
            return Err(DataError::Config("PostgreSQL URL is required".into()));
        }

        let options: PgConnectOptions = url
            .parse()
            .map_err(|e| DataError::Config(format!("Invalid PostgreSQL URL: {}", e)))?;
        let options = options
            .log_statements(LevelFilter::Trace)
            .options([(
                "statement_timeout",
                format!("{}s", POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS),
            )]);

        let min_connections = POSTGRES_DEFAULT_MIN_CONNECTIONS.min(max_connections);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(DataError::from_postgres)?;

        sqlx::raw_sql(schema::SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| DataError::schema_failed(BACKEND, e))?;

        tracing::debug!(max_connections, min_connections, "PostgresService initialized");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query to prove the pool is usable
    pub async fn ping(&self) -> Result<(), DataError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(DataError::from_postgres)?;
        Ok(())
    }

    /// Insert customers in one transaction. Existing external IDs are skipped;
    /// returns how many rows were written.
    pub async fn insert_customers(&self, customers: &[NewCustomer]) -> Result<u64, DataError> {
        let mut tx = self.pool.begin().await.map_err(DataError::from_postgres)?;
        let mut inserted = 0;
        for c in customers {
            let result = sqlx::query(
                "INSERT INTO customers (external_id, account_id, name, email, active, tier, \
                 balance, order_count, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
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
            .map_err(DataError::from_postgres)?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(DataError::from_postgres)?;
        tracing::debug!(inserted, requested = customers.len(), "Inserted customers");
        Ok(inserted)
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("PostgreSQL pool closed");
    }
}

fn bind_all<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
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
impl<E> DataAccess<E> for PostgresService
where
    E: Entity + for<'r> sqlx::FromRow<'r, PgRow>,
{
    fn dialect(&self) -> &'static dyn SqlDialect {
        &PostgresDialect
    }

    async fn fetch(&self, statement: &Statement) -> Result<Vec<E>, DataError> {
        bind_all(sqlx::query_as::<_, E>(&statement.sql), &statement.params)
            .fetch_all(&self.pool)
            .await
            .map_err(DataError::from_postgres)
    }

    async fn count(&self, statement: &Statement) -> Result<u64, DataError> {
        let (count,) = bind_all(sqlx::query_as::<_, (i64,)>(&statement.sql), &statement.params)
            .fetch_one(&self.pool)
            .await
            .map_err(DataError::from_postgres)?;
        Ok(count.max(0) as u64)
    }
}
