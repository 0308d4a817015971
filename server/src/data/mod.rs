//! Data storage layer
//!
//! Provides database services for the filter engine:
//! - `sqlite` - Embedded database (default)
//! - `postgres` - Shared database for multi-instance deployments
//! - `sql` - SQL dialects and backend-neutral statements
//! - `traits` - The `DataAccess` trait the engine queries through
//! - `types` - Row types and their field tables
//! - `seed` - Deterministic demo rows
//! - `error` - Unified error type for all backends

pub mod error;
pub mod postgres;
pub mod seed;
pub mod sql;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use postgres::PostgresService;
pub use sqlite::SqliteService;
pub use traits::DataAccess;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;

use crate::core::config::{DatabaseBackend, DatabaseConfig};
use crate::data::sql::{SqlDialect, Statement};
use crate::data::types::NewCustomer;
use crate::filters::Entity;

/// Database service enum
///
/// Wraps the underlying backend-specific service (SQLite or PostgreSQL).
/// Services are stored as Arc so the store can be cloned into handlers.
#[derive(Clone)]
pub enum DataStore {
    /// SQLite backend (default, embedded)
    Sqlite(Arc<SqliteService>),
    /// PostgreSQL backend
    Postgres(Arc<PostgresService>),
}

impl DataStore {
    /// Initialize the configured backend and verify it answers a query
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        let store = match config.backend {
            DatabaseBackend::Sqlite => {
                let service = SqliteService::init(&config.sqlite_path, config.max_connections).await?;
                Self::Sqlite(Arc::new(service))
            }
            DatabaseBackend::Postgres => {
                let url = config.postgres_url.as_deref().ok_or_else(|| {
                    DataError::Config("PostgreSQL URL required".to_string())
                })?;
                let service = PostgresService::init(url, config.max_connections).await?;
                Self::Postgres(Arc::new(service))
            }
        };
        store.ping().await?;
        tracing::debug!(backend = store.backend().as_str(), "Data store ready");
        Ok(store)
    }

    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Self::Sqlite(_) => DatabaseBackend::Sqlite,
            Self::Postgres(_) => DatabaseBackend::Postgres,
        }
    }

    pub async fn ping(&self) -> Result<(), DataError> {
        match self {
            Self::Sqlite(s) => s.ping().await,
            Self::Postgres(p) => p.ping().await,
        }
    }

    pub async fn insert_customers(&self, customers: &[NewCustomer]) -> Result<u64, DataError> {
        match self {
            Self::Sqlite(s) => s.insert_customers(customers).await,
            Self::Postgres(p) => p.insert_customers(customers).await,
        }
    }

    /// Close the database connection gracefully
    pub async fn close(&self) {
        match self {
            Self::Sqlite(s) => s.close().await,
            Self::Postgres(p) => p.close().await,
        }
    }
}

#[async_trait]
impl<E> DataAccess<E> for DataStore
where
    E: Entity + for<'r> sqlx::FromRow<'r, SqliteRow> + for<'r> sqlx::FromRow<'r, PgRow>,
{
    fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Self::Sqlite(s) => DataAccess::<E>::dialect(s.as_ref()),
            Self::Postgres(p) => DataAccess::<E>::dialect(p.as_ref()),
        }
    }

    async fn fetch(&self, statement: &Statement) -> Result<Vec<E>, DataError> {
        match self {
            Self::Sqlite(s) => s.fetch(statement).await,
            Self::Postgres(p) => p.fetch(statement).await,
        }
    }

    async fn count(&self, statement: &Statement) -> Result<u64, DataError> {
        match self {
            Self::Sqlite(s) => DataAccess::<E>::count(s.as_ref(), statement).await,
            Self::Postgres(p) => DataAccess::<E>::count(p.as_ref(), statement).await,
        }
    }
}
