//! Data access trait for the filter engine
//!
//! The engine only needs three things from a store: the SQL dialect to
//! translate predicates with, a way to fetch entity rows, and a way to count.
//! SQLite and PostgreSQL stores (and the `DataStore` enum over them)
//! implement this trait.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::sql::{SqlDialect, Statement};
use crate::filters::Entity;

#[async_trait]
pub trait DataAccess<E: Entity>: Send + Sync {
    /// Dialect used to render statements for this store
    fn dialect(&self) -> &'static dyn SqlDialect;

    /// Run a SELECT and decode every row as `E`, in store order
    async fn fetch(&self, statement: &Statement) -> Result<Vec<E>, DataError>;

    /// Run a `SELECT COUNT(*)` and return the single count
    async fn count(&self, statement: &Statement) -> Result<u64, DataError>;
}
