//! SQL dialect trait for multi-database support
//!
//! This trait defines the interface for generating database-specific SQL syntax.

use chrono::{DateTime, Utc};

use super::SqlValue;

/// SQL dialect trait for generating database-specific SQL
///
/// Different databases have different syntax for:
/// - Parameter placeholders (? vs $1)
/// - Case-insensitive pattern matching
/// - Limit/offset clauses
/// - Timestamp storage
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Case-insensitive substring match against an escaped `%...%` pattern
    ///
    /// - SQLite: `col LIKE ? ESCAPE '\'` (LIKE is ASCII case-insensitive)
    /// - PostgreSQL: `col ILIKE $1 ESCAPE '\'`
    fn contains(&self, col: &str, placeholder: &str) -> String;

    /// Bind value for a timestamp; both backends store unix seconds
    fn timestamp_value(&self, ts: &DateTime<Utc>) -> SqlValue {
        SqlValue::Integer(ts.timestamp())
    }

    /// Generate LIMIT/OFFSET clause
    ///
    /// Most databases use `LIMIT x OFFSET y`, but syntax may vary.
    fn limit_offset(&self, limit: u32, offset: u64) -> String {
        format!("LIMIT {} OFFSET {}", limit, offset)
    }

    /// Generate an ORDER BY term
    fn order_by(&self, col: &str, desc: bool) -> String {
        let dir = if desc { "DESC" } else { "ASC" };
        format!("{} {}", col, dir)
    }
}
