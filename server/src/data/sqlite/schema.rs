//! SQLite schema definitions

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Customers
-- =============================================================================
CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id TEXT NOT NULL UNIQUE,
    account_id INTEGER NOT NULL,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    email TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    tier TEXT NOT NULL CHECK(tier IN ('bronze', 'silver', 'gold')),
    balance REAL NOT NULL DEFAULT 0,
    order_count INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    version INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_customers_account ON customers(account_id);
CREATE INDEX IF NOT EXISTS idx_customers_created ON customers(created_at);
"#;
