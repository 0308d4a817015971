//! PostgreSQL schema definitions

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Customers
-- =============================================================================
CREATE TABLE IF NOT EXISTS customers (
    id BIGSERIAL PRIMARY KEY,
    external_id TEXT NOT NULL UNIQUE,
    account_id BIGINT NOT NULL,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    email TEXT,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    tier TEXT NOT NULL CHECK(tier IN ('bronze', 'silver', 'gold')),
    balance DOUBLE PRECISION NOT NULL DEFAULT 0,
    order_count BIGINT NOT NULL DEFAULT 0,
    created_at BIGINT NOT NULL,
    version BIGINT NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_customers_account ON customers(account_id);
CREATE INDEX IF NOT EXISTS idx_customers_created ON customers(created_at);
"#;
