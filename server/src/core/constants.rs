// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "PageFilter";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "pagefilter";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".pagefilter";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "pagefilter.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "PAGEFILTER_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "PAGEFILTER_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "PAGEFILTER_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "PAGEFILTER_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

// =============================================================================
// Database Backends
// =============================================================================

/// Environment variable for database backend (sqlite or postgres)
pub const ENV_DATABASE_BACKEND: &str = "PAGEFILTER_DATABASE_BACKEND";

/// Environment variable for the SQLite database file path
pub const ENV_SQLITE_PATH: &str = "PAGEFILTER_SQLITE_PATH";

/// Environment variable for PostgreSQL connection URL
pub const ENV_POSTGRES_URL: &str = "PAGEFILTER_POSTGRES_URL";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename, placed in the dot folder unless overridden
pub const SQLITE_DB_FILENAME: &str = "pagefilter.db";

/// SQLite max connections (WAL allows concurrent readers)
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite page cache size (negative = KiB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

// =============================================================================
// PostgreSQL Database
// =============================================================================

/// PostgreSQL default max connections
pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL default min connections (keep warm for low latency)
pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 2;

/// PostgreSQL default connection acquire timeout in seconds
pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// PostgreSQL idle connection timeout in seconds
pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// PostgreSQL statement timeout in seconds (prevent runaway queries)
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Demo Data
// =============================================================================

/// Customers inserted by `pagefilter seed` when no count is given
pub const DEFAULT_SEED_COUNT: u32 = 100;
