use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT,
    POSTGRES_DEFAULT_MAX_CONNECTIONS, SQLITE_DB_FILENAME, SQLITE_MAX_CONNECTIONS,
};

// =============================================================================
// Database Backend Enum (SQLite or PostgreSQL)
// =============================================================================

/// Database backend the filter engine queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sqlite,
    Postgres,
}

impl DatabaseBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseBackend::Sqlite => "sqlite",
            DatabaseBackend::Postgres => "postgres",
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Backend: sqlite (default) or postgres
    pub backend: Option<DatabaseBackend>,
    /// SQLite database file (default: ~/.pagefilter/pagefilter.db)
    pub sqlite_path: Option<String>,
    /// PostgreSQL connection URL (or use PAGEFILTER_POSTGRES_URL env var)
    pub postgres_url: Option<String>,
    /// Maximum pooled connections (default depends on backend)
    pub max_connections: Option<u32>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Names of top-level keys this version does not understand
    fn unknown_fields(&self) -> Vec<&str> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().map(|k| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_fields();
        if !unknown.is_empty() {
            tracing::warn!(
                fields = %unknown.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.backend.is_some() {
                tracing::trace!(backend = ?database.backend, "Merging database.backend");
                current.backend = database.backend;
            }
            if database.sqlite_path.is_some() {
                current.sqlite_path = database.sqlite_path;
            }
            if database.postgres_url.is_some() {
                current.postgres_url = database.postgres_url;
            }
            if database.max_connections.is_some() {
                current.max_connections = database.max_connections;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub sqlite_path: PathBuf,
    /// Only used when backend = postgres
    pub postgres_url: Option<String>,
    pub max_connections: u32,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.pagefilter/pagefilter.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::resolve(file_config, cli);
        config.validate()?;
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn resolve(file_config: FileConfig, cli: &CliConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let backend = cli
            .database_backend
            .or(file_database.backend)
            .unwrap_or_default();

        let sqlite_path = cli
            .sqlite_path
            .as_ref()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_database.sqlite_path.as_deref().map(expand_path))
            .unwrap_or_else(default_sqlite_path);

        let postgres_url = cli
            .postgres_url
            .clone()
            .or(file_database.postgres_url)
            .filter(|url| !url.trim().is_empty());

        let default_connections = match backend {
            DatabaseBackend::Sqlite => SQLITE_MAX_CONNECTIONS,
            DatabaseBackend::Postgres => POSTGRES_DEFAULT_MAX_CONNECTIONS,
        };
        let max_connections = cli
            .max_connections
            .or(file_database.max_connections)
            .unwrap_or(default_connections);

        Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                backend,
                sqlite_path,
                postgres_url,
                max_connections,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("Configuration error: database.max_connections must be greater than 0");
        }
        if self.database.backend == DatabaseBackend::Postgres && self.database.postgres_url.is_none()
        {
            anyhow::bail!(
                "Configuration error: database.postgres_url is required when database.backend is postgres"
            );
        }
        Ok(())
    }
}

/// Get the profile config path (~/.pagefilter/pagefilter.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Default SQLite file, in the profile folder when a home directory exists
fn default_sqlite_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(APP_DOT_FOLDER).join(SQLITE_DB_FILENAME))
        .unwrap_or_else(|| PathBuf::from(SQLITE_DB_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> FileConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_database_backend_serde() {
        let backend: DatabaseBackend = serde_json::from_str(r#""postgres""#).unwrap();
        assert_eq!(backend, DatabaseBackend::Postgres);
        assert_eq!(DatabaseBackend::Sqlite.to_string(), "sqlite");
    }

    #[test]
    fn test_file_config_parse_full() {
        let config = parse(
            r#"{
                "server": {"host": "0.0.0.0", "port": 8080},
                "database": {"backend": "sqlite", "sqlite_path": "/tmp/pf.db", "max_connections": 3}
            }"#,
        );
        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(8080));
        let database = config.database.unwrap();
        assert_eq!(database.backend, Some(DatabaseBackend::Sqlite));
        assert_eq!(database.max_connections, Some(3));
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let config = parse(r#"{"server": {"port": 1}, "pagination": {"max": 5}, "debug": true}"#);
        let mut unknown = config.unknown_fields();
        unknown.sort_unstable();
        assert_eq!(unknown, vec!["debug", "pagination"]);
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config = parse("{}");
        assert!(config.server.is_none());
        assert!(config.database.is_none());
        assert!(config.unknown_fields().is_empty());
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = parse(r#"{"server": {"host": "127.0.0.1", "port": 1000}}"#);
        base.merge(parse(
            r#"{"server": {"port": 2000}, "database": {"backend": "postgres"}}"#,
        ));
        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(2000));
        assert_eq!(
            base.database.as_ref().unwrap().backend,
            Some(DatabaseBackend::Postgres)
        );
    }

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(FileConfig::default(), &CliConfig::default());
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert_eq!(config.database.max_connections, SQLITE_MAX_CONNECTIONS);
        assert!(config.database.sqlite_path.ends_with(SQLITE_DB_FILENAME));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let file = parse(r#"{"server": {"port": 1000}, "database": {"max_connections": 4}}"#);
        let cli = CliConfig {
            port: Some(3000),
            ..Default::default()
        };
        let config = AppConfig::resolve(file, &cli);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 4);
    }

    #[test]
    fn test_validate_postgres_requires_url() {
        let cli = CliConfig {
            database_backend: Some(DatabaseBackend::Postgres),
            ..Default::default()
        };
        let config = AppConfig::resolve(FileConfig::default(), &cli);
        assert_eq!(config.database.max_connections, POSTGRES_DEFAULT_MAX_CONNECTIONS);
        assert!(config.validate().is_err());

        let cli = CliConfig {
            database_backend: Some(DatabaseBackend::Postgres),
            postgres_url: Some("postgres://localhost/pf".to_string()),
            ..Default::default()
        };
        assert!(AppConfig::resolve(FileConfig::default(), &cli).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        assert!(AppConfig::resolve(FileConfig::default(), &cli).validate().is_err());

        let cli = CliConfig {
            max_connections: Some(0),
            ..Default::default()
        };
        assert!(AppConfig::resolve(FileConfig::default(), &cli).validate().is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(
            &path,
            r#"{"server": {"port": 7777}, "database": {"sqlite_path": "/tmp/custom.db"}}"#,
        )
        .unwrap();

        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 7777);
        assert_eq!(config.database.sqlite_path, PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/definitely/not/here/pagefilter.json")),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }
}
