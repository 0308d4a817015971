use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::DatabaseBackend;
use super::constants::{
    ENV_CONFIG, ENV_DATABASE_BACKEND, ENV_HOST, ENV_PORT, ENV_POSTGRES_URL, ENV_SQLITE_PATH,
};

#[derive(Parser)]
#[command(name = "pagefilter")]
#[command(version, about = "Filtered, paginated listings over SQL stores", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    // Database options
    /// Database backend (sqlite or postgres)
    #[arg(long, global = true, env = ENV_DATABASE_BACKEND, value_parser = parse_database_backend)]
    pub database_backend: Option<DatabaseBackend>,

    /// SQLite database file (when using sqlite backend)
    #[arg(long, global = true, env = ENV_SQLITE_PATH)]
    pub sqlite_path: Option<PathBuf>,

    /// PostgreSQL connection URL (when using postgres backend)
    #[arg(long, global = true, env = ENV_POSTGRES_URL)]
    pub postgres_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, global = true)]
    pub max_connections: Option<u32>,
}

/// Parse database backend from CLI/env string
fn parse_database_backend(s: &str) -> Result<DatabaseBackend, String> {
    match s.to_lowercase().as_str() {
        "sqlite" => Ok(DatabaseBackend::Sqlite),
        "postgres" | "postgresql" => Ok(DatabaseBackend::Postgres),
        _ => Err(format!(
            "Invalid database backend '{}'. Valid options: sqlite, postgres",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Insert deterministic demo customers and exit
    Seed {
        /// Number of customers to generate
        #[arg(short = 'n', long)]
        count: Option<u32>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub database_backend: Option<DatabaseBackend>,
    pub sqlite_path: Option<PathBuf>,
    pub postgres_url: Option<String>,
    pub max_connections: Option<u32>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            database_backend: cli.database_backend,
            sqlite_path: cli.sqlite_path,
            postgres_url: cli.postgres_url,
            max_connections: cli.max_connections,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let mut cli = Cli::parse();
    let command = cli.command.take();
    (CliConfig::from(cli), command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_database_backend() {
        assert_eq!(parse_database_backend("sqlite"), Ok(DatabaseBackend::Sqlite));
        assert_eq!(parse_database_backend("Postgres"), Ok(DatabaseBackend::Postgres));
        assert_eq!(parse_database_backend("postgresql"), Ok(DatabaseBackend::Postgres));
        assert!(parse_database_backend("mysql").is_err());
    }

    #[test]
    fn test_cli_seed_command() {
        let cli = Cli::try_parse_from(["pagefilter", "seed", "-n", "25", "--port", "9000"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Seed { count: Some(25) }));
        let config = CliConfig::from(cli);
        assert_eq!(config.port, Some(9000));
    }

    #[test]
    fn test_cli_backend_flag() {
        let cli = Cli::try_parse_from([
            "pagefilter",
            "--database-backend",
            "postgres",
            "--postgres-url",
            "postgres://localhost/db",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.database_backend, Some(DatabaseBackend::Postgres));
        assert_eq!(cli.postgres_url.as_deref(), Some("postgres://localhost/db"));
    }
}
