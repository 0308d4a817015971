//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME, APP_NAME_LOWER, DEFAULT_SEED_COUNT, ENV_LOG};
use crate::data::DataStore;
use crate::data::seed::sample_customers;
use crate::filters::FilterEngine;

pub struct CoreApp {
    pub config: AppConfig,
    pub store: DataStore,
    pub engine: FilterEngine<DataStore>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config).await?;

        match command {
            Some(Commands::Seed { count }) => {
                let result = app.seed(count.unwrap_or(DEFAULT_SEED_COUNT)).await;
                app.store.close().await;
                result
            }
            Some(Commands::Start) | None => Self::start_server(app).await,
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let store = DataStore::init(&config.database)
            .await
            .with_context(|| format!("Failed to open {} database", config.database.backend))?;

        let mut engine = FilterEngine::unconfigured();
        engine.configure(Arc::new(store.clone()))?;

        Ok(Self {
            config,
            store,
            engine,
        })
    }

    /// Insert deterministic demo customers; existing ones are left untouched
    async fn seed(&self, count: u32) -> Result<()> {
        let customers = sample_customers(count);
        let inserted = self
            .store
            .insert_customers(&customers)
            .await
            .context("Failed to insert demo customers")?;
        tracing::info!(
            requested = count,
            inserted,
            backend = %self.store.backend(),
            "Seeded demo customers"
        );
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        tracing::info!(
            app = APP_NAME,
            version = env!("CARGO_PKG_VERSION"),
            backend = %app.store.backend(),
            host = %app.config.server.host,
            port = app.config.server.port,
            "Starting server"
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.store.close().await;
        tracing::debug!("Database closed");

        Ok(())
    }
}
