//! CLI command definitions and dispatch.

pub mod inbox;
pub mod migrate;
pub mod reconcile;
pub mod settings;
pub mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use studiodesk_core::config::AppConfig;
use studiodesk_core::error::AppError;
use studiodesk_core::traits::SystemClock;
use studiodesk_database::{DatabasePool, PgAlertStore};
use studiodesk_service::AlertReconciler;

use crate::output::OutputFormat;

/// Studiodesk deadline and payment alert engine
#[derive(Debug, Parser)]
#[command(name = "studiodesk-alerts", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file, without extension
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from `config/<env>.toml`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one reconciliation pass for an owner
    Reconcile(reconcile::ReconcileArgs),
    /// Keep owners' sessions open and reconcile on the configured schedule
    Watch(watch::WatchArgs),
    /// Apply database migrations
    Migrate,
    /// Show or change an owner's alert settings
    Settings(settings::SettingsArgs),
    /// Read and manage emitted alerts
    Inbox(inbox::InboxArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Reconcile(args) => reconcile::execute(args, &config, self.format).await,
            Commands::Watch(args) => watch::execute(args, &config).await,
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Settings(args) => settings::execute(args, &config, self.format).await,
            Commands::Inbox(args) => inbox::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: connect to the database, check it answers, and build the alert store
pub async fn connect_store(config: &AppConfig) -> Result<(DatabasePool, Arc<PgAlertStore>), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    pool.health_check().await?;
    let store = Arc::new(PgAlertStore::new(pool.pool().clone()));
    Ok((pool, store))
}

/// Helper: reconciler over `store` using the wall clock
pub fn build_reconciler(store: Arc<PgAlertStore>) -> AlertReconciler {
    AlertReconciler::new(store, Arc::new(SystemClock))
}
