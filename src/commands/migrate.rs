//! Database migration command.

use studiodesk_core::config::AppConfig;
use studiodesk_core::error::AppError;
use studiodesk_database::DatabasePool;
use studiodesk_database::migration::run_migrations;

use crate::output;

/// Apply all pending migrations
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;

    println!("Running database migrations...");
    let result = run_migrations(pool.pool()).await;
    pool.close().await;
    result?;

    output::print_success("All migrations applied successfully.");
    Ok(())
}
