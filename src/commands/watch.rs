//! Long-running reconciliation for a set of owners.

use clap::Args;

use studiodesk_core::config::AppConfig;
use studiodesk_core::error::AppError;
use studiodesk_core::types::UserId;
use studiodesk_worker::AlertScheduler;

/// Arguments for the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Owners to open sessions for
    #[arg(long = "owner", required = true, num_args = 1..)]
    pub owners: Vec<UserId>,
}

/// Open a session per owner and reconcile on schedule until Ctrl-C
pub async fn execute(args: &WatchArgs, config: &AppConfig) -> Result<(), AppError> {
    let (pool, store) = super::connect_store(config).await?;
    let reconciler = super::build_reconciler(store);

    let scheduler = AlertScheduler::new(reconciler, config.reconciler.clone()).await?;
    scheduler.start().await?;

    for owner in &args.owners {
        scheduler.start_session(*owner);
    }
    tracing::info!(
        owners = args.owners.len(),
        schedule = %config.reconciler.schedule,
        "Watching owners, press Ctrl-C to stop"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");

    scheduler.shutdown().await?;
    pool.close().await;
    Ok(())
}
