//! Alert inbox commands.

use clap::{Args, Subcommand};

use studiodesk_core::config::AppConfig;
use studiodesk_core::error::AppError;
use studiodesk_core::types::pagination::PageRequest;
use studiodesk_core::types::{AlertId, UserId};
use studiodesk_service::AlertInboxService;

use crate::output::{self, OutputFormat};

/// Arguments for inbox commands
#[derive(Debug, Args)]
pub struct InboxArgs {
    /// Owner whose alerts to manage
    #[arg(long)]
    pub owner: UserId,

    /// Inbox subcommand
    #[command(subcommand)]
    pub command: InboxCommand,
}

/// Inbox subcommands
#[derive(Debug, Subcommand)]
pub enum InboxCommand {
    /// List alerts, newest first
    List {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Page size
        #[arg(long, default_value_t = 20)]
        page_size: u64,
    },
    /// Show the unread count
    Unread,
    /// Mark one alert read
    Read {
        /// Alert ID
        alert_id: AlertId,
    },
    /// Mark every alert read
    ReadAll,
    /// Delete one alert; it will not be emitted again
    Delete {
        /// Alert ID
        alert_id: AlertId,
    },
}

/// Execute inbox commands
pub async fn execute(
    args: &InboxArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (pool, store) = super::connect_store(config).await?;
    let inbox = AlertInboxService::new(store);
    let result = run(&inbox, args, format).await;
    pool.close().await;
    result
}

async fn run(inbox: &AlertInboxService, args: &InboxArgs, format: OutputFormat) -> Result<(), AppError> {
    let owner = args.owner;

    match &args.command {
        InboxCommand::List { page, page_size } => {
            let alerts = inbox.list(owner, PageRequest::new(*page, *page_size)).await?;
            match format {
                OutputFormat::Json => output::print_json(&alerts),
                OutputFormat::Text => {
                    if alerts.items.is_empty() {
                        println!("No alerts.");
                    }
                    for alert in &alerts.items {
                        let marker = if alert.is_read { " " } else { "*" };
                        println!(
                            "{} {}  {}  {}",
                            marker,
                            alert.created_at.format("%Y-%m-%d %H:%M"),
                            alert.id,
                            alert.title
                        );
                    }
                    println!(
                        "Page {}/{} ({} alerts)",
                        alerts.page,
                        alerts.total_pages(),
                        alerts.total_items
                    );
                }
            }
        }
        InboxCommand::Unread => {
            let count = inbox.unread_count(owner).await?;
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({ "unread": count })),
                OutputFormat::Text => output::print_kv("Unread", &count.to_string()),
            }
        }
        InboxCommand::Read { alert_id } => {
            inbox.mark_read(owner, *alert_id).await?;
            output::print_success("Alert marked read.");
        }
        InboxCommand::ReadAll => {
            let changed = inbox.mark_all_read(owner).await?;
            output::print_success(&format!("{} alerts marked read.", changed));
        }
        InboxCommand::Delete { alert_id } => {
            inbox.delete(owner, *alert_id).await?;
            output::print_success("Alert deleted.");
        }
    }

    Ok(())
}
