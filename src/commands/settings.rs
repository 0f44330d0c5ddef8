//! Alert settings commands.

use clap::{Args, Subcommand};

use studiodesk_core::config::AppConfig;
use studiodesk_core::error::AppError;
use studiodesk_core::types::UserId;
use studiodesk_entity::alert::AlertSettings;
use studiodesk_service::{AlertSettingsUpdate, SettingsResolver};

use crate::output::{self, OutputFormat};

/// Arguments for settings commands
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Owner whose settings to read or change
    #[arg(long)]
    pub owner: UserId,

    /// Settings subcommand
    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Settings subcommands
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show effective settings
    Show,
    /// Save settings for the owner
    Set {
        /// Project lead-times in days, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        lead_days: Vec<u32>,
        /// Whether aging payments are reported
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        payment_aging: bool,
    },
}

fn print_settings(settings: &AlertSettings, persisted: bool, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(settings),
        OutputFormat::Text => {
            let lead_days: Vec<String> = settings.lead_days.iter().map(u32::to_string).collect();
            output::print_kv("Lead days", &lead_days.join(", "));
            output::print_kv("Payment aging", &settings.payment_aging.to_string());
            output::print_kv("Source", if persisted { "saved" } else { "defaults" });
        }
    }
}

/// Execute settings commands
pub async fn execute(
    args: &SettingsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (pool, store) = super::connect_store(config).await?;
    let resolver = SettingsResolver::new(store);

    let result = match &args.command {
        SettingsCommand::Show => resolver
            .resolve(args.owner)
            .await
            .map(|resolved| print_settings(&resolved.settings, resolved.persisted, format)),
        SettingsCommand::Set {
            lead_days,
            payment_aging,
        } => {
            let update = AlertSettingsUpdate {
                lead_days: lead_days.clone(),
                payment_aging: *payment_aging,
            };
            resolver.save(args.owner, update).await.map(|saved| {
                print_settings(&saved, true, format);
                if format == OutputFormat::Text {
                    output::print_success("Alert settings saved.");
                }
            })
        }
    };

    pool.close().await;
    result
}
