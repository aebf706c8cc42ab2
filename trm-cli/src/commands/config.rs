//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;
use trm_store::{SettingsStore, default_config_dir, default_rules_path};

use crate::output::{JsonFormatter, PathsOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set the display currency (ISO 4217 code).
    SetCurrency {
        /// Currency code, e.g. INR or USD.
        code: String,
    },

    /// Set the status counted as success in summaries.
    SetTarget {
        /// Status, e.g. paid or hired.
        status: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, store).await,
        ConfigAction::Path => show_paths(cli, store),
        ConfigAction::SetCurrency { code } => {
            store.set_currency(code).await?;
            store.save().await?;
            let currency = store.get().await.currency;
            info!(currency = %currency, "Currency updated");
            println!("Currency set to: {currency}");
            Ok(())
        }
        ConfigAction::SetTarget { status } => {
            store.set_success_status(status).await?;
            store.save().await?;
            let status = store.get().await.success_status;
            info!(status = %status, "Success status updated");
            println!("Success status set to: {status}");
            Ok(())
        }
        ConfigAction::Reset => reset_config(store).await,
    }
}

async fn show_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_settings(&settings));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let paths = PathsOutput {
        config_dir: default_config_dir().display().to_string(),
        settings_file: store.path().display().to_string(),
        rules_file: default_rules_path().display().to_string(),
    };

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", paths.config_dir);
            println!("Settings file: {}", paths.settings_file);
            println!("Rules file:    {}", paths.rules_file);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn reset_config(store: &SettingsStore) -> Result<()> {
    let path = store.path();

    if path.exists() {
        tokio::fs::remove_file(path).await?;
        store.reset().await;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
