//! Rules command - inspect, create, and validate the rule table.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use trm_store::{RulesStore, SettingsStore, default_rules_path, load_rules_file};

use super::load_rules;
use crate::output::{JsonFormatter, RulesOutput, TextFormatter, ValidationOutput};
use crate::{Cli, OutputFormat};

/// Arguments for the rules command.
#[derive(Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

/// Rules subcommands.
#[derive(Subcommand)]
pub enum RulesAction {
    /// Show the active rule table.
    Show,

    /// Show where the active rule table comes from.
    Path,

    /// Write the built-in rule table to disk for editing.
    Init {
        /// Target file (.json, .yaml, or .yml). Defaults to the config dir.
        path: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Check a rule table file, or the active one.
    Validate {
        /// File to check.
        file: Option<PathBuf>,
    },
}

/// Runs the rules command.
pub async fn run(args: &RulesArgs, cli: &Cli, settings: &SettingsStore) -> Result<()> {
    match &args.action {
        RulesAction::Show => show_rules(cli, settings).await,
        RulesAction::Path => show_path(cli, settings).await,
        RulesAction::Init { path, force } => init_rules(path.clone(), *force, cli).await,
        RulesAction::Validate { file } => validate(file.clone(), cli, settings).await,
    }
}

async fn show_rules(cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let store = load_rules(cli, settings).await?;
    let rules = store.rules();
    let source = store.source().to_string();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_rules(&rules, &source));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = RulesOutput {
                source,
                rules: &rules,
            };
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}

async fn show_path(cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let store = load_rules(cli, settings).await?;

    match cli.format {
        OutputFormat::Text => println!("{}", store.source()),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = serde_json::json!({
                "source": store.source().to_string(),
                "path": store.source().path().map(|p| p.display().to_string()),
            });
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}

async fn init_rules(path: Option<PathBuf>, force: bool, cli: &Cli) -> Result<()> {
    let path = path.unwrap_or_else(default_rules_path);
    RulesStore::init(&path, force).await?;

    if !cli.quiet {
        println!("Wrote rule table to {}", path.display());
    }
    Ok(())
}

async fn validate(file: Option<PathBuf>, cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let (label, result) = match file {
        Some(path) => (
            path.display().to_string(),
            load_rules_file(&path).await.map(|_| ()),
        ),
        None => {
            let store = load_rules(cli, settings).await?;
            (store.source().to_string(), Ok(()))
        }
    };

    match cli.format {
        OutputFormat::Text => {
            if result.is_ok() {
                println!("{label}: OK");
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = ValidationOutput {
                path: label,
                valid: result.is_ok(),
                error: result.as_ref().err().map(ToString::to_string),
            };
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(result?)
}
