//! Credits command - show remaining credits.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use trm_core::{Allowance, CreditUsage};
use trm_engine::{derive_credit_usage, parse_credit_usage};

use super::summary::read_input;
use crate::output::{CreditsOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the credits command.
#[derive(Args)]
pub struct CreditsArgs {
    /// Credits consumed.
    #[arg(long, required_unless_present = "input")]
    pub usage: Option<u64>,

    /// Plan limit: a number or "unlimited".
    #[arg(long, value_parser = parse_allowance, required_unless_present = "input")]
    pub limit: Option<Allowance>,

    /// Bonus credits on top of the limit.
    #[arg(long, default_value = "0")]
    pub bonus: u64,

    /// Read a credits API response instead (file path or "-" for stdin).
    #[arg(long, conflicts_with_all = ["usage", "limit"])]
    pub input: Option<PathBuf>,
}

fn parse_allowance(s: &str) -> Result<Allowance, String> {
    Allowance::parse(s).ok_or_else(|| format!("expected a number or \"unlimited\", got {s:?}"))
}

impl CreditsArgs {
    async fn credit_usage(&self) -> Result<CreditUsage> {
        if let Some(path) = &self.input {
            let value = read_input(Some(path)).await?;
            return parse_credit_usage(&value).context("Invalid credits response");
        }
        let usage = self.usage.unwrap_or_default();
        let limit = self.limit.unwrap_or(Allowance::Unlimited);
        Ok(derive_credit_usage(usage, limit, self.bonus))
    }
}

/// Runs the credits command.
pub async fn run(args: &CreditsArgs, cli: &Cli) -> Result<()> {
    let credits = args.credit_usage().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_credits(&credits));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&CreditsOutput::new(&credits))?);
        }
    }

    Ok(())
}
