// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! TRM CLI - job posting quotes and dashboard metrics from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Quote a featured Technology posting
//! trm quote --category Technology --featured
//!
//! # Five postings with a promo code, as JSON
//! trm quote -c Other --quantity 5 --promo SAVE10 --format json --pretty
//!
//! # Referral conversion rate from an API response
//! trm summary --input referrals.json --target paid
//!
//! # Week-over-week trend
//! trm summary --input payouts.json --window-days 7
//!
//! # Remaining credits
//! trm credits --usage 8 --limit 10 --bonus 2
//!
//! # Write the default rule table for editing
//! trm rules init
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trm_core::CoreError;
use trm_store::{LogLevel, StoreError};

use commands::{config, credits, quote, rules, summary};

// ============================================================================
// CLI Definition
// ============================================================================

/// TRM CLI - pricing and metrics for the recruitment marketplace.
#[derive(Parser)]
#[command(name = "trm")]
#[command(about = "Job posting quotes, dashboard metrics, and credit usage")]
#[command(long_about = r#"
TRM computes job posting prices and recruiter dashboard statistics.

Pricing comes from a rule table (category rates, featured/urgent
multipliers, volume tiers, promo codes). Without a rule table on disk the
built-in canonical table is used.

Examples:
  trm quote -c Technology --featured     # Single featured posting
  trm quote -c Other --quantity 5        # Volume discount
  trm summary --input referrals.json     # Counts, sums, conversion rate
  trm credits --usage 8 --limit 10       # Remaining credits
  trm rules show                         # Active rule table
"#)]
#[command(version)]
#[command(author = "TRM Engineering")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, no error text).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Rule table file (JSON or YAML), overriding the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    pub rules: Option<PathBuf>,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Price a job posting.
    #[command(visible_alias = "q")]
    Quote(quote::QuoteArgs),

    /// Summarize a job, referral, or payout listing.
    #[command(visible_alias = "s")]
    Summary(summary::SummaryArgs),

    /// Show remaining credits.
    #[command(visible_alias = "c")]
    Credits(credits::CreditsArgs),

    /// Inspect or create the rule table.
    Rules(rules::RulesArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Quote rejected (bad quantity, unknown or expired promo).
    QuoteRejected = 2,
    /// Input or rule table could not be parsed.
    ParseError = 3,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(core) = err.downcast_ref::<CoreError>() {
            return Self::for_core(core);
        }
        if let Some(store) = err.downcast_ref::<StoreError>() {
            return match store {
                StoreError::Core(core) => Self::for_core(core),
                e if e.is_parse_error() => ExitCode::ParseError,
                _ => ExitCode::Error,
            };
        }
        if err.downcast_ref::<serde_json::Error>().is_some() {
            return ExitCode::ParseError;
        }
        ExitCode::Error
    }

    fn for_core(err: &CoreError) -> Self {
        match err {
            e if e.is_user_facing() => ExitCode::QuoteRejected,
            CoreError::InvalidRules(_)
            | CoreError::InvalidData(_)
            | CoreError::Api { .. }
            | CoreError::Serialization(_) => ExitCode::ParseError,
            _ => ExitCode::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("trm=debug,info")
    } else {
        EnvFilter::new(format!("trm={level}"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = trm_store::SettingsStore::load_default().await;
    setup_logging(cli.verbose, cli.quiet, settings.get().await.log_level);

    let result = match &cli.command {
        Commands::Quote(args) => quote::run(args, &cli, &settings).await,
        Commands::Summary(args) => summary::run(args, &cli, &settings).await,
        Commands::Credits(args) => credits::run(args, &cli).await,
        Commands::Rules(args) => rules::run(args, &cli, &settings).await,
        Commands::Config(args) => config::run(args, &cli, &settings).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_cli_parses_global_flags_after_command() {
        let cli = Cli::try_parse_from([
            "trm", "quote", "-c", "Sales", "--format", "json", "--rules", "r.yaml",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.rules, Some(PathBuf::from("r.yaml")));
        assert!(matches!(cli.command, Commands::Quote(_)));
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["trm"]).is_err());
    }

    #[test]
    fn test_exit_code_quote_rejected() {
        let err = anyhow::Error::from(CoreError::InvalidPromoCode("NOPE".into()));
        assert_eq!(ExitCode::for_error(&err), ExitCode::QuoteRejected);

        let err = anyhow::Error::from(CoreError::ExpiredPromoCode {
            code: "OLD".into(),
            expired_at: Utc::now(),
        });
        assert_eq!(ExitCode::for_error(&err), ExitCode::QuoteRejected);
    }

    #[test]
    fn test_exit_code_parse_error() {
        let err = anyhow::Error::from(StoreError::Core(CoreError::InvalidRules("x".into())));
        assert_eq!(ExitCode::for_error(&err), ExitCode::ParseError);

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ExitCode::for_error(&anyhow::Error::from(json_err)), ExitCode::ParseError);
    }

    #[test]
    fn test_exit_code_general() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(ExitCode::for_error(&err), ExitCode::Error);

        let err = anyhow::Error::from(StoreError::Config("exists".into()));
        assert_eq!(ExitCode::for_error(&err), ExitCode::Error);
    }
}
