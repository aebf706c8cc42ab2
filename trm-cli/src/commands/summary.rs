//! Summary command - aggregate a job, referral, or payout listing.
//!
//! Reads an API response (any of the list shapes the backend returns) from
//! a file or stdin and prints counts, sums, the success rate, and a trend.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use trm_core::models::parse_samples;
use trm_core::{GroupField, SummaryOptions, TrendBaseline, TrendBasis};
use trm_engine::{summarize, summarize_period};
use trm_store::SettingsStore;

use crate::output::{JsonFormatter, SummaryOutput, SummaryView, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the summary command.
#[derive(Args)]
pub struct SummaryArgs {
    /// API response to read (file path, or "-" for stdin).
    #[arg(long, short, default_value = "-")]
    pub input: PathBuf,

    /// Status counted as success (defaults to the configured one).
    #[arg(long, short)]
    pub target: Option<String>,

    /// Prior-period value to compute the trend against.
    #[arg(long, conflicts_with = "window_days")]
    pub baseline: Option<Decimal>,

    /// What the trend compares.
    #[arg(long, value_enum, default_value = "sum")]
    pub basis: BasisArg,

    /// Secondary grouping.
    #[arg(long, value_enum)]
    pub group_by: Option<GroupByArg>,

    /// Summarize only the last N days, trending against the N days before.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub window_days: Option<u32>,

    /// End of the window (RFC 3339, defaults to now).
    #[arg(long, value_name = "RFC3339", requires = "window_days")]
    pub as_of: Option<DateTime<Utc>>,
}

/// Trend basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BasisArg {
    /// Summed amounts.
    Sum,
    /// Record counts.
    Total,
}

impl From<BasisArg> for TrendBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Sum => TrendBasis::Sum,
            BasisArg::Total => TrendBasis::Total,
        }
    }
}

/// Grouping field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupByArg {
    /// Normalized status.
    Status,
    /// Job category.
    Category,
}

impl From<GroupByArg> for GroupField {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::Status => GroupField::Status,
            GroupByArg::Category => GroupField::Category,
        }
    }
}

impl SummaryArgs {
    fn options(&self, default_target: &str) -> SummaryOptions {
        let target = self.target.as_deref().unwrap_or(default_target);
        let mut options = SummaryOptions::success(target);
        options.group_by = self.group_by.map(GroupField::from);

        let basis = TrendBasis::from(self.basis);
        if let Some(value) = self.baseline {
            options.baseline = Some(TrendBaseline { basis, value });
        } else if self.window_days.is_some() {
            // value is replaced by the prior window's figure
            options.baseline = Some(TrendBaseline {
                basis,
                value: Decimal::ZERO,
            });
        }
        options
    }
}

/// Reads JSON from a file, or from stdin when the path is `-` or absent.
pub async fn read_input(path: Option<&Path>) -> Result<Value> {
    let content = match path {
        Some(p) if p != Path::new("-") => tokio::fs::read_to_string(p)
            .await
            .with_context(|| format!("Failed to read {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    debug!(bytes = content.len(), "Read input");
    Ok(serde_json::from_str(&content)?)
}

/// Runs the summary command.
pub async fn run(args: &SummaryArgs, cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let settings = settings.get().await;
    let options = args.options(&settings.success_status);

    let value = read_input(Some(&args.input)).await?;
    let samples = parse_samples(&value)?;

    let as_of = args.window_days.map(|_| args.as_of.unwrap_or_else(Utc::now));
    let stats = match (args.window_days, as_of) {
        (Some(days), Some(as_of)) => {
            summarize_period(&samples, as_of, Duration::days(i64::from(days)), &options)
        }
        _ => summarize(&samples, &options),
    };
    info!(records = stats.total, rate = stats.rate, "Summary computed");

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let view = SummaryView {
                currency: &settings.currency,
                success_status: &options.success_status,
                compact: settings.compact_numbers,
            };
            println!("{}", formatter.format_summary(&stats, &view));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = SummaryOutput {
                stats: &stats,
                success_status: options.success_status.clone(),
                window_days: args.window_days,
                as_of,
            };
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(extra: &[&str]) -> SummaryArgs {
        let mut argv = vec!["trm", "summary"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            crate::Commands::Summary(args) => args,
            _ => panic!("expected summary command"),
        }
    }

    #[test]
    fn test_options_default_target() {
        let options = parse(&[]).options("paid");
        assert_eq!(options.success_status, "paid");
        assert!(options.baseline.is_none());
        assert!(options.group_by.is_none());
    }

    #[test]
    fn test_options_explicit_baseline() {
        let options = parse(&["--target", "hired", "--baseline", "8", "--basis", "total"])
            .options("paid");
        assert_eq!(options.success_status, "hired");
        assert_eq!(options.baseline, Some(TrendBaseline::total(8)));
    }

    #[test]
    fn test_options_window_sets_basis() {
        let options = parse(&["--window-days", "7", "--group-by", "category"]).options("paid");
        assert_eq!(options.baseline.map(|b| b.basis), Some(TrendBasis::Sum));
        assert_eq!(options.group_by, Some(GroupField::Category));
    }

    #[test]
    fn test_baseline_conflicts_with_window() {
        let result = Cli::try_parse_from([
            "trm", "summary", "--baseline", "5", "--window-days", "7",
        ]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("referrals.json");
        tokio::fs::write(&path, r#"{"success": true, "data": [{"status": "paid"}]}"#)
            .await
            .unwrap();

        let value = read_input(Some(&path)).await.unwrap();
        assert_eq!(parse_samples(&value).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_read_input_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, "{").await.unwrap();

        let err = read_input(Some(&path)).await.unwrap_err();
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }
}
