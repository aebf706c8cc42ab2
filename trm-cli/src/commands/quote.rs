//! Quote command - price a job posting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use tracing::info;
use trm_core::JobPricingInput;
use trm_engine::{compute_quote, compute_quote_at};
use trm_store::SettingsStore;

use super::load_rules;
use crate::output::{JsonFormatter, QuoteOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Job category (e.g., Technology). Unknown categories use the default rate.
    #[arg(long, short)]
    pub category: String,

    /// Pin the posting to the top of listings.
    #[arg(long)]
    pub featured: bool,

    /// Mark the posting as urgently hiring.
    #[arg(long)]
    pub urgent: bool,

    /// Number of postings.
    #[arg(long, short = 'n', default_value = "1")]
    pub quantity: u32,

    /// Promo code.
    #[arg(long)]
    pub promo: Option<String>,

    /// Check promo expiry at this instant instead of now (RFC 3339).
    #[arg(long, value_name = "RFC3339")]
    pub as_of: Option<DateTime<Utc>>,
}

impl QuoteArgs {
    fn input(&self) -> JobPricingInput {
        let input = JobPricingInput::new(self.category.clone())
            .featured(self.featured)
            .urgent(self.urgent)
            .with_quantity(self.quantity);
        match &self.promo {
            Some(code) => input.with_promo(code.clone()),
            None => input,
        }
    }
}

/// Runs the quote command.
pub async fn run(args: &QuoteArgs, cli: &Cli, settings: &SettingsStore) -> Result<()> {
    let rules = load_rules(cli, settings).await?.rules();
    let input = args.input();

    let quote = match args.as_of {
        Some(as_of) => compute_quote_at(&input, &rules, as_of)?,
        None => compute_quote(&input, &rules)?,
    };
    info!(category = %input.category, total = %quote.total, "Quote computed");

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_quote(&quote));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&QuoteOutput::new(&quote))?);
        }
    }

    Ok(())
}
