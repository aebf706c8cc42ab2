//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use trm_core::format::format_money;
use trm_core::{CreditUsage, PriceBreakdown, RuleTable, SummaryStats};
use trm_engine::{is_approaching_limit, percent_used};

// ============================================================================
// Output Types
// ============================================================================

/// A quote with its display total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteOutput<'a> {
    #[serde(flatten)]
    pub breakdown: &'a PriceBreakdown,
    pub formatted_total: String,
}

impl<'a> QuoteOutput<'a> {
    pub fn new(breakdown: &'a PriceBreakdown) -> Self {
        Self {
            breakdown,
            formatted_total: format_money(breakdown.total, &breakdown.currency),
        }
    }
}

/// Summary statistics with the options that produced them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOutput<'a> {
    #[serde(flatten)]
    pub stats: &'a SummaryStats,
    pub success_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,
}

/// Credit usage with derived flags.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditsOutput<'a> {
    #[serde(flatten)]
    pub usage: &'a CreditUsage,
    pub percent_used: u8,
    pub approaching_limit: bool,
    pub exhausted: bool,
}

impl<'a> CreditsOutput<'a> {
    pub fn new(usage: &'a CreditUsage) -> Self {
        Self {
            usage,
            percent_used: percent_used(usage),
            approaching_limit: is_approaching_limit(usage),
            exhausted: usage.is_exhausted(),
        }
    }
}

/// The active rule table and where it came from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesOutput<'a> {
    pub source: String,
    pub rules: &'a RuleTable,
}

/// Result of validating a rule table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutput {
    pub path: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Configuration file locations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsOutput {
    pub config_dir: String,
    pub settings_file: String,
    pub rules_file: String,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
