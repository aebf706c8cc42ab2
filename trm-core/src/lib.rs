// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # TRM Core
//!
//! Core types, errors, and formatting for the TRM pricing and metrics
//! engine.
//!
//! This crate provides the foundational abstractions used across all other
//! TRM crates, including:
//!
//! - Domain models (pricing inputs, rule tables, metric samples, credits)
//! - Error types
//! - API response normalization
//! - Locale-stable display formatting
//!
//! ## Key Types
//!
//! ### Pricing
//! - [`JobPricingInput`] - Category, flags, quantity, and promo code
//! - [`RuleTable`] - Category rates, multipliers, volume tiers, promo codes
//! - [`PriceBreakdown`] - Itemized quote
//!
//! ### Metrics
//! - [`MetricSample`] - One job, referral, or payout record
//! - [`SummaryStats`] - Counts, sums, rates, and trends
//!
//! ### Credits
//! - [`Allowance`] - Numeric cap or unlimited
//! - [`CreditUsage`] - Usage against a plan limit plus bonus

pub mod error;
pub mod format;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Pricing
    JobPricingInput,
    MAX_MULTIPLIER,
    MAX_RATE,
    PriceBreakdown,
    PromoCode,
    RuleTable,
    VolumeTier,
    // Metrics
    GroupField,
    GroupStats,
    MetricSample,
    SummaryOptions,
    SummaryStats,
    TrendBaseline,
    TrendBasis,
    // Credits
    Allowance,
    CreditUsage,
    // API boundary
    ApiEnvelope,
    ApiErrorBody,
};

// Re-export formatting helpers
pub use format::{format_compact_number, format_date, format_money, format_percent, format_relative};
