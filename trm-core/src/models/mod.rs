//! Domain models for TRM.
//!
//! This module contains the value types passed between the UI layer and
//! the pricing and metrics engine. None of them hold long-lived state.
//!
//! ## Submodules
//!
//! - [`pricing`] - Quote inputs, price breakdowns, and the rule table
//! - [`metrics`] - Metric samples, summary options, and summary stats
//! - [`credits`] - Credit allowances and usage
//! - [`envelope`] - `{ success, data }` response normalization

pub mod credits;
pub mod envelope;
pub mod metrics;
pub mod pricing;

// Re-export everything at the models level
pub use credits::{Allowance, CreditUsage};
pub use envelope::{ApiEnvelope, ApiErrorBody, parse_payload, parse_samples, unwrap_envelope};
pub use metrics::{
    DEFAULT_SUCCESS_STATUS, GroupField, GroupStats, MetricSample, SummaryOptions, SummaryStats,
    TrendBaseline, TrendBasis, UNKNOWN_STATUS, normalize_status,
};
pub use pricing::{
    JobPricingInput, MAX_MULTIPLIER, MAX_RATE, PriceBreakdown, PromoCode, RuleTable, VolumeTier,
};
