// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

//! # TRM Engine
//!
//! Pure calculation functions for TRM: quotes, dashboard metrics, and
//! credit usage. Nothing here performs I/O or holds state; the caller
//! supplies the rule table and the clock.
//!
//! ## Modules
//!
//! - [`quote`] - Job posting quotes from a [`RuleTable`](trm_core::RuleTable)
//! - [`metrics`] - Status counts, sums, conversion rates, and trends
//! - [`credits`] - Remaining credits and percent used
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use rust_decimal::Decimal;
//! use trm_core::{JobPricingInput, RuleTable};
//! use trm_engine::compute_quote_at;
//!
//! let input = JobPricingInput::new("Technology").featured(true);
//! let quote = compute_quote_at(&input, &RuleTable::default(), Utc::now()).unwrap();
//! assert_eq!(quote.total, Decimal::from(75_000));
//! ```

pub mod credits;
pub mod metrics;
pub mod quote;

pub use credits::{
    APPROACHING_LIMIT_PERCENT, derive_credit_usage, is_approaching_limit, parse_credit_usage,
    percent_used,
};
pub use metrics::{percent_change, summarize, summarize_period};
pub use quote::{compute_quote, compute_quote_at};
