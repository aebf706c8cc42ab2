//! Pricing types.
//!
//! This module contains the inputs and outputs of the quote calculator:
//! - [`JobPricingInput`] - What the poster asked for
//! - [`PriceBreakdown`] - Itemized price for a job posting order
//! - [`RuleTable`] - Static pricing configuration
//! - [`VolumeTier`] - Bulk-purchase discount threshold
//! - [`PromoCode`] - Promotional discount

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Largest base rate a rule table may carry (one trillion).
pub const MAX_RATE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Largest featured or urgent multiplier a rule table may carry.
pub const MAX_MULTIPLIER: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

// ============================================================================
// Job Pricing Input
// ============================================================================

/// Raw inputs collected from the job posting form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPricingInput {
    /// Job category (e.g., "Technology").
    pub category: String,
    /// Pin the job to the top of listings.
    #[serde(default)]
    pub is_featured: bool,
    /// Mark the job as urgently hiring.
    #[serde(default)]
    pub is_urgent: bool,
    /// Number of postings purchased. Must be at least 1.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Optional promotional code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl JobPricingInput {
    /// Creates a single, unflagged posting in the given category.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            is_featured: false,
            is_urgent: false,
            quantity: 1,
            promo_code: None,
        }
    }

    /// Sets the featured flag.
    pub fn featured(mut self, featured: bool) -> Self {
        self.is_featured = featured;
        self
    }

    /// Sets the urgent flag.
    pub fn urgent(mut self, urgent: bool) -> Self {
        self.is_urgent = urgent;
        self
    }

    /// Sets the quantity.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the promo code.
    pub fn with_promo(mut self, code: impl Into<String>) -> Self {
        self.promo_code = Some(code.into());
        self
    }

    /// Returns the promo code if one was actually entered.
    ///
    /// Blank or whitespace-only codes count as no code.
    pub fn entered_promo(&self) -> Option<&str> {
        self.promo_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

// ============================================================================
// Price Breakdown
// ============================================================================

/// Itemized result of a quote.
///
/// `base_price` and the surcharges are per posting; `subtotal`, the
/// discounts, and `total` cover the whole quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// ISO 4217 currency code of every amount below.
    pub currency: String,
    /// Category rate for one posting.
    pub base_price: Decimal,
    /// Featured surcharge for one posting (zero when not featured).
    pub featured_surcharge: Decimal,
    /// Urgent surcharge for one posting (zero when not urgent).
    pub urgent_surcharge: Decimal,
    /// Number of postings.
    pub quantity: u32,
    /// Per-posting price with surcharges, times quantity.
    pub subtotal: Decimal,
    /// Percentage of the applied volume tier (zero when none applies).
    pub volume_discount_percent: Decimal,
    /// Volume discount taken off the subtotal.
    pub volume_discount: Decimal,
    /// Canonical code of the promo that was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    /// Promo discount actually taken (never more than what was left).
    pub promo_discount: Decimal,
    /// Amount due, never negative.
    pub total: Decimal,
}

impl PriceBreakdown {
    /// Per-posting price after surcharges, before discounts.
    pub fn unit_total(&self) -> Decimal {
        self.base_price + self.featured_surcharge + self.urgent_surcharge
    }

    /// Sum of all discounts.
    pub fn total_discount(&self) -> Decimal {
        self.volume_discount + self.promo_discount
    }

    /// Returns true if any discount was applied.
    pub fn has_discount(&self) -> bool {
        !self.total_discount().is_zero()
    }
}

// ============================================================================
// Rule Table
// ============================================================================

/// Bulk-purchase discount threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeTier {
    /// Smallest quantity that qualifies.
    pub min_quantity: u32,
    /// Discount on the subtotal, 0-100.
    pub discount_percent: Decimal,
}

impl VolumeTier {
    /// Creates a new tier.
    pub fn new(min_quantity: u32, discount_percent: Decimal) -> Self {
        Self {
            min_quantity,
            discount_percent,
        }
    }
}

/// Promotional discount definition.
///
/// When both are set, `percent_off` is applied before `flat_off`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    /// Percentage off, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_off: Option<Decimal>,
    /// Fixed amount off, in the table currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_off: Option<Decimal>,
    /// Last instant at which the code is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PromoCode {
    /// A percent-off code with no expiry.
    pub fn percent(percent_off: Decimal) -> Self {
        Self {
            percent_off: Some(percent_off),
            ..Self::default()
        }
    }

    /// A flat-off code with no expiry.
    pub fn flat(flat_off: Decimal) -> Self {
        Self {
            flat_off: Some(flat_off),
            ..Self::default()
        }
    }

    /// Sets the expiry.
    pub fn expiring(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns true if the code is past its expiry at `as_of`.
    pub fn is_expired(&self, as_of: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| as_of > exp)
    }
}

/// Static pricing configuration, loaded once and never mutated.
///
/// Fields missing from a config file fall back to the canonical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleTable {
    /// ISO 4217 currency code for all amounts.
    pub currency: String,
    /// Digits after the decimal point for rounding.
    pub minor_units: u32,
    /// Base price per category.
    pub category_rates: BTreeMap<String, Decimal>,
    /// Base price for categories not in `category_rates`.
    pub default_rate: Decimal,
    /// Price multiplier for featured postings (>= 1).
    pub featured_multiplier: Decimal,
    /// Price multiplier for urgent postings (>= 1).
    pub urgent_multiplier: Decimal,
    /// Bulk-purchase discounts.
    pub volume_tiers: Vec<VolumeTier>,
    /// Promo codes by code.
    pub promo_codes: BTreeMap<String, PromoCode>,
}

impl Default for RuleTable {
    fn default() -> Self {
        let category_rates = [
            ("Technology", 50_000),
            ("Engineering", 50_000),
            ("Finance", 45_000),
            ("Healthcare", 40_000),
            ("Design", 35_000),
            ("Sales", 30_000),
            ("Marketing", 30_000),
            ("Other", 20_000),
        ]
        .into_iter()
        .map(|(name, rate)| (name.to_string(), Decimal::from(rate)))
        .collect();

        Self {
            currency: "INR".to_string(),
            minor_units: 2,
            category_rates,
            default_rate: Decimal::from(20_000),
            featured_multiplier: Decimal::new(15, 1),
            urgent_multiplier: Decimal::new(125, 2),
            volume_tiers: vec![
                VolumeTier::new(5, Decimal::from(10)),
                VolumeTier::new(10, Decimal::from(15)),
                VolumeTier::new(25, Decimal::from(20)),
            ],
            promo_codes: BTreeMap::new(),
        }
    }
}

impl RuleTable {
    /// Looks up the base rate for a category.
    ///
    /// Tries an exact match, then a case-insensitive one. Returns the rate
    /// and whether the category was known; unknown categories get
    /// `default_rate`.
    pub fn rate_for(&self, category: &str) -> (Decimal, bool) {
        let category = category.trim();
        if let Some(rate) = self.category_rates.get(category) {
            return (*rate, true);
        }
        self.category_rates
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(category))
            .map_or((self.default_rate, false), |(_, rate)| (*rate, true))
    }

    /// Returns the most generous tier that `quantity` qualifies for.
    pub fn tier_for(&self, quantity: u32) -> Option<&VolumeTier> {
        self.volume_tiers
            .iter()
            .filter(|t| quantity >= t.min_quantity)
            .max_by_key(|t| t.min_quantity)
    }

    /// Finds a promo code case-insensitively.
    ///
    /// Returns the canonical key along with the definition.
    pub fn find_promo(&self, code: &str) -> Option<(&str, &PromoCode)> {
        let code = code.trim();
        self.promo_codes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(code))
            .map(|(key, promo)| (key.as_str(), promo))
    }

    /// Validates the table.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRules` describing the first problem found.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.currency.trim().is_empty() {
            return Err(invalid("currency code is empty"));
        }
        if self.minor_units > 6 {
            return Err(invalid(format!(
                "minorUnits {} out of valid range [0, 6]",
                self.minor_units
            )));
        }
        for (category, rate) in &self.category_rates {
            if !is_rate(*rate) {
                return Err(invalid(format!(
                    "rate for {category} out of valid range [0, {MAX_RATE}]"
                )));
            }
        }
        if !is_rate(self.default_rate) {
            return Err(invalid(format!(
                "defaultRate out of valid range [0, {MAX_RATE}]"
            )));
        }
        if !is_multiplier(self.featured_multiplier) {
            return Err(invalid(format!(
                "featuredMultiplier out of valid range [1, {MAX_MULTIPLIER}]"
            )));
        }
        if !is_multiplier(self.urgent_multiplier) {
            return Err(invalid(format!(
                "urgentMultiplier out of valid range [1, {MAX_MULTIPLIER}]"
            )));
        }

        let mut thresholds = HashSet::new();
        for tier in &self.volume_tiers {
            if tier.min_quantity == 0 {
                return Err(invalid("volume tier minQuantity must be at least 1"));
            }
            if !is_percent(tier.discount_percent) {
                return Err(invalid(format!(
                    "volume tier {} discount {} out of valid range [0, 100]",
                    tier.min_quantity, tier.discount_percent
                )));
            }
            if !thresholds.insert(tier.min_quantity) {
                return Err(invalid(format!(
                    "duplicate volume tier for minQuantity {}",
                    tier.min_quantity
                )));
            }
        }

        let mut codes = HashSet::new();
        for (code, promo) in &self.promo_codes {
            if code.trim().is_empty() {
                return Err(invalid("promo code key is empty"));
            }
            if !codes.insert(code.to_ascii_lowercase()) {
                return Err(invalid(format!("promo code {code} is defined twice")));
            }
            if promo.percent_off.is_none() && promo.flat_off.is_none() {
                return Err(invalid(format!("promo code {code} has no discount")));
            }
            if promo.percent_off.is_some_and(|p| !is_percent(p)) {
                return Err(invalid(format!(
                    "promo code {code} percentOff out of valid range [0, 100]"
                )));
            }
            if promo.flat_off.is_some_and(|f| f.is_sign_negative()) {
                return Err(invalid(format!("promo code {code} flatOff is negative")));
            }
        }

        Ok(())
    }
}

fn is_rate(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= MAX_RATE
}

fn is_multiplier(value: Decimal) -> bool {
    value >= Decimal::ONE && value <= MAX_MULTIPLIER
}

fn is_percent(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED
}

fn invalid(msg: impl Into<String>) -> CoreError {
    CoreError::InvalidRules(msg.into())
}

// ============================================================================
// Tests
// ============================================================================
