//! Quote calculator.
//!
//! Turns a [`JobPricingInput`] into a [`PriceBreakdown`] using the rules in
//! a [`RuleTable`]. The order of operations is:
//!
//! 1. Category base rate (unknown categories use the default rate)
//! 2. Featured and urgent surcharges, each relative to the base rate
//! 3. Subtotal = per-posting price × quantity
//! 4. Volume discount from the most generous qualifying tier
//! 5. Promo discount on what is left: percent-off, then flat-off
//!
//! Every amount is rounded half-up to the table's minor units before it
//! is combined, so the breakdown always adds up exactly. A validated table
//! never leaves `Decimal` range; for unvalidated tables the arithmetic
//! saturates rather than failing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use trm_core::format::round_money;
use trm_core::{CoreError, JobPricingInput, PriceBreakdown, PromoCode, RuleTable};

/// Computes a quote, checking promo expiry against the current time.
///
/// # Errors
///
/// See [`compute_quote_at`].
pub fn compute_quote(
    input: &JobPricingInput,
    rules: &RuleTable,
) -> Result<PriceBreakdown, CoreError> {
    compute_quote_at(input, rules, Utc::now())
}

/// Computes a quote as of a given instant.
///
/// Deterministic: the same input, rules, and `as_of` always produce the
/// same breakdown.
///
/// # Errors
///
/// - `CoreError::InvalidQuantity` if `quantity` is 0
/// - `CoreError::InvalidPromoCode` if the promo code is not in the table
/// - `CoreError::ExpiredPromoCode` if the promo code expired before `as_of`
pub fn compute_quote_at(
    input: &JobPricingInput,
    rules: &RuleTable,
    as_of: DateTime<Utc>,
) -> Result<PriceBreakdown, CoreError> {
    if input.quantity < 1 {
        return Err(CoreError::InvalidQuantity(input.quantity));
    }
    let promo = resolve_promo(input, rules, as_of)?;

    let scale = rules.minor_units;
    let (rate, known) = rules.rate_for(&input.category);
    if !known {
        debug!(category = %input.category, "Unknown category, using default rate");
    }

    let base_price = round_money(rate, scale);
    let featured_surcharge = surcharge(input.is_featured, rate, rules.featured_multiplier, scale);
    let urgent_surcharge = surcharge(input.is_urgent, rate, rules.urgent_multiplier, scale);

    let quantity = Decimal::from(input.quantity);
    let subtotal = base_price
        .saturating_add(featured_surcharge)
        .saturating_add(urgent_surcharge)
        .saturating_mul(quantity);

    let (volume_discount_percent, volume_discount) = match rules.tier_for(input.quantity) {
        Some(tier) => (
            tier.discount_percent,
            percent_of(subtotal, tier.discount_percent, scale),
        ),
        None => (Decimal::ZERO, Decimal::ZERO),
    };

    let after_volume = subtotal.saturating_sub(volume_discount);
    let promo_discount = promo
        .as_ref()
        .map_or(Decimal::ZERO, |(_, p)| promo_amount(p, after_volume, scale));
    let total = after_volume.saturating_sub(promo_discount).max(Decimal::ZERO);

    debug!(
        category = %input.category,
        quantity = input.quantity,
        subtotal = %subtotal,
        total = %total,
        "Computed quote"
    );

    Ok(PriceBreakdown {
        currency: rules.currency.clone(),
        base_price,
        featured_surcharge,
        urgent_surcharge,
        quantity: input.quantity,
        subtotal,
        volume_discount_percent,
        volume_discount,
        promo_code: promo.map(|(code, _)| code),
        promo_discount,
        total,
    })
}

/// Looks up and checks the entered promo code, if any.
fn resolve_promo<'a>(
    input: &JobPricingInput,
    rules: &'a RuleTable,
    as_of: DateTime<Utc>,
) -> Result<Option<(String, &'a PromoCode)>, CoreError> {
    let Some(code) = input.entered_promo() else {
        return Ok(None);
    };

    let Some((key, promo)) = rules.find_promo(code) else {
        debug!(code, "Rejected unknown promo code");
        return Err(CoreError::InvalidPromoCode(code.to_string()));
    };

    if let Some(expired_at) = promo.expires_at.filter(|exp| as_of > *exp) {
        debug!(code, %expired_at, "Rejected expired promo code");
        return Err(CoreError::ExpiredPromoCode {
            code: code.to_string(),
            expired_at,
        });
    }

    Ok(Some((key.to_string(), promo)))
}

fn surcharge(applies: bool, rate: Decimal, multiplier: Decimal, scale: u32) -> Decimal {
    if applies {
        let extra = multiplier.saturating_sub(Decimal::ONE);
        round_money(rate.saturating_mul(extra), scale)
    } else {
        Decimal::ZERO
    }
}

fn percent_of(amount: Decimal, percent: Decimal, scale: u32) -> Decimal {
    round_money(amount.saturating_mul(percent) / Decimal::ONE_HUNDRED, scale)
}

/// Promo discount on `amount`, capped so nothing goes below zero.
fn promo_amount(promo: &PromoCode, amount: Decimal, scale: u32) -> Decimal {
    let percent = promo
        .percent_off
        .map_or(Decimal::ZERO, |p| percent_of(amount, p, scale))
        .min(amount);
    let left = amount.saturating_sub(percent);
    let flat = promo
        .flat_off
        .map_or(Decimal::ZERO, |f| round_money(f, scale))
        .min(left);
    percent.saturating_add(flat)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;
    use trm_core::{MAX_MULTIPLIER, MAX_RATE, VolumeTier};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    fn rules() -> RuleTable {
        let mut rules = RuleTable::default();
        rules.volume_tiers = vec![
            VolumeTier::new(5, Decimal::from(10)),
            VolumeTier::new(10, Decimal::from(15)),
        ];
        rules.promo_codes = BTreeMap::from([
            ("SAVE10".to_string(), PromoCode::percent(Decimal::from(10))),
            ("FLAT5000".to_string(), PromoCode::flat(Decimal::from(5_000))),
            (
                "OLD".to_string(),
                PromoCode::percent(Decimal::from(50)).expiring(now() - Duration::days(1)),
            ),
        ]);
        rules
    }

    #[test]
    fn test_featured_technology_single() {
        let input = JobPricingInput::new("Technology").featured(true);
        let quote = compute_quote_at(&input, &rules(), now()).unwrap();

        assert_eq!(quote.base_price, Decimal::from(50_000));
        assert_eq!(quote.featured_surcharge, Decimal::from(25_000));
        assert_eq!(quote.urgent_surcharge, Decimal::ZERO);
        assert_eq!(quote.total, Decimal::from(75_000));
        assert_eq!(quote.currency, "INR");
    }

    #[test]
    fn test_volume_tier_applied() {
        let input = JobPricingInput::new("Other").with_quantity(5);
        let quote = compute_quote_at(&input, &rules(), now()).unwrap();

        assert_eq!(quote.subtotal, Decimal::from(100_000));
        assert_eq!(quote.volume_discount_percent, Decimal::from(10));
        assert_eq!(quote.volume_discount, Decimal::from(10_000));
        assert_eq!(quote.total, Decimal::from(90_000));
    }

    #[test]
    fn test_highest_tier_wins() {
        let input = JobPricingInput::new("Other").with_quantity(12);
        let quote = compute_quote_at(&input, &rules(), now()).unwrap();

        assert_eq!(quote.volume_discount_percent, Decimal::from(15));
        assert_eq!(quote.volume_discount, Decimal::from(36_000));
        assert_eq!(quote.total, Decimal::from(204_000));
    }

    #[test]
    fn test_featured_and_urgent() {
        let input = JobPricingInput::new("Sales").featured(true).urgent(true);
        let quote = compute_quote_at(&input, &rules(), now()).unwrap();

        assert_eq!(quote.featured_surcharge, Decimal::from(15_000));
        assert_eq!(quote.urgent_surcharge, Decimal::from(7_500));
        assert_eq!(quote.unit_total(), Decimal::from(52_500));
        assert_eq!(quote.total, Decimal::from(52_500));
    }

    #[test]
    fn test_unknown_category_uses_default() {
        let input = JobPricingInput::new("Astronomy");
        let quote = compute_quote_at(&input, &rules(), now()).unwrap();
        assert_eq!(quote.base_price, Decimal::from(20_000));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let input = JobPricingInput::new("Sales").with_quantity(0);
        let err = compute_quote_at(&input, &rules(), now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity(0)));
    }

    #[test]
    fn test_percent_promo_after_volume() {
        let input = JobPricingInput::new("Other").with_quantity(5).with_promo("save10");
        let quote = compute_quote_at(&input, &rules(), now()).unwrap();

        assert_eq!(quote.promo_code.as_deref(), Some("SAVE10"));
        assert_eq!(quote.promo_discount, Decimal::from(9_000));
        assert_eq!(quote.total, Decimal::from(81_000));
        assert!(quote.has_discount());
    }

    #[test]
    fn test_flat_promo_floors_at_zero() {
        let mut rules = rules();
        rules.category_rates.insert("Intern".into(), Decimal::from(3_000));

        let input = JobPricingInput::new("Intern").with_promo("FLAT5000");
        let quote = compute_quote_at(&input, &rules, now()).unwrap();

        assert_eq!(quote.promo_discount, Decimal::from(3_000));
        assert_eq!(quote.total, Decimal::ZERO);
    }

    #[test]
    fn test_percent_then_flat() {
        let mut rules = rules();
        rules.promo_codes.insert(
            "COMBO".into(),
            PromoCode {
                percent_off: Some(Decimal::from(20)),
                flat_off: Some(Decimal::from(1_000)),
                expires_at: None,
            },
        );

        let input = JobPricingInput::new("Technology").with_promo("COMBO");
        let quote = compute_quote_at(&input, &rules, now()).unwrap();

        // 50,000 - 20% = 40,000, then - 1,000
        assert_eq!(quote.promo_discount, Decimal::from(11_000));
        assert_eq!(quote.total, Decimal::from(39_000));
    }

    #[test]
    fn test_unknown_promo_rejected() {
        let input = JobPricingInput::new("Sales").with_promo("NOPE");
        let err = compute_quote_at(&input, &rules(), now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPromoCode(code) if code == "NOPE"));
    }

    #[test]
    fn test_expired_promo_rejected() {
        let input = JobPricingInput::new("Sales").with_promo("old");
        let err = compute_quote_at(&input, &rules(), now()).unwrap_err();
        match err {
            CoreError::ExpiredPromoCode { code, expired_at } => {
                assert_eq!(code, "old");
                assert_eq!(expired_at, now() - Duration::days(1));
            }
            other => panic!("expected expired promo, got {other:?}"),
        }
    }

    #[test]
    fn test_quantity_checked_before_promo() {
        let input = JobPricingInput::new("Sales").with_quantity(0).with_promo("NOPE");
        let err = compute_quote_at(&input, &rules(), now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity(0)));
    }

    #[test]
    fn test_blank_promo_ignored() {
        let input = JobPricingInput::new("Sales").with_promo("  ");
        let quote = compute_quote_at(&input, &rules(), now()).unwrap();
        assert!(quote.promo_code.is_none());
        assert_eq!(quote.total, Decimal::from(30_000));
    }

    #[test]
    fn test_rounds_half_up() {
        let mut rules = rules();
        rules.category_rates.insert("Tiny".into(), Decimal::new(10, 2));
        rules.featured_multiplier = Decimal::new(125, 2);

        // 0.10 * 0.25 = 0.025 -> 0.03
        let input = JobPricingInput::new("Tiny").featured(true);
        let quote = compute_quote_at(&input, &rules, now()).unwrap();
        assert_eq!(quote.featured_surcharge, Decimal::new(3, 2));
        assert_eq!(quote.total, Decimal::new(13, 2));
    }

    #[test]
    fn test_breakdown_adds_up() {
        let input = JobPricingInput::new("Design")
            .featured(true)
            .urgent(true)
            .with_quantity(7)
            .with_promo("FLAT5000");
        let quote = compute_quote_at(&input, &rules(), now()).unwrap();

        let expected = quote.unit_total() * Decimal::from(quote.quantity) - quote.total_discount();
        assert_eq!(quote.total, expected.max(Decimal::ZERO));
    }

    #[test]
    fn test_largest_valid_table_stays_exact() {
        let mut rules = rules();
        rules.default_rate = MAX_RATE;
        rules.featured_multiplier = MAX_MULTIPLIER;
        rules.urgent_multiplier = MAX_MULTIPLIER;
        rules.validate().unwrap();

        let input = JobPricingInput::new("Anything")
            .featured(true)
            .urgent(true)
            .with_quantity(u32::MAX)
            .with_promo("FLAT5000");
        let quote = compute_quote_at(&input, &rules, now()).unwrap();

        let unit = MAX_RATE * Decimal::from(199);
        assert_eq!(quote.subtotal, unit * Decimal::from(u32::MAX));
        assert_eq!(quote.volume_discount, quote.subtotal * Decimal::new(15, 2));
        assert_eq!(
            quote.total,
            quote.subtotal - quote.volume_discount - quote.promo_discount
        );
    }

    #[test]
    fn test_oversized_table_saturates() {
        let mut rules = rules();
        rules.default_rate = Decimal::from(10_i64.pow(18)) * Decimal::ONE_HUNDRED;
        assert!(rules.validate().is_err());

        let input = JobPricingInput::new("Anything")
            .featured(true)
            .with_quantity(u32::MAX);
        let quote = compute_quote_at(&input, &rules, now()).unwrap();

        assert_eq!(quote.subtotal, Decimal::MAX);
        assert!(quote.total >= Decimal::ZERO);
        assert!(quote.total <= quote.subtotal);
    }
}
