//! Credit usage derivation.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use trm_core::models::unwrap_envelope;
use trm_core::{Allowance, CoreError, CreditUsage};

/// Percentage above which a plan is considered close to its limit.
pub const APPROACHING_LIMIT_PERCENT: u8 = 80;

/// Derives remaining credits from usage, limit, and bonus.
///
/// With a numeric limit, `remaining = max(0, limit + bonus - usage)`.
/// An unlimited limit leaves `remaining` unlimited.
pub fn derive_credit_usage(usage: u64, limit: Allowance, bonus_credits: u64) -> CreditUsage {
    let remaining = match limit {
        Allowance::Limited(limit) => {
            Allowance::Limited(limit.saturating_add(bonus_credits).saturating_sub(usage))
        }
        Allowance::Unlimited => Allowance::Unlimited,
    };

    CreditUsage {
        usage,
        limit,
        bonus_credits,
        remaining,
    }
}

/// Percentage of the allowance consumed, in `0..=100`.
///
/// Rounded half-up to a whole percent. Unlimited plans and zero capacity
/// report 0.
pub fn percent_used(credits: &CreditUsage) -> u8 {
    let capacity = match credits.capacity() {
        Some(0) | None => return 0,
        Some(c) => u128::from(c),
    };

    // round(usage * 100 / capacity) in integer math
    let percent = (u128::from(credits.usage) * 200 + capacity) / (capacity * 2);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

/// Returns true when more than 80% of a numeric allowance is used.
pub fn is_approaching_limit(credits: &CreditUsage) -> bool {
    percent_used(credits) > APPROACHING_LIMIT_PERCENT
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCredits {
    #[serde(default, alias = "used", alias = "creditsUsed")]
    usage: u64,
    #[serde(default = "unlimited", alias = "creditLimit", alias = "creditsLimit")]
    limit: Allowance,
    #[serde(default, alias = "bonus", alias = "bonus_credits")]
    bonus_credits: u64,
}

fn unlimited() -> Allowance {
    Allowance::Unlimited
}

/// Parses a credits response and derives its usage.
///
/// Accepts the bare object or the `{ success, data }` envelope. Any
/// `remaining` sent by the server is ignored and recomputed.
///
/// # Errors
///
/// Returns the envelope error, or `CoreError::Serialization` when a field
/// has the wrong type (e.g., negative usage).
pub fn parse_credit_usage(value: &Value) -> Result<CreditUsage, CoreError> {
    let payload = unwrap_envelope(value)?;
    let raw = RawCredits::deserialize(payload)?;
    let credits = derive_credit_usage(raw.usage, raw.limit, raw.bonus_credits);
    debug!(usage = credits.usage, limit = %credits.limit, "Parsed credit usage");
    Ok(credits)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_limited_with_bonus() {
        let credits = derive_credit_usage(8, Allowance::Limited(10), 2);
        assert_eq!(credits.remaining, Allowance::Limited(4));
        assert_eq!(percent_used(&credits), 67);
        assert!(!credits.is_exhausted());
    }

    #[test]
    fn test_overused_floors_at_zero() {
        let credits = derive_credit_usage(15, Allowance::Limited(10), 0);
        assert_eq!(credits.remaining, Allowance::Limited(0));
        assert_eq!(percent_used(&credits), 100);
        assert!(credits.is_exhausted());
    }

    #[test]
    fn test_unlimited() {
        let credits = derive_credit_usage(1_000, Allowance::Unlimited, 5);
        assert_eq!(credits.remaining, Allowance::Unlimited);
        assert_eq!(percent_used(&credits), 0);
        assert!(!is_approaching_limit(&credits));
    }

    #[test]
    fn test_zero_capacity() {
        let credits = derive_credit_usage(0, Allowance::Limited(0), 0);
        assert_eq!(percent_used(&credits), 0);
        assert!(credits.is_exhausted());
    }

    #[test]
    fn test_percent_rounds_half_up() {
        // 1/8 = 12.5%
        let credits = derive_credit_usage(1, Allowance::Limited(8), 0);
        assert_eq!(percent_used(&credits), 13);
        // 1/3 = 33.3%
        let credits = derive_credit_usage(1, Allowance::Limited(3), 0);
        assert_eq!(percent_used(&credits), 33);
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let credits = derive_credit_usage(u64::MAX, Allowance::Limited(u64::MAX), u64::MAX);
        assert_eq!(credits.remaining, Allowance::Limited(0));
        assert_eq!(percent_used(&credits), 100);
    }

    #[test]
    fn test_approaching_limit() {
        assert!(!is_approaching_limit(&derive_credit_usage(8, Allowance::Limited(10), 0)));
        assert!(is_approaching_limit(&derive_credit_usage(9, Allowance::Limited(10), 0)));
    }

    #[test]
    fn test_parse_enveloped() {
        let value = json!({
            "success": true,
            "data": {"usage": 3, "limit": "unlimited", "bonusCredits": 1}
        });
        let credits = parse_credit_usage(&value).unwrap();
        assert_eq!(credits.usage, 3);
        assert_eq!(credits.remaining, Allowance::Unlimited);
    }

    #[test]
    fn test_parse_recomputes_remaining() {
        let value = json!({"used": 8, "limit": 10, "bonus": 2, "remaining": 99});
        let credits = parse_credit_usage(&value).unwrap();
        assert_eq!(credits.remaining, Allowance::Limited(4));
    }

    #[test]
    fn test_parse_null_limit() {
        let value = json!({"usage": 2, "limit": null});
        let credits = parse_credit_usage(&value).unwrap();
        assert!(credits.limit.is_unlimited());
    }

    #[test]
    fn test_parse_rejects_negative_usage() {
        let value = json!({"usage": -1, "limit": 10});
        assert!(matches!(
            parse_credit_usage(&value),
            Err(CoreError::Serialization(_))
        ));
    }
}
