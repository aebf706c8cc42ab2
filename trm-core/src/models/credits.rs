//! Credit usage types.
//!
//! Credits are consumable units (e.g., AI resume optimizations) bounded by
//! a plan limit plus a bonus allotment.
//! - [`Allowance`] - A numeric cap or unlimited
//! - [`CreditUsage`] - Usage, limit, bonus, and what remains

use serde::{Deserialize, Serialize};

// ============================================================================
// Allowance
// ============================================================================

/// A credit cap: either a count or unlimited.
///
/// On the wire this is a non-negative integer or `"unlimited"`. Servers
/// also send `null` or `-1` for "no cap"; both read as [`Allowance::Unlimited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AllowanceRepr", into = "AllowanceRepr")]
pub enum Allowance {
    /// A numeric cap.
    Limited(u64),
    /// No cap.
    Unlimited,
}

impl Allowance {
    /// Returns the numeric cap, if any.
    pub fn as_limited(self) -> Option<u64> {
        match self {
            Allowance::Limited(n) => Some(n),
            Allowance::Unlimited => None,
        }
    }

    /// Returns true if there is no cap.
    pub fn is_unlimited(self) -> bool {
        matches!(self, Allowance::Unlimited)
    }

    /// Parses user input such as `"10"` or `"unlimited"`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("unlimited") || input == "-1" {
            return Some(Allowance::Unlimited);
        }
        input.parse().ok().map(Allowance::Limited)
    }
}

impl From<u64> for Allowance {
    fn from(n: u64) -> Self {
        Allowance::Limited(n)
    }
}

impl std::fmt::Display for Allowance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Allowance::Limited(n) => write!(f, "{n}"),
            Allowance::Unlimited => write!(f, "unlimited"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AllowanceRepr {
    Count(u64),
    Signed(i64),
    Word(String),
    Missing(()),
}

impl TryFrom<AllowanceRepr> for Allowance {
    type Error = String;

    fn try_from(repr: AllowanceRepr) -> Result<Self, Self::Error> {
        match repr {
            AllowanceRepr::Count(n) => Ok(Allowance::Limited(n)),
            AllowanceRepr::Signed(-1) | AllowanceRepr::Missing(()) => Ok(Allowance::Unlimited),
            AllowanceRepr::Signed(n) => Err(format!("credit allowance {n} is negative")),
            AllowanceRepr::Word(w) => {
                Allowance::parse(&w).ok_or_else(|| format!("unrecognized credit allowance {w:?}"))
            }
        }
    }
}

impl From<Allowance> for AllowanceRepr {
    fn from(allowance: Allowance) -> Self {
        match allowance {
            Allowance::Limited(n) => AllowanceRepr::Count(n),
            Allowance::Unlimited => AllowanceRepr::Word("unlimited".to_string()),
        }
    }
}

// ============================================================================
// Credit Usage
// ============================================================================

/// Derived credit state for a plan.
///
/// When `limit` is numeric, `remaining = max(0, limit + bonus_credits - usage)`.
/// When `limit` is unlimited, so is `remaining`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditUsage {
    /// Credits consumed.
    pub usage: u64,
    /// Plan limit.
    pub limit: Allowance,
    /// Extra credits granted on top of the limit.
    pub bonus_credits: u64,
    /// Credits still available.
    pub remaining: Allowance,
}

impl CreditUsage {
    /// Limit plus bonus, or `None` when unlimited.
    pub fn capacity(&self) -> Option<u64> {
        self.limit
            .as_limited()
            .map(|limit| limit.saturating_add(self.bonus_credits))
    }

    /// Returns true if a numeric allowance is fully consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Allowance::Limited(0)
    }
}

// ============================================================================
// Tests
// ============================================================================
