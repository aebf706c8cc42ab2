//! Dashboard metric types.
//!
//! This module contains the types consumed and produced by the metrics
//! aggregator:
//! - [`MetricSample`] - One job, referral, or payout record
//! - [`SummaryStats`] - Aggregate statistics for a dashboard panel
//! - [`SummaryOptions`] - What to count as success, baseline, grouping

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Bucket name for samples without a status (or group key).
pub const UNKNOWN_STATUS: &str = "unknown";

/// Default status counted as a success in conversion rates.
pub const DEFAULT_SUCCESS_STATUS: &str = "paid";

// ============================================================================
// Metric Sample
// ============================================================================

/// A single record from an API listing.
///
/// Every field is optional because the server omits them freely; the
/// aggregator defines how absent values are counted. Records may spell a
/// field several ways. When more than one spelling is present the first
/// non-null one wins, in this order:
/// - id: `id`, `_id`
/// - amount: `amount`, `bonusAmount`, `bonus_amount`
/// - timestamp: `timestamp`, `createdAt`, `created_at`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSample")]
pub struct MetricSample {
    /// Record identifier (numeric ids are kept as strings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Lifecycle status (e.g., "pending", "paid").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Monetary amount (bonus, payout, fee).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// When the record was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Job category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Wire form of [`MetricSample`], one field per accepted spelling.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSample {
    #[serde(default, deserialize_with = "string_or_number")]
    id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "string_or_number")]
    underscore_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    bonus_amount: Option<Decimal>,
    #[serde(default, rename = "bonus_amount")]
    bonus_amount_snake: Option<Decimal>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "created_at")]
    created_at_snake: Option<DateTime<Utc>>,
    #[serde(default)]
    category: Option<String>,
}

impl From<RawSample> for MetricSample {
    fn from(raw: RawSample) -> Self {
        Self {
            id: raw.id.or(raw.underscore_id),
            status: raw.status,
            amount: raw.amount.or(raw.bonus_amount).or(raw.bonus_amount_snake),
            timestamp: raw.timestamp.or(raw.created_at).or(raw.created_at_snake),
            category: raw.category,
        }
    }
}

impl MetricSample {
    /// Creates a sample with a status and nothing else.
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Sets the amount.
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Normalized status bucket for this sample.
    pub fn status_key(&self) -> String {
        normalize_status(self.status.as_deref())
    }

    /// Amount with absent values counted as zero.
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// Normalizes a status for bucketing and comparison.
///
/// Trims and lowercases; missing or blank statuses become `"unknown"`.
pub fn normalize_status(status: Option<&str>) -> String {
    match status.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => UNKNOWN_STATUS.to_string(),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    }))
}

// ============================================================================
// Summary Options
// ============================================================================

/// Which quantity a trend compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBasis {
    /// Compare summed amounts.
    #[default]
    Sum,
    /// Compare sample counts.
    Total,
}

impl std::fmt::Display for TrendBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendBasis::Sum => write!(f, "sum"),
            TrendBasis::Total => write!(f, "total"),
        }
    }
}

/// Prior-period value a trend is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendBaseline {
    /// Quantity being compared.
    pub basis: TrendBasis,
    /// Prior-period value of that quantity.
    pub value: Decimal,
}

impl TrendBaseline {
    /// Baseline on summed amounts.
    pub fn sum(value: Decimal) -> Self {
        Self {
            basis: TrendBasis::Sum,
            value,
        }
    }

    /// Baseline on sample counts.
    pub fn total(count: u64) -> Self {
        Self {
            basis: TrendBasis::Total,
            value: Decimal::from(count),
        }
    }
}

/// Field used for the optional secondary grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupField {
    /// Group by normalized status.
    Status,
    /// Group by category as given (trimmed).
    Category,
}

impl GroupField {
    /// Group key of a sample for this field.
    pub fn key_of(self, sample: &MetricSample) -> String {
        match self {
            GroupField::Status => sample.status_key(),
            GroupField::Category => match sample.category.as_deref().map(str::trim) {
                Some(c) if !c.is_empty() => c.to_string(),
                _ => UNKNOWN_STATUS.to_string(),
            },
        }
    }
}

/// Aggregation settings supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryOptions {
    /// Status counted as success in `rate`.
    pub success_status: String,
    /// Prior-period baseline for `trend`.
    pub baseline: Option<TrendBaseline>,
    /// Optional secondary grouping.
    pub group_by: Option<GroupField>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            success_status: DEFAULT_SUCCESS_STATUS.to_string(),
            baseline: None,
            group_by: None,
        }
    }
}

impl SummaryOptions {
    /// Options counting `status` as success.
    pub fn success(status: impl Into<String>) -> Self {
        Self {
            success_status: status.into(),
            ..Self::default()
        }
    }

    /// Sets the baseline.
    pub fn with_baseline(mut self, baseline: TrendBaseline) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Sets the grouping.
    pub fn grouped_by(mut self, field: GroupField) -> Self {
        self.group_by = Some(field);
        self
    }
}

// ============================================================================
// Summary Stats
// ============================================================================

/// Count and amount for one group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupStats {
    /// Samples in the group.
    pub count: u64,
    /// Summed amounts in the group.
    pub sum: Decimal,
}

/// Aggregate statistics, recomputed from scratch on every call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Number of samples.
    pub total: u64,
    /// Sample count per normalized status.
    pub by_status: BTreeMap<String, u64>,
    /// Sum of amounts (absent amounts count as zero).
    pub sum: Decimal,
    /// Success rate, 0-100.
    pub rate: f64,
    /// Signed percentage change against the baseline.
    pub trend: f64,
    /// Secondary grouping, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<BTreeMap<String, GroupStats>>,
}

impl SummaryStats {
    /// Count for a status (normalized before lookup).
    pub fn count_for(&self, status: &str) -> u64 {
        self.by_status
            .get(&normalize_status(Some(status)))
            .copied()
            .unwrap_or(0)
    }

    /// Average amount per sample, if there are any samples.
    pub fn average(&self) -> Option<Decimal> {
        if self.total == 0 {
            return None;
        }
        Some(self.sum / Decimal::from(self.total))
    }

    /// Returns true if the summary covers no samples.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_status() {
        assert_eq!(normalize_status(Some("Paid")), "paid");
        assert_eq!(normalize_status(Some("  PENDING ")), "pending");
        assert_eq!(normalize_status(Some("")), "unknown");
        assert_eq!(normalize_status(Some("   ")), "unknown");
        assert_eq!(normalize_status(None), "unknown");
    }

    #[test]
    fn test_group_keys() {
        let sample = MetricSample::with_status("Hired").category(" Technology ");
        assert_eq!(GroupField::Status.key_of(&sample), "hired");
        assert_eq!(GroupField::Category.key_of(&sample), "Technology");
        assert_eq!(GroupField::Category.key_of(&MetricSample::default()), "unknown");
    }

    #[test]
    fn test_summary_average() {
        let stats = SummaryStats {
            total: 4,
            sum: Decimal::from(1000),
            ..SummaryStats::default()
        };
        assert_eq!(stats.average(), Some(Decimal::from(250)));
        assert_eq!(SummaryStats::default().average(), None);
    }

    #[test]
    fn test_count_for_normalizes() {
        let mut stats = SummaryStats::default();
        stats.by_status.insert("paid".into(), 3);
        assert_eq!(stats.count_for("PAID"), 3);
        assert_eq!(stats.count_for("rejected"), 0);
    }

    #[test]
    fn test_default_options() {
        let opts = SummaryOptions::default();
        assert_eq!(opts.success_status, "paid");
        assert!(opts.baseline.is_none());
        assert!(opts.group_by.is_none());
    }
}
