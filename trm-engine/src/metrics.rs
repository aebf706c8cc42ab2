//! Metrics aggregator.
//!
//! Turns job, referral, and payout listings into dashboard statistics.
//! Aggregation is commutative: the order of the input never changes any
//! output field. Sums saturate at `Decimal::MAX` and `Decimal::MIN`.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;
use trm_core::models::normalize_status;
use trm_core::{GroupStats, MetricSample, SummaryOptions, SummaryStats, TrendBaseline, TrendBasis};

/// Summarizes samples.
///
/// An empty slice yields all-zero stats.
pub fn summarize(samples: &[MetricSample], options: &SummaryOptions) -> SummaryStats {
    let target = normalize_status(Some(&options.success_status));

    let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
    let mut grouped: BTreeMap<String, (u64, SaturatingSum)> = BTreeMap::new();
    let mut sum = SaturatingSum::default();

    for sample in samples {
        *by_status.entry(sample.status_key()).or_insert(0) += 1;
        sum.add(sample.amount_or_zero());

        if let Some(field) = options.group_by {
            let (count, group_sum) = grouped.entry(field.key_of(sample)).or_default();
            *count += 1;
            group_sum.add(sample.amount_or_zero());
        }
    }

    let sum = sum.total();
    let groups: BTreeMap<String, GroupStats> = grouped
        .into_iter()
        .map(|(key, (count, group_sum))| {
            let stats = GroupStats {
                count,
                sum: group_sum.total(),
            };
            (key, stats)
        })
        .collect();

    let total = samples.len() as u64;
    let successes = by_status.get(&target).copied().unwrap_or(0);
    let rate = if total == 0 {
        0.0
    } else {
        successes as f64 / total as f64 * 100.0
    };

    let trend = options.baseline.map_or(0.0, |baseline| {
        let current = match baseline.basis {
            TrendBasis::Sum => sum,
            TrendBasis::Total => Decimal::from(total),
        };
        percent_change(current, baseline.value)
    });

    SummaryStats {
        total,
        by_status,
        sum,
        rate,
        trend,
        groups: options.group_by.map(|_| groups),
    }
}

/// Summarizes the window ending at `as_of`, with the trend measured
/// against the window of equal length just before it.
///
/// The current window is `(as_of - window, as_of]` and the prior one is
/// `(as_of - 2*window, as_of - window]`. Samples without a timestamp fall
/// in neither. The trend basis comes from `options.baseline` when set
/// (its value is replaced), otherwise it compares sums.
pub fn summarize_period(
    samples: &[MetricSample],
    as_of: DateTime<Utc>,
    window: Duration,
    options: &SummaryOptions,
) -> SummaryStats {
    // Windows reaching past the earliest representable instant are unbounded.
    let current_start = as_of
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let prior_start = current_start
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let (current, prior): (Vec<MetricSample>, Vec<MetricSample>) = samples
        .iter()
        .filter(|s| {
            s.timestamp
                .is_some_and(|ts| ts > prior_start && ts <= as_of)
        })
        .cloned()
        .partition(|s| s.timestamp.is_some_and(|ts| ts > current_start));

    let basis = options.baseline.map_or(TrendBasis::Sum, |b| b.basis);
    let prior_stats = summarize(&prior, &SummaryOptions::success(options.success_status.clone()));
    let baseline = match basis {
        TrendBasis::Sum => TrendBaseline::sum(prior_stats.sum),
        TrendBasis::Total => TrendBaseline::total(prior_stats.total),
    };

    debug!(
        current = current.len(),
        prior = prior.len(),
        basis = %basis,
        "Split samples into periods"
    );

    summarize(&current, &options.clone().with_baseline(baseline))
}

/// Signed percentage change from `baseline` to `current`.
///
/// Zero when the baseline is zero. Changes too large for `Decimal` are
/// computed in `f64` instead.
pub fn percent_change(current: Decimal, baseline: Decimal) -> f64 {
    if baseline.is_zero() {
        return 0.0;
    }
    let exact = current
        .checked_sub(baseline)
        .and_then(|diff| diff.checked_div(baseline.abs()))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

    match exact {
        Some(change) => change.to_f64().unwrap_or(0.0),
        None => {
            let current = current.to_f64().unwrap_or(0.0);
            let baseline = baseline.to_f64().unwrap_or(0.0);
            (current - baseline) / baseline.abs() * 100.0
        }
    }
}

/// Order-independent saturating sum.
///
/// Positive and negative amounts accumulate separately, so where the
/// running total saturates never depends on input order.
#[derive(Debug, Default, Clone, Copy)]
struct SaturatingSum {
    positive: Decimal,
    negative: Decimal,
}

impl SaturatingSum {
    fn add(&mut self, amount: Decimal) {
        if amount.is_sign_negative() {
            self.negative = self.negative.saturating_add(amount);
        } else {
            self.positive = self.positive.saturating_add(amount);
        }
    }

    fn total(self) -> Decimal {
        self.positive.saturating_add(self.negative)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use trm_core::GroupField;

    fn referrals() -> Vec<MetricSample> {
        vec![
            MetricSample::with_status("pending").amount(Decimal::from(1_000)),
            MetricSample::with_status("approved").amount(Decimal::from(2_000)),
            MetricSample::with_status("paid").amount(Decimal::from(3_000)),
            MetricSample::with_status("rejected"),
        ]
    }

    #[test]
    fn test_empty_input() {
        let stats = summarize(&[], &SummaryOptions::default());
        assert_eq!(stats.total, 0);
        assert!(stats.by_status.is_empty());
        assert_eq!(stats.sum, Decimal::ZERO);
        assert_eq!(stats.rate, 0.0);
        assert_eq!(stats.trend, 0.0);
        assert!(stats.groups.is_none());
    }

    #[test]
    fn test_referral_conversion_rate() {
        let stats = summarize(&referrals(), &SummaryOptions::success("paid"));
        assert_eq!(stats.total, 4);
        assert_eq!(stats.rate, 25.0);
        assert_eq!(stats.sum, Decimal::from(6_000));
        assert_eq!(stats.count_for("rejected"), 1);
    }

    #[test]
    fn test_missing_status_bucketed() {
        let samples = vec![
            MetricSample::default(),
            MetricSample::with_status(""),
            MetricSample::with_status("Paid"),
        ];
        let stats = summarize(&samples, &SummaryOptions::default());
        assert_eq!(stats.by_status["unknown"], 2);
        assert_eq!(stats.by_status["paid"], 1);
    }

    #[test]
    fn test_target_status_normalized() {
        let stats = summarize(&referrals(), &SummaryOptions::success(" PAID "));
        assert_eq!(stats.rate, 25.0);
    }

    #[test]
    fn test_trend_on_sum() {
        let options = SummaryOptions::default().with_baseline(TrendBaseline::sum(Decimal::from(4_000)));
        let stats = summarize(&referrals(), &options);
        assert_eq!(stats.trend, 50.0);
    }

    #[test]
    fn test_trend_on_total() {
        let options = SummaryOptions::default().with_baseline(TrendBaseline::total(8));
        let stats = summarize(&referrals(), &options);
        assert_eq!(stats.trend, -50.0);
    }

    #[test]
    fn test_trend_zero_baseline() {
        let options = SummaryOptions::default().with_baseline(TrendBaseline::sum(Decimal::ZERO));
        let stats = summarize(&referrals(), &options);
        assert_eq!(stats.trend, 0.0);
    }

    #[test]
    fn test_group_by_category() {
        let samples = vec![
            MetricSample::with_status("open").category("Technology").amount(Decimal::from(10)),
            MetricSample::with_status("open").category("Technology").amount(Decimal::from(5)),
            MetricSample::with_status("closed").category("Sales"),
            MetricSample::with_status("open"),
        ];
        let options = SummaryOptions::default().grouped_by(GroupField::Category);
        let groups = summarize(&samples, &options).groups.unwrap();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups["Technology"].count, 2);
        assert_eq!(groups["Technology"].sum, Decimal::from(15));
        assert_eq!(groups["Sales"].count, 1);
        assert_eq!(groups["unknown"].count, 1);
    }

    #[test]
    fn test_summarize_period() {
        let as_of = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        let day = Duration::days(1);
        let samples = vec![
            // current week
            MetricSample::with_status("paid").amount(Decimal::from(300)).at(as_of - day),
            MetricSample::with_status("pending").amount(Decimal::from(300)).at(as_of),
            // prior week
            MetricSample::with_status("paid").amount(Decimal::from(400)).at(as_of - day * 10),
            // too old
            MetricSample::with_status("paid").amount(Decimal::from(9_999)).at(as_of - day * 30),
            // no timestamp
            MetricSample::with_status("paid").amount(Decimal::from(9_999)),
        ];

        let stats = summarize_period(&samples, as_of, Duration::days(7), &SummaryOptions::default());
        assert_eq!(stats.total, 2);
        assert_eq!(stats.sum, Decimal::from(600));
        assert_eq!(stats.rate, 50.0);
        assert_eq!(stats.trend, 50.0);
    }

    #[test]
    fn test_summarize_period_count_basis() {
        let as_of = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        let samples = vec![
            MetricSample::with_status("open").at(as_of - Duration::hours(1)),
            MetricSample::with_status("open").at(as_of - Duration::hours(30)),
            MetricSample::with_status("open").at(as_of - Duration::hours(40)),
        ];
        let options = SummaryOptions::default().with_baseline(TrendBaseline::total(0));
        let stats = summarize_period(&samples, as_of, Duration::days(1), &options);

        assert_eq!(stats.total, 1);
        assert_eq!(stats.trend, -50.0);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(Decimal::from(150), Decimal::from(100)), 50.0);
        assert_eq!(percent_change(Decimal::from(50), Decimal::from(100)), -50.0);
        assert_eq!(percent_change(Decimal::from(50), Decimal::ZERO), 0.0);
        assert_eq!(percent_change(Decimal::from(-50), Decimal::from(-100)), 50.0);
    }

    #[test]
    fn test_percent_change_beyond_decimal_range() {
        let current = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let change = percent_change(current, Decimal::new(1, 10));
        assert!(change.is_finite());
        assert!(change > 1e38);

        let change = percent_change(Decimal::MIN, Decimal::MAX);
        assert!((change + 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_sum_saturates_instead_of_overflowing() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let samples = vec![
            MetricSample::with_status("paid").category("Technology").amount(huge),
            MetricSample::with_status("paid").category("Technology").amount(huge),
        ];
        let options = SummaryOptions::default()
            .grouped_by(GroupField::Category)
            .with_baseline(TrendBaseline::sum(Decimal::new(1, 10)));
        let stats = summarize(&samples, &options);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.sum, Decimal::MAX);
        assert_eq!(stats.groups.unwrap()["Technology"].sum, Decimal::MAX);
        assert!(stats.trend.is_finite());
    }

    #[test]
    fn test_saturated_sum_is_order_independent() {
        let samples = vec![
            MetricSample::default().amount(Decimal::MAX),
            MetricSample::default().amount(Decimal::MAX),
            MetricSample::default().amount(Decimal::MIN),
        ];
        let mut reordered = samples.clone();
        reordered.rotate_left(1);

        let options = SummaryOptions::default();
        assert_eq!(summarize(&samples, &options).sum, Decimal::ZERO);
        assert_eq!(
            summarize(&samples, &options),
            summarize(&reordered, &options)
        );
    }

    #[test]
    fn test_summarize_period_huge_window() {
        let as_of = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();
        let samples = vec![
            MetricSample::with_status("paid")
                .amount(Decimal::from(100))
                .at(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()),
        ];

        let window = Duration::days(i64::from(u32::MAX));
        let stats = summarize_period(&samples, as_of, window, &SummaryOptions::default());
        assert_eq!(stats.total, 1);
        assert_eq!(stats.sum, Decimal::from(100));
        assert_eq!(stats.trend, 0.0);

        let stats = summarize_period(&[], as_of, window, &SummaryOptions::default());
        assert!(stats.is_empty());
    }
}
