//! Summary statistics and time-bucketed totals.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::error::InvalidArgument;
use crate::models::receipt::Receipt;

/// Aggregate statistics over a set of receipts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendSummary {
    pub total_spend: Decimal,
    pub mean_spend: Decimal,
    pub median_spend: Decimal,
    /// Every amount tied for the highest occurrence count, ascending.
    pub mode_spend: Vec<Decimal>,
    pub vendor_frequency: BTreeMap<String, usize>,
    pub category_frequency: BTreeMap<String, usize>,
}

/// Compute spend statistics and frequency tables.
///
/// An empty input yields zeros and empty collections.
pub fn aggregate(records: &[Receipt]) -> SpendSummary {
    if records.is_empty() {
        return SpendSummary::default();
    }

    let mut amounts: Vec<Decimal> = records.iter().map(|r| r.amount).collect();
    let total_spend = amounts
        .iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(*amount))
        .unwrap_or_else(|| {
            warn!("Total spend overflowed, saturating at {}", Decimal::MAX);
            Decimal::MAX
        });
    let mean_spend = total_spend / Decimal::from(amounts.len());

    amounts.sort();
    let mid = amounts.len() / 2;
    let median_spend = if amounts.len() % 2 == 0 {
        let (lower, upper) = (amounts[mid - 1], amounts[mid]);
        lower + (upper - lower) / Decimal::TWO
    } else {
        amounts[mid]
    };

    let mut counts: BTreeMap<Decimal, usize> = BTreeMap::new();
    for amount in &amounts {
        *counts.entry(*amount).or_default() += 1;
    }
    let highest = counts.values().copied().max().unwrap_or(0);
    let mode_spend = counts
        .into_iter()
        .filter(|(_, count)| *count == highest)
        .map(|(amount, _)| amount)
        .collect();

    let mut vendor_frequency = BTreeMap::new();
    let mut category_frequency = BTreeMap::new();
    for record in records {
        *vendor_frequency.entry(record.vendor.clone()).or_default() += 1;
        *category_frequency
            .entry(record.category.label().to_string())
            .or_default() += 1;
    }

    SpendSummary {
        total_spend,
        mean_spend,
        median_spend,
        mode_spend,
        vendor_frequency,
        category_frequency,
    }
}

/// Time bucket size for trend aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Month,
    Year,
}

impl Granularity {
    fn label_format(&self) -> &'static str {
        match self {
            Granularity::Month => "%Y-%m",
            Granularity::Year => "%Y",
        }
    }
}

impl FromStr for Granularity {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            _ => Err(InvalidArgument::new("granularity", s, "month, year")),
        }
    }
}

/// Sum amounts per `YYYY-MM` or `YYYY` period, ordered by period label.
pub fn time_series(records: &[Receipt], granularity: Granularity) -> BTreeMap<String, Decimal> {
    let mut buckets = BTreeMap::new();
    for record in records {
        let label = record
            .transaction_date
            .format(granularity.label_format())
            .to_string();
        let total = buckets.entry(label).or_insert(Decimal::ZERO);
        *total = total.checked_add(record.amount).unwrap_or_else(|| {
            warn!("Spend for a period overflowed, saturating at {}", Decimal::MAX);
            Decimal::MAX
        });
    }
    buckets
}

/// The `n` most frequent entries, by count descending.
///
/// Equal counts keep the table's key order.
pub fn top_vendors(frequency: &BTreeMap<String, usize>, n: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = frequency
        .iter()
        .map(|(vendor, count)| (vendor.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// Dashboard view over the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub total_spend: Decimal,
    pub mean_spend: Decimal,
    pub median_spend: Decimal,
    pub mode_spend: Vec<Decimal>,
    pub top_vendors: Vec<(String, usize)>,
    pub category_distribution: BTreeMap<String, usize>,
    pub monthly_spend_trend: BTreeMap<String, Decimal>,
    pub yearly_spend_trend: BTreeMap<String, Decimal>,
}

impl Insights {
    pub fn compute(records: &[Receipt], top_n: usize) -> Self {
        let summary = aggregate(records);
        Self {
            top_vendors: top_vendors(&summary.vendor_frequency, top_n),
            total_spend: summary.total_spend,
            mean_spend: summary.mean_spend,
            median_spend: summary.median_spend,
            mode_spend: summary.mode_spend,
            category_distribution: summary.category_frequency,
            monthly_spend_trend: time_series(records, Granularity::Month),
            yearly_spend_trend: time_series(records, Granularity::Year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{at, receipt};
    use crate::models::receipt::Category;
    use pretty_assertions::assert_eq;

    fn with_amounts(amounts: &[&str]) -> Vec<Receipt> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| receipt(i as i64 + 1, "Shop", a, at(2024, 1, 1), Category::Groceries))
            .collect()
    }

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate(&[]), SpendSummary::default());
        assert_eq!(aggregate(&[]).total_spend, Decimal::ZERO);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(aggregate(&with_amounts(&["10", "30", "20"])).median_spend, dec(20));
        assert_eq!(aggregate(&with_amounts(&["40", "10", "30", "20"])).median_spend, dec(25));
    }

    #[test]
    fn test_mode_preserves_ties() {
        assert_eq!(aggregate(&with_amounts(&["5", "5", "10"])).mode_spend, vec![dec(5)]);
        assert_eq!(
            aggregate(&with_amounts(&["10", "5", "5", "10"])).mode_spend,
            vec![dec(5), dec(10)]
        );
    }

    #[test]
    fn test_total_mean_and_frequencies() {
        let records = vec![
            receipt(1, "Kroger", "10.00", at(2024, 1, 1), Category::Groceries),
            receipt(2, "Kroger", "20.00", at(2024, 1, 2), Category::Groceries),
            receipt(3, "Comcast", "30.00", at(2024, 1, 3), Category::InternetTelecom),
        ];
        let summary = aggregate(&records);

        assert_eq!(summary.total_spend, dec(60));
        assert_eq!(summary.mean_spend, dec(20));
        assert_eq!(
            summary.vendor_frequency,
            BTreeMap::from([("Comcast".to_string(), 1), ("Kroger".to_string(), 2)])
        );
        assert_eq!(
            summary.category_frequency,
            BTreeMap::from([("Groceries".to_string(), 2), ("Internet/Telecom".to_string(), 1)])
        );
    }

    #[test]
    fn test_time_series_month_and_year() {
        let records = vec![
            receipt(1, "A", "100", at(2024, 1, 5), Category::Dining),
            receipt(2, "B", "100", at(2024, 1, 20), Category::Dining),
            receipt(3, "C", "50", at(2023, 12, 31), Category::Dining),
        ];

        assert_eq!(
            time_series(&records, Granularity::Month),
            BTreeMap::from([("2023-12".to_string(), dec(50)), ("2024-01".to_string(), dec(200))])
        );
        assert_eq!(
            time_series(&records, Granularity::Year),
            BTreeMap::from([("2023".to_string(), dec(50)), ("2024".to_string(), dec(200))])
        );
        let labels: Vec<_> = time_series(&records, Granularity::Month).into_keys().collect();
        assert_eq!(labels, vec!["2023-12", "2024-01"]);
    }

    #[test]
    fn test_huge_amounts_saturate_instead_of_overflowing() {
        let max = Decimal::MAX.to_string();
        let records = vec![
            receipt(1, "Big Vendor", &max, at(2024, 1, 1), Category::Miscellaneous),
            receipt(2, "Big Vendor", &max, at(2024, 1, 2), Category::Miscellaneous),
        ];

        let summary = aggregate(&records);
        assert_eq!(summary.total_spend, Decimal::MAX);
        assert_eq!(summary.median_spend, Decimal::MAX);
        assert_eq!(summary.mode_spend, vec![Decimal::MAX]);
        assert_eq!(
            time_series(&records, Granularity::Month),
            BTreeMap::from([("2024-01".to_string(), Decimal::MAX)])
        );
    }

    #[test]
    fn test_invalid_granularity() {
        assert_eq!("month".parse::<Granularity>().unwrap(), Granularity::Month);
        let err = "week".parse::<Granularity>().unwrap_err();
        assert_eq!(err.argument, "granularity");
        assert_eq!(err.value, "week");
    }

    #[test]
    fn test_top_vendors_ordering() {
        let frequency = BTreeMap::from([
            ("Amazon".to_string(), 2),
            ("Kroger".to_string(), 5),
            ("Target".to_string(), 2),
            ("Zara".to_string(), 1),
        ]);
        assert_eq!(
            top_vendors(&frequency, 3),
            vec![
                ("Kroger".to_string(), 5),
                ("Amazon".to_string(), 2),
                ("Target".to_string(), 2)
            ]
        );
        assert!(top_vendors(&frequency, 0).is_empty());
    }

    #[test]
    fn test_insights_compute() {
        let records = vec![
            receipt(1, "Kroger", "10", at(2024, 1, 1), Category::Groceries),
            receipt(2, "Kroger", "20", at(2024, 2, 1), Category::Groceries),
            receipt(3, "Comcast", "30", at(2025, 1, 1), Category::InternetTelecom),
        ];
        let insights = Insights::compute(&records, 1);

        assert_eq!(insights.total_spend, dec(60));
        assert_eq!(insights.top_vendors, vec![("Kroger".to_string(), 2)]);
        assert_eq!(insights.monthly_spend_trend.len(), 3);
        assert_eq!(
            insights.yearly_spend_trend,
            BTreeMap::from([("2024".to_string(), dec(30)), ("2025".to_string(), dec(30))])
        );
    }
}
