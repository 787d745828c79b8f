//! Aggregation helpers shared by dashboards and reports.
//!
//! These are pure functions over already-fetched rows: monthly bucketing,
//! count trends, top-N rankings and guarded percentages.

use crate::core::period::month_key;
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Number of months shown by monthly evolution charts
pub const MONTHS_IN_WINDOW: u32 = 12;

/// Sum of an amount over one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// `YYYY-MM` key
    pub month: String,
    /// Sum of the amounts dated in that month
    pub total: f64,
}

/// Keys of the 12 calendar months ending with the month of `reference`, oldest first.
#[must_use]
pub fn month_window(reference: NaiveDate) -> Vec<String> {
    let first_of_month = reference.with_day(1).unwrap_or(reference);
    (0..MONTHS_IN_WINDOW)
        .rev()
        .filter_map(|back| first_of_month.checked_sub_months(Months::new(back)))
        .map(month_key)
        .collect()
}

/// Buckets `(date, amount)` rows into the 12 most recent calendar months.
///
/// Buckets are chronological; months without rows are 0 and rows outside the
/// window are dropped.
#[must_use]
pub fn monthly_buckets(rows: &[(NaiveDate, f64)], reference: NaiveDate) -> Vec<MonthlyBucket> {
    let mut buckets: Vec<MonthlyBucket> = month_window(reference)
        .into_iter()
        .map(|month| MonthlyBucket { month, total: 0.0 })
        .collect();

    for (date, amount) in rows {
        let iso = date.format("%Y-%m-%d").to_string();
        if let Some(bucket) = buckets.iter_mut().find(|b| iso.starts_with(&b.month)) {
            bucket.total += amount;
        }
    }

    buckets
}

/// Percent change in row *count* between the two halves split at `midpoint`.
///
/// Rows strictly before the midpoint form the first half. Returns 0 when the
/// first half is empty.
#[must_use]
pub fn trend_percent(dates: &[NaiveDate], midpoint: NaiveDate) -> f64 {
    let before = dates.iter().filter(|d| **d < midpoint).count();
    let after = dates.len() - before;
    if before == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)] // row counts are small
    let (before, after) = (before as f64, after as f64);
    (after - before) / before * 100.0
}

/// Sorts `totals` descending by value and keeps the first `n` entries.
///
/// Ties are broken by key so the ranking is stable across calls.
#[must_use]
pub fn top_n<K>(totals: HashMap<K, f64>, n: usize) -> Vec<(K, f64)>
where
    K: Ord,
{
    let mut ranked: Vec<(K, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

/// Adds `amount` to the entry for `key`.
pub fn accumulate<K>(totals: &mut HashMap<K, f64>, key: K, amount: f64)
where
    K: std::hash::Hash + Eq,
{
    *totals.entry(key).or_insert(0.0) += amount;
}

/// `part / total * 100`, or 0 when `total` is 0
#[must_use]
pub fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    part / total * 100.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_window_is_chronological() {
        let window = month_window(d(2024, 3, 15));
        assert_eq!(window.len(), 12);
        assert_eq!(window.first().unwrap(), "2023-04");
        assert_eq!(window.last().unwrap(), "2024-03");
        let mut sorted = window.clone();
        sorted.sort();
        assert_eq!(window, sorted);
    }

    #[test]
    fn test_monthly_buckets_sums_and_drops_out_of_window() {
        let rows = vec![
            (d(2024, 3, 1), 5000.0),
            (d(2024, 3, 28), 7000.0),
            (d(2023, 4, 10), 100.0),
            (d(2023, 3, 31), 999.0), // 13 months back
            (d(2024, 4, 1), 888.0),  // after the reference month
            (d(2021, 1, 1), 777.0),
        ];

        let buckets = monthly_buckets(&rows, d(2024, 3, 15));

        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0], MonthlyBucket { month: "2023-04".into(), total: 100.0 });
        assert_eq!(buckets[11], MonthlyBucket { month: "2024-03".into(), total: 12000.0 });
        let total: f64 = buckets.iter().map(|b| b.total).sum();
        assert_eq!(total, 12100.0);
        assert!(buckets[1..11].iter().all(|b| b.total == 0.0));
    }

    #[test]
    fn test_monthly_buckets_empty() {
        let buckets = monthly_buckets(&[], d(2024, 1, 1));
        assert_eq!(buckets.len(), 12);
        assert!(buckets.iter().all(|b| b.total == 0.0));
    }

    #[test]
    fn test_trend_empty_before_is_zero() {
        let mid = d(2024, 1, 15);
        let dates = vec![d(2024, 1, 20), d(2024, 1, 25)];
        let trend = trend_percent(&dates, mid);
        assert_eq!(trend, 0.0);
        assert!(trend.is_finite());
    }

    #[test]
    fn test_trend_equal_halves_is_zero() {
        let mid = d(2024, 1, 15);
        let dates = vec![d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 15), d(2024, 1, 30)];
        assert_eq!(trend_percent(&dates, mid), 0.0);
    }

    #[test]
    fn test_trend_growth_and_decline() {
        let mid = d(2024, 1, 15);
        let growth = vec![d(2024, 1, 1), d(2024, 1, 20), d(2024, 1, 21)];
        assert_eq!(trend_percent(&growth, mid), 100.0);

        let decline = vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4), d(2024, 1, 20)];
        assert_eq!(trend_percent(&decline, mid), -75.0);
    }

    #[test]
    fn test_top_n_orders_descending_and_truncates() {
        let mut totals = HashMap::new();
        accumulate(&mut totals, 1_i64, 100.0);
        accumulate(&mut totals, 2, 300.0);
        accumulate(&mut totals, 3, 200.0);
        accumulate(&mut totals, 1, 250.0);

        let top = top_n(totals, 2);
        assert_eq!(top, vec![(1, 350.0), (2, 300.0)]);
    }

    #[test]
    fn test_top_n_breaks_ties_by_key() {
        let totals = HashMap::from([("b", 10.0), ("a", 10.0), ("c", 5.0)]);
        let top = top_n(totals, 5);
        assert_eq!(top, vec![("a", 10.0), ("b", 10.0), ("c", 5.0)]);
    }

    #[test]
    fn test_percentage_guards_zero_total() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(25.0, 200.0), 12.5);
    }
}
