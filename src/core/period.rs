//! Period presets used by dashboards and reports.
//!
//! A preset resolves to an inclusive [`DateRange`] ending today (or the custom
//! bounds), which every range query in `core` accepts.

use crate::errors::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day, inclusive
    pub start: NaiveDate,
    /// Last day, inclusive
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::validation(format!(
                "La date de début {start} est postérieure à la date de fin {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Range covering a whole calendar month.
    pub fn month(annee: i32, mois: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(annee, mois, 1)
            .ok_or_else(|| Error::validation(format!("Mois invalide : {mois:02}/{annee}")))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| Error::validation(format!("Mois invalide : {mois:02}/{annee}")))?;
        Ok(Self { start, end })
    }

    /// Whether `date` falls inside the range
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Date splitting the range in two halves, used for trend computation
    #[must_use]
    pub fn midpoint(&self) -> NaiveDate {
        let half = (self.end - self.start) / 2;
        self.start + half
    }
}

/// Period presets offered by the dashboard filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodPreset {
    /// Last month up to today
    LastMonth,
    /// Last three months up to today
    LastQuarter,
    /// Last six months up to today
    LastSemester,
    /// Last twelve months up to today
    LastYear,
    /// Explicit bounds
    Custom {
        /// First day
        start: NaiveDate,
        /// Last day
        end: NaiveDate,
    },
}

impl PeriodPreset {
    /// Resolves the preset relative to `today`.
    pub fn range(self, today: NaiveDate) -> Result<DateRange> {
        let months_back = match self {
            Self::LastMonth => 1,
            Self::LastQuarter => 3,
            Self::LastSemester => 6,
            Self::LastYear => 12,
            Self::Custom { start, end } => return DateRange::new(start, end),
        };
        let start = today
            .checked_sub_months(Months::new(months_back))
            .ok_or_else(|| Error::validation("Période hors limites"))?;
        DateRange::new(start, today)
    }

    /// French label for display
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LastMonth => "Dernier mois",
            Self::LastQuarter => "Dernier trimestre",
            Self::LastSemester => "Dernier semestre",
            Self::LastYear => "Dernière année",
            Self::Custom { .. } => "Période personnalisée",
        }
    }
}

/// `YYYY-MM` key of a date, the prefix of its ISO representation
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_presets_end_today() {
        let today = d(2024, 5, 31);
        assert_eq!(
            PeriodPreset::LastMonth.range(today).unwrap(),
            DateRange { start: d(2024, 4, 30), end: today }
        );
        assert_eq!(PeriodPreset::LastQuarter.range(today).unwrap().start, d(2024, 2, 29));
        assert_eq!(PeriodPreset::LastSemester.range(today).unwrap().start, d(2023, 11, 30));
        assert_eq!(PeriodPreset::LastYear.range(today).unwrap().start, d(2023, 5, 31));
    }

    #[test]
    fn test_custom_range_validation() {
        let preset = PeriodPreset::Custom { start: d(2024, 3, 1), end: d(2024, 2, 1) };
        assert!(matches!(preset.range(d(2024, 5, 1)), Err(Error::Validation { .. })));

        let preset = PeriodPreset::Custom { start: d(2024, 1, 1), end: d(2024, 2, 1) };
        assert_eq!(preset.range(d(2030, 1, 1)).unwrap().end, d(2024, 2, 1));
    }

    #[test]
    fn test_month_range() {
        let feb = DateRange::month(2024, 2).unwrap();
        assert_eq!(feb.start, d(2024, 2, 1));
        assert_eq!(feb.end, d(2024, 2, 29));

        let dec = DateRange::month(2023, 12).unwrap();
        assert_eq!(dec.end, d(2023, 12, 31));

        assert!(DateRange::month(2024, 13).is_err());
    }

    #[test]
    fn test_midpoint_and_contains() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(range.midpoint(), d(2024, 1, 16));
        assert!(range.contains(d(2024, 1, 1)));
        assert!(range.contains(d(2024, 1, 31)));
        assert!(!range.contains(d(2024, 2, 1)));
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(d(2024, 3, 9)), "2024-03");
    }
}
