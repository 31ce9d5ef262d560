//! Period filters: resolving `year` / `month` / `quarter` query parameters
//! into the set of month buckets a query should cover.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Query-string period filter shared by dashboard, data and export endpoints.
///
/// `month` takes precedence over `quarter`; without either the whole year
/// (or, without a year, all data) is covered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PeriodFilter {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub quarter: Option<i32>,
}

/// Resolved filter ready to bind into SQL: `None` means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodWindow {
    pub year: Option<i32>,
    pub months: Option<Vec<i32>>,
}

/// Years accepted in filters and stored records.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

/// Bucket size used when labelling records by period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Month,
    Quarter,
    Year,
}

/// The three months making up `quarter` (1-4), empty for anything else.
pub fn quarter_months(quarter: i32) -> Vec<i32> {
    match quarter {
        1..=4 => {
            let first = (quarter - 1) * 3 + 1;
            (first..first + 3).collect()
        }
        _ => Vec::new(),
    }
}

/// Quarter (1-4) a month belongs to.
pub fn quarter_of(month: i32) -> i32 {
    (month + 2) / 3
}

/// Stable label for the bucket containing `(year, month)`: `2024-03`, `2024-Q1` or `2024`.
pub fn period_key(year: i32, month: i32, granularity: Granularity) -> String {
    match granularity {
        Granularity::Month => format!("{year}-{month:02}"),
        Granularity::Quarter => format!("{year}-Q{}", quarter_of(month)),
        Granularity::Year => year.to_string(),
    }
}

impl PeriodFilter {
    /// Check ranges and resolve the filter into a bindable window.
    pub fn resolve(&self) -> Result<PeriodWindow, AppError> {
        if let Some(year) = self.year {
            if !YEAR_RANGE.contains(&year) {
                return Err(AppError::Validation(format!(
                    "year must be between {} and {}, got {year}",
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                )));
            }
        }
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(AppError::Validation(format!(
                    "month must be between 1 and 12, got {month}"
                )));
            }
        }
        if let Some(quarter) = self.quarter {
            if !(1..=4).contains(&quarter) {
                return Err(AppError::Validation(format!(
                    "quarter must be between 1 and 4, got {quarter}"
                )));
            }
        }

        let months = match (self.month, self.quarter) {
            (Some(month), _) => Some(vec![month]),
            (None, Some(quarter)) => Some(quarter_months(quarter)),
            (None, None) => None,
        };

        Ok(PeriodWindow {
            year: self.year,
            months,
        })
    }

    /// The window immediately before this one, of the same size.
    ///
    /// Month → previous month, quarter → previous quarter, year → previous
    /// year. Requires a year; an unrestricted filter has no predecessor, and
    /// neither does a window whose predecessor falls outside [`YEAR_RANGE`].
    pub fn previous(&self) -> Option<PeriodFilter> {
        let year = self.year?;
        let (year, month, quarter) = match (self.month, self.quarter) {
            (Some(1), _) => (year.checked_sub(1)?, Some(12), None),
            (Some(month), _) => (year, Some(month - 1), None),
            (None, Some(1)) => (year.checked_sub(1)?, None, Some(4)),
            (None, Some(quarter)) => (year, None, Some(quarter - 1)),
            (None, None) => (year.checked_sub(1)?, None, None),
        };
        if !YEAR_RANGE.contains(&year) {
            return None;
        }
        Some(PeriodFilter {
            year: Some(year),
            month,
            quarter,
        })
    }

    /// Human-readable label of the covered window.
    pub fn label(&self) -> String {
        match (self.year, self.month, self.quarter) {
            (Some(year), Some(month), _) => period_key(year, month, Granularity::Month),
            (Some(year), None, Some(quarter)) => {
                period_key(year, quarter * 3, Granularity::Quarter)
            }
            (Some(year), None, None) => period_key(year, 1, Granularity::Year),
            (None, Some(month), _) => format!("*-{month:02}"),
            (None, None, Some(quarter)) => format!("*-Q{quarter}"),
            (None, None, None) => "all".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(year: Option<i32>, month: Option<i32>, quarter: Option<i32>) -> PeriodFilter {
        PeriodFilter {
            year,
            month,
            quarter,
        }
    }

    #[test]
    fn quarter_expands_to_three_months() {
        assert_eq!(quarter_months(1), vec![1, 2, 3]);
        assert_eq!(quarter_months(2), vec![4, 5, 6]);
        assert_eq!(quarter_months(3), vec![7, 8, 9]);
        assert_eq!(quarter_months(4), vec![10, 11, 12]);
        assert!(quarter_months(5).is_empty());
    }

    #[test]
    fn month_takes_precedence_over_quarter() {
        let window = filter(Some(2024), Some(5), Some(1)).resolve().unwrap();
        assert_eq!(window.year, Some(2024));
        assert_eq!(window.months, Some(vec![5]));
    }

    #[test]
    fn quarter_without_month_resolves_to_its_months() {
        let window = filter(Some(2024), None, Some(3)).resolve().unwrap();
        assert_eq!(window.months, Some(vec![7, 8, 9]));
    }

    #[test]
    fn empty_filter_is_unrestricted() {
        let window = PeriodFilter::default().resolve().unwrap();
        assert_eq!(window, PeriodWindow::default());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(filter(Some(2024), Some(13), None).resolve().is_err());
        assert!(filter(Some(2024), Some(0), None).resolve().is_err());
        assert!(filter(Some(2024), None, Some(5)).resolve().is_err());
        assert!(filter(Some(-5), None, None).resolve().is_err());
        assert!(filter(Some(1999), Some(3), None).resolve().is_err());
        assert!(filter(Some(2101), None, None).resolve().is_err());
        assert!(filter(Some(2000), None, None).resolve().is_ok());
    }

    #[test]
    fn previous_period_never_leaves_the_year_range() {
        assert_eq!(filter(Some(i32::MIN), Some(1), None).previous(), None);
        assert_eq!(filter(Some(i32::MIN), None, Some(1)).previous(), None);
        assert_eq!(filter(Some(i32::MIN), None, None).previous(), None);
        assert_eq!(filter(Some(2000), Some(1), None).previous(), None);
        assert_eq!(
            filter(Some(2000), Some(2), None).previous(),
            Some(filter(Some(2000), Some(1), None))
        );
    }

    #[test]
    fn previous_period_wraps_year_boundaries() {
        assert_eq!(
            filter(Some(2024), Some(1), None).previous(),
            Some(filter(Some(2023), Some(12), None))
        );
        assert_eq!(
            filter(Some(2024), Some(7), None).previous(),
            Some(filter(Some(2024), Some(6), None))
        );
        assert_eq!(
            filter(Some(2024), None, Some(1)).previous(),
            Some(filter(Some(2023), None, Some(4)))
        );
        assert_eq!(
            filter(Some(2024), None, Some(3)).previous(),
            Some(filter(Some(2024), None, Some(2)))
        );
        assert_eq!(
            filter(Some(2024), None, None).previous(),
            Some(filter(Some(2023), None, None))
        );
        assert_eq!(filter(None, Some(3), None).previous(), None);
    }

    #[test]
    fn period_keys_by_granularity() {
        assert_eq!(period_key(2024, 3, Granularity::Month), "2024-03");
        assert_eq!(period_key(2024, 3, Granularity::Quarter), "2024-Q1");
        assert_eq!(period_key(2024, 10, Granularity::Quarter), "2024-Q4");
        assert_eq!(period_key(2024, 12, Granularity::Year), "2024");
    }

    #[test]
    fn labels() {
        assert_eq!(filter(Some(2024), Some(2), None).label(), "2024-02");
        assert_eq!(filter(Some(2024), None, Some(2)).label(), "2024-Q2");
        assert_eq!(filter(Some(2024), None, Some(4)).label(), "2024-Q4");
        assert_eq!(filter(Some(2024), None, None).label(), "2024");
        assert_eq!(filter(None, None, None).label(), "all");
    }
}
