//! Date range for resolving occurrences.

use chrono::{Days, NaiveDate};

/// Inclusive date range the resolver walks day by day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange { from, to }
    }

    pub fn single(date: NaiveDate) -> Self {
        DateRange {
            from: date,
            to: date,
        }
    }

    /// The seven days starting at `monday` (the visible calendar week).
    pub fn week_of(monday: NaiveDate) -> Self {
        DateRange {
            from: monday,
            to: monday + Days::new(6),
        }
    }

    /// `days` days starting at `from` (session sync horizon).
    pub fn horizon(from: NaiveDate, days: u64) -> Self {
        DateRange {
            from,
            to: from + Days::new(days),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let to = self.to;
        self.from.iter_days().take_while(move |d| *d <= to)
    }
}
