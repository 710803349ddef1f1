//! Time-of-day and weekday primitives.
//!
//! The store keeps times as fixed-width `HH:mm` strings and weekdays in the
//! dashboard's 2..=8 numbering (Monday=2 .. Sunday=8). Both are validated
//! once at the store boundary; everything past that point holds well-formed
//! values.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// A time of day as a fixed-width `HH:mm` string.
///
/// Width is constant, so the derived lexical ordering is chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(String);

impl ClockTime {
    pub fn parse(s: &str) -> ScheduleResult<Self> {
        let b = s.as_bytes();
        let well_formed = b.len() == 5
            && b[2] == b':'
            && b[0].is_ascii_digit()
            && b[1].is_ascii_digit()
            && b[3].is_ascii_digit()
            && b[4].is_ascii_digit();
        if !well_formed {
            return Err(ScheduleError::InvalidTime(s.to_string()));
        }
        let hour = (b[0] - b'0') * 10 + (b[1] - b'0');
        let minute = (b[3] - b'0') * 10 + (b[4] - b'0');
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTime(s.to_string()));
        }
        Ok(ClockTime(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn hour(&self) -> u8 {
        let b = self.0.as_bytes();
        (b[0] - b'0') * 10 + (b[1] - b'0')
    }

    pub fn minute(&self) -> u8 {
        let b = self.0.as_bytes();
        (b[3] - b'0') * 10 + (b[4] - b'0')
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ScheduleError;

    fn try_from(s: String) -> ScheduleResult<Self> {
        ClockTime::parse(&s)
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> String {
        t.0
    }
}

/// A weekday in the store's 2..=8 numbering (Monday=2 .. Sunday=8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub fn new(n: u8) -> ScheduleResult<Self> {
        if (2..=8).contains(&n) {
            Ok(DayOfWeek(n))
        } else {
            Err(ScheduleError::InvalidDayOfWeek(n))
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        // number_from_monday is 1..=7, the store numbering is one above
        DayOfWeek(date.weekday().number_from_monday() as u8 + 1)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn weekday(self) -> Weekday {
        match self.0 {
            2 => Weekday::Mon,
            3 => Weekday::Tue,
            4 => Weekday::Wed,
            5 => Weekday::Thu,
            6 => Weekday::Fri,
            7 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    /// Signed day delta from `self` to `target` within one week (-6..=6).
    pub fn days_until(self, target: DayOfWeek) -> i64 {
        target.0 as i64 - self.0 as i64
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.weekday())
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = ScheduleError;

    fn try_from(n: u8) -> ScheduleResult<Self> {
        DayOfWeek::new(n)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(d: DayOfWeek) -> u8 {
        d.0
    }
}
