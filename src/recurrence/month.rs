use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearMonthError {
    #[error("invalid month `{0}` (expected YYYY-MM)")]
    Parse(String),
    #[error("month {month} of year {year} is out of range")]
    OutOfRange { year: i32, month: u32 },
}

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, YearMonthError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or(YearMonthError::OutOfRange { year, month })
    }

    /// The month that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(i64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first + Duration::days(i64::from(self.days_in_month()) - 1)
    }

    pub fn days_in_month(&self) -> u32 {
        let (year, month) = (self.year(), self.month());
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .map(|next| (next - self.first).num_days() as u32)
            .unwrap_or(31)
    }

    /// Every day of the month in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take(self.days_in_month() as usize)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub fn next(&self) -> Option<Self> {
        self.last_day().succ_opt().map(Self::containing)
    }

    pub fn previous(&self) -> Option<Self> {
        self.first.pred_opt().map(Self::containing)
    }

    /// Number of blank cells before day 1 in a Sunday-first week grid.
    pub fn leading_offset(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// `March 2024`
    pub fn long_label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    /// `Mar 2024`
    pub fn short_label(&self) -> String {
        self.first.format("%b %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(|first| Self { first })
            .map_err(|_| YearMonthError::Parse(trimmed.to_string()))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = YearMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}
