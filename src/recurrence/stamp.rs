use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateStampError {
    #[error("unparseable date `{0}`")]
    Unparseable(String),
}

/// The date of a recorded expense exactly as it was stored.
///
/// Stored values are either plain `YYYY-MM-DD` dates or timestamps; the
/// calendar day is only derived when it is needed so bad records survive a
/// load and can be reported instead of aborting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateStamp(String);

impl DateStamp {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DATE_FORMAT).to_string())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339())
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// The calendar day this stamp falls on in the machine's local zone, the
    /// zone the system clock reads "today" in.
    pub fn calendar_day(&self) -> Result<NaiveDate, DateStampError> {
        self.resolve(|at| at.with_timezone(&Local).date_naive())
    }

    /// The calendar day this stamp falls on at `offset`. Plain dates and
    /// timestamps without an offset are taken as already local.
    pub fn calendar_day_in(&self, offset: FixedOffset) -> Result<NaiveDate, DateStampError> {
        self.resolve(|at| at.with_timezone(&offset).date_naive())
    }

    fn resolve(
        &self,
        localize: impl FnOnce(DateTime<FixedOffset>) -> NaiveDate,
    ) -> Result<NaiveDate, DateStampError> {
        let raw = self.0.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Ok(date);
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Ok(localize(at));
        }
        NAIVE_TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|at| at.date())
            .ok_or_else(|| DateStampError::Unparseable(self.0.clone()))
    }
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NaiveDate> for DateStamp {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

/// Anything that can be placed on a calendar day.
pub trait Dated {
    fn calendar_day(&self) -> Result<NaiveDate, DateStampError>;
}

impl Dated for NaiveDate {
    fn calendar_day(&self) -> Result<NaiveDate, DateStampError> {
        Ok(*self)
    }
}

impl Dated for NaiveDateTime {
    fn calendar_day(&self) -> Result<NaiveDate, DateStampError> {
        Ok(self.date())
    }
}

impl Dated for DateStamp {
    fn calendar_day(&self) -> Result<NaiveDate, DateStampError> {
        DateStamp::calendar_day(self)
    }
}

impl<T: Dated + ?Sized> Dated for &T {
    fn calendar_day(&self) -> Result<NaiveDate, DateStampError> {
        (**self).calendar_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Offset;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_dates_and_timestamps() {
        let utc = Utc.fix();
        let cases = [
            ("2024-03-01", day(2024, 3, 1)),
            ("2024-03-01T23:30:00Z", day(2024, 3, 1)),
            ("2024-03-01T23:30:00-05:00", day(2024, 3, 2)),
            ("2024-03-01T08:15:00.250", day(2024, 3, 1)),
            ("2024-03-01 08:15:00", day(2024, 3, 1)),
            ("2024-03-01T08:15", day(2024, 3, 1)),
        ];
        for (raw, expected) in cases {
            assert_eq!(DateStamp::from_raw(raw).calendar_day_in(utc), Ok(expected), "{raw}");
        }
    }

    #[test]
    fn offset_timestamps_move_to_the_requested_zone() {
        let stamp = DateStamp::from_raw("2024-06-09T20:00:00Z");
        let ist = FixedOffset::east_opt(19_800).unwrap();
        let pacific = FixedOffset::west_opt(7 * 3600).unwrap();
        assert_eq!(stamp.calendar_day_in(ist), Ok(day(2024, 6, 10)));
        assert_eq!(stamp.calendar_day_in(pacific), Ok(day(2024, 6, 9)));

        // Plain dates never shift.
        let plain = DateStamp::from_date(day(2024, 6, 9));
        assert_eq!(plain.calendar_day_in(ist), Ok(day(2024, 6, 9)));
    }

    #[test]
    fn local_day_matches_local_conversion() {
        let raw = "2024-06-09T20:00:00Z";
        let expected = DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(DateStamp::from_raw(raw).calendar_day(), Ok(expected));
    }

    #[test]
    fn rejects_garbage() {
        let stamp = DateStamp::from_raw("first of March");
        assert_eq!(
            stamp.calendar_day(),
            Err(DateStampError::Unparseable("first of March".into()))
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let stamp = DateStamp::from_date(day(2024, 7, 9));
        assert_eq!(serde_json::to_string(&stamp).unwrap(), "\"2024-07-09\"");
    }
}
