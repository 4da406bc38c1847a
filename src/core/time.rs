use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};

/// Source of "now" for services, so recurrence checks never read the system
/// clock directly.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Offset of the user's zone; calendar days are taken in it.
    fn offset(&self) -> FixedOffset {
        Utc.fix()
    }

    /// The calendar day `at` falls on in the user's zone.
    fn local_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset()).date_naive()
    }

    /// The current local calendar day.
    fn today(&self) -> NaiveDate {
        self.local_day(self.now())
    }
}

/// Reads the system time and the machine's local zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

/// A clock pinned to one instant, seen from a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>, pub FixedOffset);

impl FixedClock {
    /// Noon UTC on `day`, read in UTC.
    pub fn on(day: NaiveDate) -> Self {
        Self::at(day.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self(now, Utc.fix())
    }

    pub fn in_offset(self, offset: FixedOffset) -> Self {
        Self(self.0, offset)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }

    fn offset(&self) -> FixedOffset {
        self.1
    }
}
