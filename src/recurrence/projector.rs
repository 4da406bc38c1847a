use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use super::{
    evaluator::is_expected_occurrence,
    month::YearMonth,
    rule::RecurrenceRule,
    stamp::{DateStampError, Dated},
};

/// User-facing classification of a projected day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrenceLabel {
    Ordered,
    Skipped,
    Planned,
    NoPlan,
}

impl OccurrenceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccurrenceLabel::Ordered => "Ordered",
            OccurrenceLabel::Skipped => "Skipped",
            OccurrenceLabel::Planned => "Planned",
            OccurrenceLabel::NoPlan => "No plan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OccurrenceDay {
    pub date: NaiveDate,
    pub expected: bool,
    pub recorded: bool,
    pub is_future: bool,
}

impl OccurrenceDay {
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn label(&self) -> OccurrenceLabel {
        match (self.recorded, self.expected, self.is_future) {
            (true, _, _) => OccurrenceLabel::Ordered,
            (false, true, false) => OccurrenceLabel::Skipped,
            (false, true, true) => OccurrenceLabel::Planned,
            (false, false, _) => OccurrenceLabel::NoPlan,
        }
    }
}

/// A transaction that could not be placed on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTransaction {
    /// Position in the slice handed to [`project_month`].
    pub index: usize,
    pub error: DateStampError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthProjection {
    pub month: YearMonth,
    pub days: Vec<OccurrenceDay>,
    pub rejected: Vec<RejectedTransaction>,
}

impl MonthProjection {
    pub fn count(&self, label: OccurrenceLabel) -> usize {
        self.days.iter().filter(|day| day.label() == label).count()
    }

    pub fn expected_count(&self) -> usize {
        self.days.iter().filter(|day| day.expected).count()
    }

    pub fn recorded_count(&self) -> usize {
        self.days.iter().filter(|day| day.recorded).count()
    }
}

/// Classifies every day of `month` against `rule` and the recorded
/// transactions. Days strictly after `now` are future; today is not.
///
/// `transactions` are expected to belong to the rule's category already.
/// Entries whose date cannot be read are left out of matching and returned in
/// [`MonthProjection::rejected`].
pub fn project_month<T: Dated>(
    rule: &RecurrenceRule,
    transactions: &[T],
    month: YearMonth,
    now: NaiveDate,
) -> MonthProjection {
    let mut recorded_days = BTreeSet::new();
    let mut rejected = Vec::new();
    for (index, transaction) in transactions.iter().enumerate() {
        match transaction.calendar_day() {
            Ok(day) if month.contains(day) => {
                recorded_days.insert(day);
            }
            Ok(_) => {}
            Err(error) => {
                warn!(index, %error, "skipping transaction with unreadable date");
                rejected.push(RejectedTransaction { index, error });
            }
        }
    }

    let days: Vec<OccurrenceDay> = month
        .days()
        .map(|date| OccurrenceDay {
            date,
            expected: is_expected_occurrence(rule, date),
            recorded: recorded_days.contains(&date),
            is_future: date > now,
        })
        .collect();

    debug!(
        month = %month,
        frequency = %rule.frequency(),
        days = days.len(),
        recorded = recorded_days.len(),
        rejected = rejected.len(),
        "projected month"
    );

    MonthProjection {
        month,
        days,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{rule::Frequency, stamp::DateStamp};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly_on(anchor: NaiveDate) -> RecurrenceRule {
        RecurrenceRule::builder(Frequency::Monthly)
            .anchor(anchor)
            .build()
            .unwrap()
    }

    #[test]
    fn labels_follow_truth_table() {
        let cases = [
            ((true, true, false), OccurrenceLabel::Ordered),
            ((true, false, true), OccurrenceLabel::Ordered),
            ((false, true, false), OccurrenceLabel::Skipped),
            ((false, true, true), OccurrenceLabel::Planned),
            ((false, false, false), OccurrenceLabel::NoPlan),
            ((false, false, true), OccurrenceLabel::NoPlan),
        ];
        for ((recorded, expected, is_future), label) in cases {
            let day = OccurrenceDay {
                date: date(2024, 1, 1),
                expected,
                recorded,
                is_future,
            };
            assert_eq!(day.label(), label);
        }
    }

    #[test]
    fn timestamps_match_their_calendar_day() {
        let rule = monthly_on(date(2024, 1, 10));
        let stamps = vec![
            DateStamp::from_raw("2024-04-10T21:45:00"),
            DateStamp::from_raw("2024-05-10"),
        ];
        let month = YearMonth::new(2024, 4).unwrap();
        let projection = project_month(&rule, &stamps, month, date(2024, 4, 30));
        let recorded: Vec<u32> = projection
            .days
            .iter()
            .filter(|day| day.recorded)
            .map(OccurrenceDay::day)
            .collect();
        assert_eq!(recorded, vec![10]);
        assert!(projection.rejected.is_empty());
    }

    #[test]
    fn unreadable_dates_are_reported() {
        let rule = monthly_on(date(2024, 1, 10));
        let stamps = vec![
            DateStamp::from_raw("2024-04-02"),
            DateStamp::from_raw("not a date"),
        ];
        let month = YearMonth::new(2024, 4).unwrap();
        let projection = project_month(&rule, &stamps, month, date(2024, 4, 30));
        assert_eq!(projection.rejected.len(), 1);
        assert_eq!(projection.rejected[0].index, 1);
        assert_eq!(projection.recorded_count(), 1);
    }

    #[test]
    fn today_is_not_future() {
        let rule = monthly_on(date(2024, 1, 10));
        let month = YearMonth::new(2024, 4).unwrap();
        let projection = project_month::<NaiveDate>(&rule, &[], month, date(2024, 4, 10));
        assert_eq!(projection.days[9].label(), OccurrenceLabel::Skipped);
        assert!(projection.days[10].is_future);
    }
}
