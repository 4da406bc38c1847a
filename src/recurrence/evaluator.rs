use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use super::rule::{Frequency, RecurrenceRule};

/// Decides whether `candidate` is a day on which `rule` expects an expense.
///
/// Interval phases are measured as the absolute distance from the anchor, so
/// days before the anchor can match as well.
pub fn is_expected_occurrence(rule: &RecurrenceRule, candidate: NaiveDate) -> bool {
    let anchor = rule.anchor_date();
    let interval = rule.interval_count();
    match rule.frequency() {
        Frequency::Daily => true,
        Frequency::Weekdays => !matches!(candidate.weekday(), Weekday::Sat | Weekday::Sun),
        Frequency::Weekly => {
            candidate.weekday() == anchor.weekday()
                && weeks_between(candidate, anchor).unsigned_abs() % u64::from(interval) == 0
        }
        Frequency::Monthly => {
            candidate.day() == anchor.day()
                && months_between(candidate, anchor).unsigned_abs() % interval == 0
        }
        Frequency::Custom => {
            rule.includes_weekday(candidate.weekday())
                && months_between(candidate, anchor).unsigned_abs() % interval == 0
        }
    }
}

/// Whole weeks from `earlier` to `later`, truncated toward zero.
pub fn weeks_between(later: NaiveDate, earlier: NaiveDate) -> i64 {
    (later - earlier).num_days() / 7
}

/// Whole months from `base` to `date`, truncated toward zero.
///
/// A month counts once the day-of-month has been reached again, so 15 Jan to
/// 14 Mar is one month and 15 Jan to 15 Mar is two. Month ends follow the
/// usual calendar-library rules:
/// - a late-February day completes the month (31 Jan to 29 Feb is one)
/// - the last day of a month completes a single month (31 Mar to 30 Apr)
pub fn months_between(date: NaiveDate, base: NaiveDate) -> i32 {
    let calendar =
        (date.year() - base.year()) * 12 + date.month() as i32 - base.month() as i32;
    if calendar == 0 {
        return 0;
    }
    let sign = calendar.signum();
    let partial = match shift_months_back(date, calendar) {
        Some(shifted) if sign > 0 => {
            shifted < base && !(calendar == 1 && is_last_day_of_month(date))
        }
        Some(shifted) => shifted > base,
        None => false,
    };
    if partial {
        calendar - sign
    } else {
        calendar
    }
}

/// Moves `date` back by `months`, letting an out-of-range day roll into the
/// following month instead of clamping. Late-February days are first moved to
/// the "30th", which lands on 1 or 2 March.
fn shift_months_back(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let start = if date.month() == 2 && date.day() > 27 {
        date.with_day(1)? + Duration::days(29)
    } else {
        date
    };
    let first = start.with_day(1)?;
    let target = if months > 0 {
        first.checked_sub_months(Months::new(months.unsigned_abs()))?
    } else {
        first.checked_add_months(Months::new(months.unsigned_abs()))?
    };
    target.checked_add_signed(Duration::days(i64::from(start.day()) - 1))
}

fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule(frequency: Frequency, interval: u32, days: &[u8], anchor: NaiveDate) -> RecurrenceRule {
        RecurrenceRule::builder(frequency)
            .interval(interval)
            .specific_days(days.iter().copied())
            .anchor(anchor)
            .build()
            .unwrap()
    }

    #[test]
    fn daily_matches_every_day() {
        let rule = rule(Frequency::Daily, 1, &[], date(2024, 5, 10));
        for day in date(2023, 12, 1).iter_days().take(120) {
            assert!(is_expected_occurrence(&rule, day), "{day}");
        }
    }

    #[test]
    fn weekdays_ignore_specific_days() {
        // The builder drops the day set, so a Sunday-only list has no effect.
        let rule = rule(Frequency::Weekdays, 1, &[0], date(2024, 5, 10));
        for day in date(2024, 6, 1).iter_days().take(14) {
            let expected = !matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
            assert_eq!(is_expected_occurrence(&rule, day), expected, "{day}");
        }
    }

    #[test]
    fn biweekly_alternates_from_anchor_monday() {
        let anchor = date(2024, 3, 4);
        let rule = rule(Frequency::Weekly, 2, &[], anchor);
        for week in 0..8i64 {
            let monday = anchor + chrono::Duration::weeks(week);
            assert_eq!(is_expected_occurrence(&rule, monday), week % 2 == 0, "week {week}");
            for offset in 1..7 {
                let other = monday + chrono::Duration::days(offset);
                assert!(!is_expected_occurrence(&rule, other), "{other}");
            }
        }
    }

    #[test]
    fn weekly_matches_before_anchor_too() {
        let anchor = date(2024, 3, 4);
        let rule = rule(Frequency::Weekly, 2, &[], anchor);
        assert!(is_expected_occurrence(&rule, date(2024, 2, 19)));
        assert!(!is_expected_occurrence(&rule, date(2024, 2, 26)));
    }

    #[test]
    fn monthly_matches_same_day_of_month() {
        let rule = rule(Frequency::Monthly, 1, &[], date(2024, 1, 15));
        for month in 1..=12 {
            assert!(is_expected_occurrence(&rule, date(2024, month, 15)));
            assert!(!is_expected_occurrence(&rule, date(2024, month, 14)));
        }
    }

    #[test]
    fn monthly_interval_skips_months() {
        let rule = rule(Frequency::Monthly, 3, &[], date(2024, 1, 15));
        assert!(is_expected_occurrence(&rule, date(2024, 4, 15)));
        assert!(!is_expected_occurrence(&rule, date(2024, 5, 15)));
        assert!(is_expected_occurrence(&rule, date(2023, 10, 15)));
    }

    #[test]
    fn monthly_anchor_on_31st_skips_short_months() {
        let rule = rule(Frequency::Monthly, 1, &[], date(2024, 1, 31));
        for day in date(2024, 2, 1).iter_days().take(29) {
            assert!(!is_expected_occurrence(&rule, day), "{day}");
        }
        assert!(is_expected_occurrence(&rule, date(2024, 3, 31)));
    }

    #[test]
    fn custom_matches_selected_weekdays() {
        let rule = rule(Frequency::Custom, 1, &[1, 3], date(2024, 5, 1));
        for day in date(2024, 5, 1).iter_days().take(31) {
            let expected = matches!(day.weekday(), Weekday::Mon | Weekday::Wed);
            assert_eq!(is_expected_occurrence(&rule, day), expected, "{day}");
        }
    }

    #[test]
    fn custom_interval_uses_whole_months() {
        // Anchor 15 May: 13 June is still "0 months" away, 17 June is one.
        let rule = rule(Frequency::Custom, 2, &[1, 4], date(2024, 5, 15));
        assert!(is_expected_occurrence(&rule, date(2024, 6, 13)));
        assert!(!is_expected_occurrence(&rule, date(2024, 6, 17)));
    }

    #[test]
    fn custom_without_days_never_matches() {
        let rule = rule(Frequency::Custom, 1, &[], date(2024, 5, 1));
        assert!(date(2024, 5, 1)
            .iter_days()
            .take(31)
            .all(|day| !is_expected_occurrence(&rule, day)));
    }

    #[test]
    fn month_difference_truncates() {
        assert_eq!(months_between(date(2024, 3, 14), date(2024, 1, 15)), 1);
        assert_eq!(months_between(date(2024, 3, 15), date(2024, 1, 15)), 2);
        assert_eq!(months_between(date(2024, 1, 15), date(2024, 3, 14)), -1);
        assert_eq!(months_between(date(2025, 1, 1), date(2024, 12, 31)), 0);
    }

    #[test]
    fn month_ends_complete_the_month() {
        assert_eq!(months_between(date(2024, 2, 29), date(2024, 1, 31)), 1);
        assert_eq!(months_between(date(2023, 2, 28), date(2023, 1, 31)), 1);
        assert_eq!(months_between(date(2024, 4, 30), date(2024, 3, 31)), 1);
        assert_eq!(months_between(date(2024, 6, 30), date(2024, 3, 31)), 2);
        assert_eq!(months_between(date(2024, 1, 31), date(2024, 2, 29)), 0);
    }

    #[test]
    fn custom_interval_counts_late_february_as_a_full_month() {
        // Anchor Wed 31 Jan, Thursdays every other month: Thu 29 Feb is month 1.
        let rule = rule(Frequency::Custom, 2, &[4], date(2024, 1, 31));
        assert!(!is_expected_occurrence(&rule, date(2024, 2, 29)));
        assert!(is_expected_occurrence(&rule, date(2024, 2, 22)));
        assert!(is_expected_occurrence(&rule, date(2024, 4, 4)));
    }

    #[test]
    fn week_difference_truncates() {
        assert_eq!(weeks_between(date(2024, 3, 17), date(2024, 3, 4)), 1);
        assert_eq!(weeks_between(date(2024, 3, 18), date(2024, 3, 4)), 2);
        assert_eq!(weeks_between(date(2024, 2, 20), date(2024, 3, 4)), -1);
    }
}
