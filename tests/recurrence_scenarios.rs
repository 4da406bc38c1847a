mod common;

use chrono::Datelike;
use common::date;
use spendwise_core::{
    core::{
        services::{CategoryCreate, CategoryService, ExpenseCreate, ExpenseService, ReportService},
        time::{Clock, FixedClock},
    },
    domain::Book,
    recurrence::{project_month, DateStamp, Frequency, OccurrenceLabel, YearMonth},
};

#[test]
fn monthly_rent_paid_on_the_first() {
    let created = FixedClock::on(date(2024, 1, 1));
    let mut book = Book::new("home", created.0);
    let rent = CategoryService::create(
        &mut book,
        CategoryCreate::new("Rent", Frequency::Monthly).with_fixed_amount(500.0),
        &created,
    )
    .unwrap();
    ExpenseService::add(
        &mut book,
        ExpenseCreate::new(500.0).in_category(rent).on(date(2024, 3, 1)),
        &FixedClock::on(date(2024, 3, 1)),
    )
    .unwrap();

    let month = YearMonth::new(2024, 3).unwrap();
    let report = ReportService::category_calendar(&book, rent, month, date(2024, 3, 20)).unwrap();
    let days = &report.projection.days;

    assert_eq!(days.len(), 31);
    assert!(days[0].expected && days[0].recorded);
    assert_eq!(days[0].label(), OccurrenceLabel::Ordered);
    assert!(days[1..].iter().all(|day| !day.expected && !day.recorded));
    assert_eq!(report.total, 500.0);
    assert_eq!(report.fixed_amount(), Some(500.0));
}

#[test]
fn weekly_sundays_without_payments_are_skipped_until_today() {
    let now = date(2024, 6, 23);
    let anchor = date(2024, 6, 2);
    assert_eq!(anchor.weekday(), chrono::Weekday::Sun);

    let mut book = Book::new("home", FixedClock::on(anchor).0);
    let cleaning = CategoryService::create(
        &mut book,
        CategoryCreate::new("Cleaning", Frequency::Weekly),
        &FixedClock::on(anchor),
    )
    .unwrap();

    let month = YearMonth::new(2024, 6).unwrap();
    let report = ReportService::category_calendar(&book, cleaning, month, now).unwrap();

    for day in &report.projection.days {
        let is_sunday = day.date.weekday() == chrono::Weekday::Sun;
        let expected_label = match (is_sunday, day.date > now) {
            (true, false) => OccurrenceLabel::Skipped,
            (true, true) => OccurrenceLabel::Planned,
            (false, _) => OccurrenceLabel::NoPlan,
        };
        assert_eq!(day.label(), expected_label, "{}", day.date);
    }
    assert_eq!(report.projection.count(OccurrenceLabel::Skipped), 4);
    assert_eq!(report.projection.count(OccurrenceLabel::Planned), 1);
}

#[test]
fn toggling_a_skipped_day_marks_it_ordered_and_back() {
    let anchor = date(2024, 6, 2);
    let clock = FixedClock::on(date(2024, 6, 23));
    let mut book = Book::new("home", FixedClock::on(anchor).0);
    let gym = CategoryService::create(
        &mut book,
        CategoryCreate::new("Gym", Frequency::Weekly).with_fixed_amount(12.0),
        &FixedClock::on(anchor),
    )
    .unwrap();
    let month = YearMonth::new(2024, 6).unwrap();
    let label_on = |book: &Book, day: u32| {
        ReportService::category_calendar(book, gym, month, clock.today())
            .unwrap()
            .projection
            .days[day as usize - 1]
            .label()
    };

    assert_eq!(label_on(&book, 9), OccurrenceLabel::Skipped);
    ExpenseService::toggle_day(&mut book, gym, date(2024, 6, 9), &clock).unwrap();
    assert_eq!(label_on(&book, 9), OccurrenceLabel::Ordered);
    ExpenseService::toggle_day(&mut book, gym, date(2024, 6, 9), &clock).unwrap();
    assert_eq!(label_on(&book, 9), OccurrenceLabel::Skipped);
}

#[test]
fn timestamps_with_time_of_day_match_their_calendar_day() {
    let rule = spendwise_core::recurrence::RecurrenceRule::builder(Frequency::Daily)
        .anchor(date(2024, 1, 1))
        .build()
        .unwrap();
    let stamps = [
        DateStamp::from_raw("2024-02-10T23:15:00.000"),
        DateStamp::from_raw("not a date"),
    ];
    let month = YearMonth::new(2024, 2).unwrap();
    let projection = project_month(&rule, &stamps, month, date(2024, 2, 29));

    assert_eq!(projection.days.len(), 29);
    assert!(projection.days[9].recorded);
    assert_eq!(projection.recorded_count(), 1);
    assert_eq!(projection.rejected.len(), 1);
    assert_eq!(projection.rejected[0].index, 1);
    assert_eq!(projection, project_month(&rule, &stamps, month, date(2024, 2, 29)));
}
