mod common;

use common::date;
use spendwise_core::{
    core::{
        services::{
            CategoryCreate, CategoryService, CategoryUpdate, ExpenseCreate, ExpenseService,
            ReportService, ReportSettingsUpdate, ServiceError, SettingsService,
        },
        time::FixedClock,
    },
    domain::{Book, ReportFrequency},
    recurrence::{Frequency, YearMonth},
};

fn seeded_book() -> (Book, FixedClock) {
    let clock = FixedClock::on(date(2024, 5, 1));
    let mut book = Book::new("flow", clock.0);
    let rent = CategoryService::create(
        &mut book,
        CategoryCreate::new("Rent", Frequency::Monthly).with_fixed_amount(900.0),
        &clock,
    )
    .unwrap();
    let food = CategoryService::create(
        &mut book,
        CategoryCreate::new("Food", Frequency::Daily),
        &clock,
    )
    .unwrap();
    for (amount, category, day) in [
        (900.0, Some(rent), date(2024, 5, 1)),
        (40.0, Some(food), date(2024, 5, 3)),
        (60.0, Some(food), date(2024, 5, 20)),
        (25.0, None, date(2024, 5, 21)),
        (15.0, Some(food), date(2024, 6, 2)),
    ] {
        let mut input = ExpenseCreate::new(amount).on(day);
        if let Some(id) = category {
            input = input.in_category(id);
        }
        ExpenseService::add(&mut book, input, &clock).unwrap();
    }
    (book, clock)
}

#[test]
fn monthly_analysis_groups_and_ranks_categories() {
    let (book, _) = seeded_book();
    let breakdown = ReportService::monthly_analysis(&book, YearMonth::new(2024, 5).unwrap());

    assert_eq!(breakdown.transaction_count, 4);
    assert_eq!(breakdown.total, 1025.0);
    let names: Vec<&str> = breakdown.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Rent", "Food", "Uncategorized"]);
    assert_eq!(breakdown.highest_category, "Rent");
    let share: f64 = breakdown.entries.iter().map(|e| e.percentage).sum();
    assert!((share - 100.0).abs() < 1e-9);
}

#[test]
fn empty_month_reports_none_as_highest() {
    let (book, _) = seeded_book();
    let breakdown = ReportService::monthly_analysis(&book, YearMonth::new(2023, 1).unwrap());
    assert!(breakdown.is_empty());
    assert_eq!(breakdown.highest_category, "None");
    assert_eq!(breakdown.total, 0.0);
}

#[test]
fn digest_is_due_only_on_report_day_and_skips_muted_categories() {
    let (mut book, clock) = seeded_book();
    SettingsService::update(
        &mut book,
        ReportSettingsUpdate {
            email: Some(Some("me@example.com".into())),
            frequency: Some(ReportFrequency::Monthly),
            report_day: Some(1),
            ..ReportSettingsUpdate::default()
        },
        &clock,
    )
    .unwrap();

    let due = date(2024, 6, 1);
    let digest = ReportService::due_digest(&book, due).expect("digest due on the 1st");
    assert_eq!(digest.frequency, ReportFrequency::Monthly);
    assert_eq!(digest.breakdown.transaction_count, 3);
    assert_eq!(digest.breakdown.total, 1000.0);

    assert!(ReportService::due_digest(&book, date(2024, 6, 2)).is_none());

    let rent = CategoryService::find(&book, "rent").unwrap().id;
    let food = CategoryService::find(&book, "food").unwrap().id;
    for id in [rent, food] {
        CategoryService::update(
            &mut book,
            id,
            CategoryUpdate {
                is_email_enabled: Some(false),
                ..CategoryUpdate::default()
            },
            &clock,
        )
        .unwrap();
    }
    assert!(ReportService::due_digest(&book, due).is_none());
}

#[test]
fn removing_a_category_removes_its_expenses() {
    let (mut book, clock) = seeded_book();
    let food = CategoryService::find(&book, "Food").unwrap().id;
    let removed = CategoryService::remove(&mut book, food, &clock).unwrap();
    assert_eq!(removed, 3);
    assert_eq!(book.expenses.len(), 2);
    assert!(matches!(
        ExpenseService::add(&mut book, ExpenseCreate::new(5.0).in_category(food), &clock),
        Err(ServiceError::CategoryNotFound(id)) if id == food
    ));
}

#[test]
fn invalid_report_day_is_rejected_without_changes() {
    let (mut book, clock) = seeded_book();
    let before = book.settings.clone();
    let result = SettingsService::update(
        &mut book,
        ReportSettingsUpdate {
            frequency: Some(ReportFrequency::Weekly),
            report_day: Some(9),
            ..ReportSettingsUpdate::default()
        },
        &clock,
    );
    assert!(matches!(result, Err(ServiceError::Invalid(_))));
    assert_eq!(book.settings, before);
}
