mod common;

use common::date;
use regex::Regex;
use spendwise_core::{
    config::Config,
    core::{
        services::{
            CategoryCreate, CategoryService, ExpenseCreate, ExpenseService, ReportService,
            ReportSettingsUpdate, SettingsService,
        },
        time::FixedClock,
    },
    domain::Book,
    notify::ReportComposer,
    recurrence::{Frequency, YearMonth},
    report::{render_category_calendar, render_monthly_analysis, RenderContext},
};

fn book_with_rent() -> (Book, uuid::Uuid) {
    let clock = FixedClock::on(date(2024, 1, 1));
    let mut book = Book::new("home", clock.0);
    let rent = CategoryService::create(
        &mut book,
        CategoryCreate::new("Rent & <Utilities>", Frequency::Monthly).with_fixed_amount(500.0),
        &clock,
    )
    .unwrap();
    ExpenseService::add(
        &mut book,
        ExpenseCreate::new(500.0).in_category(rent).on(date(2024, 9, 1)),
        &clock,
    )
    .unwrap();
    (book, rent)
}

#[test]
fn calendar_is_a_seven_column_grid() {
    let (book, rent) = book_with_rent();
    // September 2024 starts on a Sunday and has 30 days.
    let month = YearMonth::new(2024, 9).unwrap();
    let report = ReportService::category_calendar(&book, rent, month, date(2024, 9, 15)).unwrap();
    let html = render_category_calendar(&report, &RenderContext::new("₹", "Asha"));

    let body = Regex::new(r"(?s)<tbody>(.*)</tbody>").unwrap();
    let rows = Regex::new(r"(?s)<tr>(.*?)</tr>").unwrap();
    let cells = Regex::new(r"<td[ >]").unwrap();
    let tbody = &body.captures(&html).expect("calendar body")[1];
    let weeks: Vec<&str> = rows.captures_iter(tbody).map(|c| c.get(1).unwrap().as_str()).collect();
    assert_eq!(weeks.len(), 5);
    for week in &weeks {
        assert_eq!(cells.find_iter(week).count(), 7);
    }

    let ordered = Regex::new(r#"class="day ordered""#).unwrap();
    let no_plan = Regex::new(r#"class="day no-plan""#).unwrap();
    assert_eq!(ordered.find_iter(&html).count(), 1);
    assert_eq!(no_plan.find_iter(&html).count(), 29);
    assert!(weeks[0].starts_with(r#"<td class="day ordered""#));
    assert!(html.contains("Rent &amp; &lt;Utilities&gt;"));
    assert!(html.contains("Hello Asha,"));
    assert!(html.contains(r#"<div class="badge""#));
}

#[test]
fn analysis_links_to_the_download_endpoint() {
    let (book, _) = book_with_rent();
    let month = YearMonth::new(2024, 9).unwrap();
    let breakdown = ReportService::monthly_analysis(&book, month);
    let ctx = RenderContext::new("$", "Sam").with_app_url("https://spend.example/");
    let html = render_monthly_analysis(month, &breakdown, &ctx);

    assert!(html.contains("https://spend.example/api/reports/download?month=2024-09"));
    let entries = Regex::new(r#"<tr class="entry">"#).unwrap();
    assert_eq!(entries.find_iter(&html).count(), 1);
    assert!(html.contains("$500.00"));
    assert!(html.contains("100.0%"));
}

#[test]
fn composed_messages_carry_sender_and_subject() {
    let (mut book, rent) = book_with_rent();
    let clock = FixedClock::on(date(2024, 9, 2));
    SettingsService::update(
        &mut book,
        ReportSettingsUpdate {
            email: Some(Some("asha@example.com".into())),
            ..ReportSettingsUpdate::default()
        },
        &clock,
    )
    .unwrap();
    let config = Config::default();
    let month = YearMonth::new(2024, 9).unwrap();
    let report = ReportService::category_calendar(&book, rent, month, clock.0.date_naive()).unwrap();

    let message = ReportComposer::new(&config, &book.settings)
        .category_calendar(&report)
        .unwrap();
    assert_eq!(message.to, "asha@example.com");
    assert_eq!(message.from, "\"SpendWise Reports\" <reports@spendwise.local>");
    assert_eq!(
        message.subject,
        "SpendWise Category Report: Rent & <Utilities> (Sep 2024)"
    );
    assert!(message.html.contains("Hello asha,"));
}
