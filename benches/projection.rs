use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spendwise_core::recurrence::{
    is_expected_occurrence, project_month, DateStamp, Frequency, RecurrenceRule, YearMonth,
};
use spendwise_core::storage::json_backend::{load_book_from_path, save_book_to_path};
use spendwise_core::{
    core::{
        services::{CategoryCreate, CategoryService, ExpenseCreate, ExpenseService},
        time::FixedClock,
    },
    domain::Book,
};
use tempfile::tempdir;

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 6).unwrap()
}

fn sample_stamps(count: usize) -> Vec<DateStamp> {
    (0..count)
        .map(|idx| {
            let day = anchor() + Duration::days((idx % 1_800) as i64);
            if idx % 4 == 0 {
                DateStamp::from_raw(format!("{day}T09:30:00.000Z"))
            } else {
                DateStamp::from_date(day)
            }
        })
        .collect()
}

fn bench_evaluator(c: &mut Criterion) {
    let rule = RecurrenceRule::builder(Frequency::Custom)
        .interval(2)
        .specific_days([1, 3, 5])
        .anchor(anchor())
        .build()
        .unwrap();
    let days: Vec<NaiveDate> = (0..3_650).map(|n| anchor() + Duration::days(n)).collect();

    c.bench_function("evaluate_custom_10y", |b| {
        b.iter(|| {
            days.iter()
                .filter(|day| is_expected_occurrence(&rule, black_box(**day)))
                .count()
        })
    });
}

fn bench_projection(c: &mut Criterion) {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .interval(2)
        .anchor(anchor())
        .build()
        .unwrap();
    let stamps = sample_stamps(10_000);
    let month = YearMonth::new(2022, 3).unwrap();
    let today = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();

    c.bench_function("project_month_10k_stamps", |b| {
        b.iter(|| project_month(&rule, black_box(&stamps), month, today))
    });
}

fn build_book(expenses: usize) -> Book {
    let clock = FixedClock::on(anchor());
    let mut book = Book::new("bench", clock.0);
    let rent = CategoryService::create(
        &mut book,
        CategoryCreate::new("Rent", Frequency::Monthly).with_fixed_amount(900.0),
        &clock,
    )
    .unwrap();
    for idx in 0..expenses {
        let day = anchor() + Duration::days((idx % 365) as i64);
        let input = ExpenseCreate::new(10.0 + (idx % 50) as f64)
            .in_category(rent)
            .on(day);
        ExpenseService::add(&mut book, input, &clock).unwrap();
    }
    book
}

fn bench_book_io(c: &mut Criterion) {
    let book = build_book(black_box(10_000));
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("book.json");

    c.bench_function("book_save_10k", |b| {
        b.iter(|| save_book_to_path(&book, &path).expect("save book"))
    });

    save_book_to_path(&book, &path).expect("seed");

    c.bench_function("book_load_10k", |b| {
        b.iter(|| black_box(load_book_from_path(&path).expect("load book")))
    });
}

criterion_group!(benches, bench_evaluator, bench_projection, bench_book_io);
criterion_main!(benches);
