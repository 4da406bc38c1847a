//! Read-only aggregations behind the calendar, analysis and digest reports.

use std::collections::HashMap;

use chrono::{Months, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::services::{active_category, CategoryService, ServiceResult};
use crate::domain::{Book, Category, Expense, ReportFrequency, TrackingMode};
use crate::recurrence::{project_month, Dated, MonthProjection, YearMonth};

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
pub const UNCATEGORIZED_COLOR: &str = "#7c3aed";
pub const NO_CATEGORY_LABEL: &str = "None";

/// Everything needed to draw one category's month calendar.
#[derive(Debug, Clone)]
pub struct CategoryCalendarReport {
    pub category: Category,
    pub projection: MonthProjection,
    /// Sum of the category's expenses dated in the month.
    pub total: f64,
    /// Ids of the expenses behind `projection.rejected`, in the same order.
    pub rejected_ids: Vec<Uuid>,
}

impl CategoryCalendarReport {
    pub fn month(&self) -> YearMonth {
        self.projection.month
    }

    pub fn fixed_amount(&self) -> Option<f64> {
        self.category.fixed_amount
    }

    /// Blank cells before day 1 in a Sunday-first grid.
    pub fn leading_offset(&self) -> u32 {
        self.projection.month.leading_offset()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub color: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingBreakdown {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total: f64,
    pub transaction_count: usize,
    /// Largest amount first.
    pub entries: Vec<BreakdownEntry>,
    pub highest_category: String,
    /// Expenses left out because their date could not be read.
    pub skipped_records: usize,
}

impl SpendingBreakdown {
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}

/// Spending against a category's budget limit for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub category_id: Uuid,
    pub name: String,
    pub icon: String,
    pub month: YearMonth,
    pub spent: f64,
    /// Zero when the category has no limit set.
    pub limit: f64,
    /// Share of the limit used, 0 without a limit.
    pub percentage: f64,
    pub over_budget: bool,
}

impl BudgetStatus {
    /// Left to spend; negative once over budget.
    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }
}

/// A digest that is due for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Digest {
    pub frequency: ReportFrequency,
    pub breakdown: SpendingBreakdown,
}

pub struct ReportService;

impl ReportService {
    pub fn category_calendar(
        book: &Book,
        category_id: Uuid,
        month: YearMonth,
        today: NaiveDate,
    ) -> ServiceResult<CategoryCalendarReport> {
        let category = active_category(book, category_id)?;
        let rule = category.recurrence_rule()?;
        let expenses: Vec<&Expense> = book.expenses_for(category_id).collect();
        let projection = project_month(&rule, &expenses, month, today);

        let total = Self::spent_in(&expenses, month);
        let rejected_ids = projection
            .rejected
            .iter()
            .filter_map(|rejected| expenses.get(rejected.index).map(|expense| expense.id))
            .collect();

        Ok(CategoryCalendarReport {
            category: category.clone(),
            projection,
            total,
            rejected_ids,
        })
    }

    /// How much of an active category's budget `month` used.
    pub fn budget_status(
        book: &Book,
        category_id: Uuid,
        month: YearMonth,
    ) -> ServiceResult<BudgetStatus> {
        let category = active_category(book, category_id)?;
        Ok(Self::status_of(book, category, month))
    }

    /// Budget status of every active budget-mode category, in list order.
    pub fn budget_overview(book: &Book, month: YearMonth) -> Vec<BudgetStatus> {
        CategoryService::list(book)
            .into_iter()
            .filter(|category| category.is_active && category.tracking_mode == TrackingMode::Budget)
            .map(|category| Self::status_of(book, category, month))
            .collect()
    }

    fn status_of(book: &Book, category: &Category, month: YearMonth) -> BudgetStatus {
        let expenses: Vec<&Expense> = book.expenses_for(category.id).collect();
        let spent = Self::spent_in(&expenses, month);
        let limit = category.budget_limit.unwrap_or(0.0);
        let percentage = if limit > 0.0 { spent / limit * 100.0 } else { 0.0 };
        BudgetStatus {
            category_id: category.id,
            name: category.name.clone(),
            icon: category.icon.clone(),
            month,
            spent,
            limit,
            percentage,
            over_budget: spent > limit,
        }
    }

    fn spent_in(expenses: &[&Expense], month: YearMonth) -> f64 {
        expenses
            .iter()
            .filter(|expense| matches!(expense.calendar_day(), Ok(day) if month.contains(day)))
            .map(|expense| expense.amount)
            .sum()
    }

    /// All spending in `month`, grouped by category with an uncategorised bucket.
    pub fn monthly_analysis(book: &Book, month: YearMonth) -> SpendingBreakdown {
        let (selected, skipped) = Self::collect_period(
            book,
            month.first_day(),
            month.last_day(),
            |_| true,
        );
        let mut breakdown = Self::summarize(book, &selected, |expense| expense.category_id);
        breakdown.period_start = month.first_day();
        breakdown.period_end = month.last_day();
        breakdown.skipped_records = skipped;
        breakdown
    }

    /// The periodic digest, when the settings make one due on `today` and
    /// e-mail enabled categories had spending in the period.
    ///
    /// Weekly digests cover the seven days before `today`, monthly ones the
    /// month before it; both include `today` itself.
    pub fn due_digest(book: &Book, today: NaiveDate) -> Option<Digest> {
        let settings = &book.settings;
        if !settings.is_due_on(today) {
            debug!(%today, frequency = %settings.frequency, "digest not due");
            return None;
        }
        let start = match settings.frequency {
            ReportFrequency::Weekly => today - chrono::Duration::days(7),
            ReportFrequency::Monthly => today.checked_sub_months(Months::new(1))?,
        };

        let enabled: HashMap<Uuid, &Category> = book
            .categories
            .iter()
            .filter(|category| category.is_email_enabled)
            .map(|category| (category.id, category))
            .collect();
        let (selected, skipped) = Self::collect_period(book, start, today, |expense| {
            expense
                .category_id
                .map_or(false, |id| enabled.contains_key(&id))
        });
        if selected.is_empty() {
            debug!(%start, %today, "digest skipped, no spending");
            return None;
        }

        // Digest rows are keyed by category name.
        let mut breakdown = Self::summarize(book, &selected, |expense| {
            expense
                .category_id
                .and_then(|id| enabled.get(&id))
                .map(|category| category.name.to_lowercase())
        });
        breakdown.period_start = start;
        breakdown.period_end = today;
        breakdown.skipped_records = skipped;
        Some(Digest {
            frequency: settings.frequency,
            breakdown,
        })
    }

    fn collect_period<'a>(
        book: &'a Book,
        start: NaiveDate,
        end: NaiveDate,
        include: impl Fn(&Expense) -> bool,
    ) -> (Vec<&'a Expense>, usize) {
        let mut selected = Vec::new();
        let mut skipped = 0;
        for expense in book.expenses.iter().filter(|expense| include(*expense)) {
            match expense.calendar_day() {
                Ok(day) if day >= start && day <= end => selected.push(expense),
                Ok(_) => {}
                Err(err) => {
                    warn!(id = %expense.id, %err, "expense left out of report");
                    skipped += 1;
                }
            }
        }
        (selected, skipped)
    }

    fn summarize<K, F>(book: &Book, expenses: &[&Expense], key: F) -> SpendingBreakdown
    where
        K: PartialEq,
        F: Fn(&Expense) -> K,
    {
        let total: f64 = expenses.iter().map(|expense| expense.amount).sum();
        let mut groups: Vec<(K, BreakdownEntry)> = Vec::new();
        for expense in expenses {
            let group = key(*expense);
            let index = match groups.iter().position(|(existing, _)| *existing == group) {
                Some(index) => index,
                None => {
                    let category = expense.category_id.and_then(|id| book.category(id));
                    let entry = BreakdownEntry {
                        name: category
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string()),
                        color: category
                            .map(|c| c.color.clone())
                            .unwrap_or_else(|| UNCATEGORIZED_COLOR.to_string()),
                        amount: 0.0,
                        percentage: 0.0,
                    };
                    groups.push((group, entry));
                    groups.len() - 1
                }
            };
            groups[index].1.amount += expense.amount;
        }

        let mut entries: Vec<BreakdownEntry> = groups
            .into_iter()
            .map(|(_, entry)| entry)
            .map(|mut entry| {
                entry.percentage = if total > 0.0 {
                    entry.amount / total * 100.0
                } else {
                    0.0
                };
                entry
            })
            .collect();
        // Stable sort keeps first-seen order among equal amounts.
        entries.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        let highest_category = entries
            .first()
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| NO_CATEGORY_LABEL.to_string());

        SpendingBreakdown {
            period_start: NaiveDate::MIN,
            period_end: NaiveDate::MIN,
            total,
            transaction_count: expenses.len(),
            entries,
            highest_category,
            skipped_records: 0,
        }
    }
}
