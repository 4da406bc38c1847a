//! Recording, removing and toggling expenses.

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::services::{active_category, ServiceError, ServiceResult};
use crate::core::time::Clock;
use crate::domain::{Book, Expense};
use crate::recurrence::{DateStamp, Dated, YearMonth};

/// Validated input for [`ExpenseService::add`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseCreate {
    pub amount: f64,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    /// Defaults to the clock's current day.
    pub date: Option<NaiveDate>,
}

impl ExpenseCreate {
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            category_id: None,
            description: None,
            date: None,
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result of [`ExpenseService::toggle_day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Recorded(Uuid),
    /// Number of expenses removed from the day.
    Removed(usize),
}

pub struct ExpenseService;

impl ExpenseService {
    pub fn add(book: &mut Book, input: ExpenseCreate, clock: &dyn Clock) -> ServiceResult<Uuid> {
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(ServiceError::Invalid(format!(
                "amount must be a positive number, got {}",
                input.amount
            )));
        }
        if let Some(category_id) = input.category_id {
            if book.category(category_id).is_none() {
                return Err(ServiceError::CategoryNotFound(category_id));
            }
        }

        let now = clock.now();
        let day = input.date.unwrap_or_else(|| clock.today());
        let mut expense = Expense::new(input.amount, DateStamp::from_date(day), now);
        expense.category_id = input.category_id;
        expense.description = input
            .description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        let id = expense.id;
        info!(%id, amount = expense.amount, date = %day, "expense recorded");
        book.expenses.push(expense);
        book.touch(now);
        Ok(id)
    }

    pub fn remove(book: &mut Book, id: Uuid, clock: &dyn Clock) -> ServiceResult<Expense> {
        let index = book
            .expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or(ServiceError::ExpenseNotFound(id))?;
        let removed = book.expenses.remove(index);
        info!(%id, "expense removed");
        book.touch(clock.now());
        Ok(removed)
    }

    /// Flips a calendar day for a category: removes whatever was recorded on
    /// `day`, or records one expense for the category's fixed amount.
    pub fn toggle_day(
        book: &mut Book,
        category_id: Uuid,
        day: NaiveDate,
        clock: &dyn Clock,
    ) -> ServiceResult<ToggleOutcome> {
        let category = active_category(book, category_id)?;
        let amount = category.fixed_amount;
        let name = category.name.clone();
        let now = clock.now();

        let before = book.expenses.len();
        book.expenses
            .retain(|expense| !(expense.belongs_to(category_id) && expense.falls_on(day)));
        let removed = before - book.expenses.len();
        if removed > 0 {
            info!(category = %name, %day, removed, "calendar day cleared");
            book.touch(now);
            return Ok(ToggleOutcome::Removed(removed));
        }

        let amount = amount.ok_or_else(|| {
            ServiceError::Invalid(format!(
                "category `{name}` has no fixed amount to record"
            ))
        })?;
        let expense = Expense::new(amount, DateStamp::from_date(day), now)
            .in_category(category_id)
            .with_description(name.clone())
            .auto_generated();
        let id = expense.id;
        info!(category = %name, %day, %id, "calendar day recorded");
        book.expenses.push(expense);
        book.touch(now);
        Ok(ToggleOutcome::Recorded(id))
    }

    /// Expenses dated inside `month`, optionally for one category, oldest first.
    pub fn list_for_month(
        book: &Book,
        month: YearMonth,
        category_id: Option<Uuid>,
    ) -> Vec<&Expense> {
        let mut dated: Vec<(NaiveDate, &Expense)> = book
            .expenses
            .iter()
            .filter(|expense| category_id.map_or(true, |id| expense.belongs_to(id)))
            .filter_map(|expense| match expense.calendar_day() {
                Ok(day) => Some((day, expense)),
                Err(err) => {
                    warn!(id = %expense.id, %err, "expense date unreadable");
                    None
                }
            })
            .filter(|(day, _)| month.contains(*day))
            .collect();
        dated.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.created_at.cmp(&b.1.created_at)));
        dated.into_iter().map(|(_, expense)| expense).collect()
    }
}
