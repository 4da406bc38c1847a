pub mod category_service;
pub mod expense_service;
pub mod report_service;
pub mod settings_service;

pub use category_service::{CategoryCreate, CategoryService, CategoryUpdate};
pub use expense_service::{ExpenseCreate, ExpenseService, ToggleOutcome};
pub use report_service::{
    BreakdownEntry, BudgetStatus, CategoryCalendarReport, Digest, ReportService,
    SpendingBreakdown,
};
pub use settings_service::{ReportSettingsUpdate, SettingsService};

use uuid::Uuid;

use crate::domain::{Book, Category};
use crate::recurrence::RuleError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error("category {0} not found")]
    CategoryNotFound(Uuid),
    #[error("category `{0}` is inactive")]
    CategoryInactive(String),
    #[error("expense {0} not found")]
    ExpenseNotFound(Uuid),
    #[error("{0}")]
    Invalid(String),
}

/// Looks up a category that still takes part in calendars, budgets and toggles.
pub(crate) fn active_category(book: &Book, id: Uuid) -> ServiceResult<&Category> {
    let category = book.category(id).ok_or(ServiceError::CategoryNotFound(id))?;
    if category.is_active {
        Ok(category)
    } else {
        Err(ServiceError::CategoryInactive(category.name.clone()))
    }
}
