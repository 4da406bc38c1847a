use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{category::Category, expense::Expense, settings::ReportSettings};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// One user's settings, categories and expenses, persisted as a single document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub name: String,
    #[serde(default)]
    pub settings: ReportSettings,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u8,
}

impl Book {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            settings: ReportSettings::default(),
            categories: Vec::new(),
            expenses: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_mut(&mut self, id: Uuid) -> Option<&mut Category> {
        self.categories.iter_mut().find(|category| category.id == id)
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn expenses_for(&self, category_id: Uuid) -> impl Iterator<Item = &Expense> {
        self.expenses
            .iter()
            .filter(move |expense| expense.belongs_to(category_id))
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
