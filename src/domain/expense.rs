use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;
use crate::recurrence::{DateStamp, DateStampError, Dated};

/// A single recorded expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: DateStamp,
    /// Set for expenses recorded by toggling a calendar day.
    #[serde(default)]
    pub is_auto_generated: bool,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(amount: f64, date: DateStamp, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id: None,
            amount,
            description: None,
            date,
            is_auto_generated: false,
            created_at,
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn auto_generated(mut self) -> Self {
        self.is_auto_generated = true;
        self
    }

    pub fn belongs_to(&self, category_id: Uuid) -> bool {
        self.category_id == Some(category_id)
    }

    /// True when the stored date reads as `day`. Unreadable dates never match.
    pub fn falls_on(&self, day: NaiveDate) -> bool {
        self.date.calendar_day().map(|d| d == day).unwrap_or(false)
    }
}

impl Dated for Expense {
    fn calendar_day(&self) -> Result<NaiveDate, DateStampError> {
        self.date.calendar_day()
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        match &self.description {
            Some(text) => format!("{} {:.2} {}", self.date, self.amount, text),
            None => format!("{} {:.2}", self.date, self.amount),
        }
    }
}
