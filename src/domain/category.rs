//! Expense categories and the recurrence rule they carry.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;
use crate::recurrence::{Frequency, RecurrenceRule, RuleError};

pub const DEFAULT_ICON: &str = "💰";
pub const DEFAULT_COLOR: &str = "#8B5CF6";

/// How a category's spending is presented.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingMode {
    /// Day-by-day calendar of expected and recorded occurrences.
    #[default]
    Calendar,
    /// Running total against `budget_limit`.
    Budget,
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrackingMode::Calendar => "calendar",
            TrackingMode::Budget => "budget",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub tracking_mode: TrackingMode,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specific_days: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_limit: Option<f64>,
    #[serde(default = "default_true")]
    pub is_email_enabled: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
    /// Creation day in the user's zone. Older documents lack it and fall back
    /// to the UTC day of `created_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_interval() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Category {
    pub fn new(name: impl Into<String>, frequency: Frequency, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: default_icon(),
            color: default_color(),
            tracking_mode: TrackingMode::default(),
            frequency,
            interval_count: 1,
            specific_days: Vec::new(),
            fixed_amount: None,
            budget_limit: None,
            is_email_enabled: true,
            is_active: true,
            sort_order: 0,
            created_at,
            created_on: None,
            updated_at: created_at,
        }
    }

    /// Phase reference for interval rules: the calendar day of creation.
    pub fn anchor_date(&self) -> NaiveDate {
        self.created_on
            .unwrap_or_else(|| self.created_at.date_naive())
    }

    pub fn created_on(mut self, day: NaiveDate) -> Self {
        self.created_on = Some(day);
        self
    }

    pub fn recurrence_rule(&self) -> Result<RecurrenceRule, RuleError> {
        RecurrenceRule::builder(self.frequency)
            .interval(self.interval_count)
            .specific_days(self.specific_days.iter().copied())
            .anchor(self.anchor_date())
            .maybe_fixed_amount(self.fixed_amount)
            .build()
    }

    pub fn schedule_label(&self) -> String {
        self.recurrence_rule()
            .map(|rule| rule.label())
            .unwrap_or_else(|err| format!("invalid rule: {err}"))
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} {} ({})", self.icon, self.name, self.schedule_label())
    }
}
