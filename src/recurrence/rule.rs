//! Recurrence rule definitions and their construction-time validation.

use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const WEEKDAY_SHORT_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// How often a category's expense is expected to recur.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekdays,
    Weekly,
    #[default]
    Monthly,
    Custom,
}

impl Frequency {
    pub const ALL: [Frequency; 5] = [
        Frequency::Daily,
        Frequency::Weekdays,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekdays => "WEEKDAYS",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Custom => "CUSTOM",
        }
    }

    /// Whether the interval count changes the evaluation of this frequency.
    pub fn uses_interval(&self) -> bool {
        matches!(
            self,
            Frequency::Weekly | Frequency::Monthly | Frequency::Custom
        )
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = RuleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Frequency::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == normalized)
            .ok_or_else(|| RuleError::UnknownFrequency(value.trim().to_string()))
    }
}

/// Validation failures raised while building a [`RecurrenceRule`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("unknown frequency `{0}` (expected DAILY, WEEKDAYS, WEEKLY, MONTHLY or CUSTOM)")]
    UnknownFrequency(String),
    #[error("interval count must be at least 1, got {0}")]
    InvalidInterval(u32),
    #[error("recurrence rule requires an anchor date")]
    MissingAnchor,
    #[error("weekday index {0} is out of range (0 = Sunday .. 6 = Saturday)")]
    InvalidWeekday(u8),
    #[error("fixed amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),
}

/// A validated recurrence rule. Instances can only be obtained through
/// [`RuleBuilder::build`], so every rule handed to the evaluator is well formed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval_count: u32,
    specific_days: BTreeSet<u8>,
    anchor_date: NaiveDate,
    fixed_amount: Option<f64>,
}

impl RecurrenceRule {
    pub fn builder(frequency: Frequency) -> RuleBuilder {
        RuleBuilder::new(frequency)
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval_count(&self) -> u32 {
        self.interval_count
    }

    /// Weekday indices (0 = Sunday). Always empty unless the frequency is `CUSTOM`.
    pub fn specific_days(&self) -> &BTreeSet<u8> {
        &self.specific_days
    }

    pub fn includes_weekday(&self, weekday: Weekday) -> bool {
        self.specific_days
            .contains(&(weekday.num_days_from_sunday() as u8))
    }

    pub fn anchor_date(&self) -> NaiveDate {
        self.anchor_date
    }

    pub fn fixed_amount(&self) -> Option<f64> {
        self.fixed_amount
    }

    /// Human readable schedule, e.g. `Every 2 weeks` or `Mon, Wed`.
    pub fn label(&self) -> String {
        let every = |unit: &str| match self.interval_count {
            1 => format!("{}ly", capitalize(unit)),
            n => format!("Every {} {}s", n, unit),
        };
        match self.frequency {
            Frequency::Daily => "Daily".into(),
            Frequency::Weekdays => "Mon-Fri".into(),
            Frequency::Weekly => every("week"),
            Frequency::Monthly => every("month"),
            Frequency::Custom => {
                let days: Vec<&str> = self
                    .specific_days
                    .iter()
                    .map(|day| WEEKDAY_SHORT_NAMES[*day as usize])
                    .collect();
                let days = if days.is_empty() {
                    "No days selected".to_string()
                } else {
                    days.join(", ")
                };
                if self.interval_count > 1 {
                    format!("{} every {} months", days, self.interval_count)
                } else {
                    days
                }
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Collects rule fields and validates them in [`RuleBuilder::build`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    frequency: Frequency,
    interval_count: u32,
    specific_days: Vec<u8>,
    anchor_date: Option<NaiveDate>,
    fixed_amount: Option<f64>,
}

impl RuleBuilder {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval_count: 1,
            specific_days: Vec::new(),
            anchor_date: None,
            fixed_amount: None,
        }
    }

    pub fn interval(mut self, count: u32) -> Self {
        self.interval_count = count;
        self
    }

    pub fn specific_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.specific_days = days.into_iter().collect();
        self
    }

    pub fn anchor(mut self, date: NaiveDate) -> Self {
        self.anchor_date = Some(date);
        self
    }

    pub fn fixed_amount(mut self, amount: f64) -> Self {
        self.fixed_amount = Some(amount);
        self
    }

    pub fn maybe_fixed_amount(mut self, amount: Option<f64>) -> Self {
        self.fixed_amount = amount;
        self
    }

    pub fn build(self) -> Result<RecurrenceRule, RuleError> {
        let anchor_date = self.anchor_date.ok_or(RuleError::MissingAnchor)?;
        if self.interval_count < 1 {
            return Err(RuleError::InvalidInterval(self.interval_count));
        }
        if let Some(amount) = self.fixed_amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(RuleError::InvalidAmount(amount));
            }
        }

        let mut specific_days = BTreeSet::new();
        for day in self.specific_days {
            if day > 6 {
                return Err(RuleError::InvalidWeekday(day));
            }
            specific_days.insert(day);
        }
        // Only CUSTOM consults the day set; WEEKDAYS is hardwired to Mon..Fri.
        if self.frequency != Frequency::Custom {
            specific_days.clear();
        }

        Ok(RecurrenceRule {
            frequency: self.frequency,
            interval_count: self.interval_count,
            specific_days,
            anchor_date,
            fixed_amount: self.fixed_amount,
        })
    }
}
