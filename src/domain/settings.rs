use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Cadence of the spending digest.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportFrequency {
    Weekly,
    #[default]
    Monthly,
}

impl ReportFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFrequency::Weekly => "WEEKLY",
            ReportFrequency::Monthly => "MONTHLY",
        }
    }

    /// Accepted range for `report_day` under this cadence.
    pub fn day_range(&self) -> std::ops::RangeInclusive<u32> {
        match self {
            ReportFrequency::Weekly => 0..=6,
            ReportFrequency::Monthly => 1..=31,
        }
    }
}

impl fmt::Display for ReportFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFrequency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "WEEKLY" => Ok(ReportFrequency::Weekly),
            "MONTHLY" => Ok(ReportFrequency::Monthly),
            other => Err(format!(
                "unknown report frequency `{other}` (expected WEEKLY or MONTHLY)"
            )),
        }
    }
}

/// Who receives reports and when the digest goes out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub frequency: ReportFrequency,
    /// Weekday index (0 = Sunday) for weekly digests, day of month otherwise.
    #[serde(default = "default_report_day")]
    pub report_day: u32,
}

fn default_report_day() -> u32 {
    1
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            email: None,
            display_name: None,
            frequency: ReportFrequency::default(),
            report_day: default_report_day(),
        }
    }
}

impl ReportSettings {
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        match self.frequency {
            ReportFrequency::Weekly => day.weekday().num_days_from_sunday() == self.report_day,
            ReportFrequency::Monthly => day.day() == self.report_day,
        }
    }

    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("there")
    }
}
