use tracing::info;

use crate::core::services::{ServiceError, ServiceResult};
use crate::core::time::Clock;
use crate::domain::{Book, ReportFrequency, ReportSettings};

/// Partial update of the report settings. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSettingsUpdate {
    pub email: Option<Option<String>>,
    pub display_name: Option<Option<String>>,
    pub frequency: Option<ReportFrequency>,
    pub report_day: Option<u32>,
}

pub struct SettingsService;

impl SettingsService {
    pub fn update(
        book: &mut Book,
        changes: ReportSettingsUpdate,
        clock: &dyn Clock,
    ) -> ServiceResult<ReportSettings> {
        let mut next = book.settings.clone();
        if let Some(email) = changes.email {
            next.email = match email.map(|value| value.trim().to_string()) {
                Some(value) if value.is_empty() => None,
                Some(value) => {
                    Self::validate_email(&value)?;
                    Some(value)
                }
                None => None,
            };
        }
        if let Some(name) = changes.display_name {
            next.display_name = name
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
        }
        if let Some(frequency) = changes.frequency {
            next.frequency = frequency;
        }
        if let Some(day) = changes.report_day {
            next.report_day = day;
        }

        let range = next.frequency.day_range();
        if !range.contains(&next.report_day) {
            return Err(ServiceError::Invalid(format!(
                "report day {} is outside {}..={} for {} reports",
                next.report_day,
                range.start(),
                range.end(),
                next.frequency
            )));
        }

        book.settings = next.clone();
        book.touch(clock.now());
        info!(frequency = %next.frequency, day = next.report_day, "report settings updated");
        Ok(next)
    }

    fn validate_email(value: &str) -> ServiceResult<()> {
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !value.contains(char::is_whitespace)
            }
            None => false,
        };
        if valid {
            Ok(())
        } else {
            Err(ServiceError::Invalid(format!(
                "`{value}` is not a valid e-mail address"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap())
    }

    #[test]
    fn switching_to_weekly_requires_weekday_index() {
        let mut book = Book::new("t", clock().0);
        let changes = ReportSettingsUpdate {
            frequency: Some(ReportFrequency::Weekly),
            report_day: Some(15),
            ..ReportSettingsUpdate::default()
        };
        assert!(SettingsService::update(&mut book, changes, &clock()).is_err());
        assert_eq!(book.settings, ReportSettings::default());

        let changes = ReportSettingsUpdate {
            frequency: Some(ReportFrequency::Weekly),
            report_day: Some(5),
            ..ReportSettingsUpdate::default()
        };
        let updated = SettingsService::update(&mut book, changes, &clock()).unwrap();
        assert_eq!(updated.report_day, 5);
    }

    #[test]
    fn email_is_validated_and_clearable() {
        let mut book = Book::new("t", clock().0);
        let bad = ReportSettingsUpdate {
            email: Some(Some("nobody".into())),
            ..ReportSettingsUpdate::default()
        };
        assert!(SettingsService::update(&mut book, bad, &clock()).is_err());

        let good = ReportSettingsUpdate {
            email: Some(Some(" me@example.com ".into())),
            ..ReportSettingsUpdate::default()
        };
        SettingsService::update(&mut book, good, &clock()).unwrap();
        assert_eq!(book.settings.email.as_deref(), Some("me@example.com"));

        let clear = ReportSettingsUpdate {
            email: Some(None),
            ..ReportSettingsUpdate::default()
        };
        SettingsService::update(&mut book, clear, &clock()).unwrap();
        assert!(book.settings.email.is_none());
    }
}
