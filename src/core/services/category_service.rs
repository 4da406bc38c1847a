use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use crate::core::time::Clock;
use crate::domain::{Book, Category, TrackingMode, DEFAULT_ICON};
use crate::recurrence::{Frequency, RecurrenceRule};

use super::{ServiceError, ServiceResult};

/// Colours handed out to new categories in rotation.
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#8B5CF6", "#06B6D4", "#10B981", "#F43F5E", "#F59E0B", "#EC4899", "#3B82F6", "#6366F1",
];

/// Validated input for [`CategoryService::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCreate {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub tracking_mode: TrackingMode,
    pub frequency: Frequency,
    pub interval_count: u32,
    pub specific_days: Vec<u8>,
    pub fixed_amount: Option<f64>,
    pub budget_limit: Option<f64>,
    pub is_email_enabled: bool,
}

impl CategoryCreate {
    pub fn new(name: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            name: name.into(),
            icon: None,
            color: None,
            tracking_mode: TrackingMode::Calendar,
            frequency,
            interval_count: 1,
            specific_days: Vec::new(),
            fixed_amount: None,
            budget_limit: None,
            is_email_enabled: true,
        }
    }

    pub fn with_interval(mut self, count: u32) -> Self {
        self.interval_count = count;
        self
    }

    pub fn with_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.specific_days = days.into_iter().collect();
        self
    }

    pub fn with_fixed_amount(mut self, amount: f64) -> Self {
        self.fixed_amount = Some(amount);
        self
    }

    pub fn with_budget(mut self, limit: f64) -> Self {
        self.tracking_mode = TrackingMode::Budget;
        self.budget_limit = Some(limit);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Partial update for [`CategoryService::update`]. `None` leaves a field as is;
/// the nested options of `fixed_amount` and `budget_limit` allow clearing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub tracking_mode: Option<TrackingMode>,
    pub frequency: Option<Frequency>,
    pub interval_count: Option<u32>,
    pub specific_days: Option<Vec<u8>>,
    pub fixed_amount: Option<Option<f64>>,
    pub budget_limit: Option<Option<f64>>,
    pub is_email_enabled: Option<bool>,
    pub is_active: Option<bool>,
}

impl CategoryUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub struct CategoryService;

impl CategoryService {
    pub fn create(book: &mut Book, input: CategoryCreate, clock: &dyn Clock) -> ServiceResult<Uuid> {
        let name = Self::validate_name(book, None, &input.name)?;
        if let Some(color) = &input.color {
            Self::validate_color(color)?;
        }
        Self::validate_limit(input.budget_limit)?;

        let now = clock.now();
        let today = clock.today();
        let rule = RecurrenceRule::builder(input.frequency)
            .interval(input.interval_count)
            .specific_days(input.specific_days)
            .anchor(today)
            .maybe_fixed_amount(input.fixed_amount)
            .build()?;

        let existing = book.categories.len();
        let mut category = Category::new(name, input.frequency, now).created_on(today);
        category.icon = input
            .icon
            .filter(|icon| !icon.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ICON.to_string());
        category.color = input
            .color
            .unwrap_or_else(|| CATEGORY_PALETTE[existing % CATEGORY_PALETTE.len()].to_string());
        category.tracking_mode = input.tracking_mode;
        category.interval_count = rule.interval_count();
        category.specific_days = rule.specific_days().iter().copied().collect();
        category.fixed_amount = rule.fixed_amount();
        category.budget_limit = input.budget_limit;
        category.is_email_enabled = input.is_email_enabled;
        category.sort_order = existing as u32;

        let id = category.id;
        info!(%id, name = %category.name, frequency = %category.frequency, "category created");
        book.categories.push(category);
        book.touch(now);
        Ok(id)
    }

    pub fn update(
        book: &mut Book,
        id: Uuid,
        changes: CategoryUpdate,
        clock: &dyn Clock,
    ) -> ServiceResult<()> {
        let current = book
            .category(id)
            .ok_or(ServiceError::CategoryNotFound(id))?;
        let mut next = current.clone();

        if let Some(name) = &changes.name {
            next.name = Self::validate_name(book, Some(id), name)?;
        }
        if let Some(color) = changes.color {
            Self::validate_color(&color)?;
            next.color = color;
        }
        if let Some(icon) = changes.icon {
            next.icon = icon;
        }
        if let Some(mode) = changes.tracking_mode {
            next.tracking_mode = mode;
        }
        if let Some(frequency) = changes.frequency {
            next.frequency = frequency;
        }
        if let Some(count) = changes.interval_count {
            next.interval_count = count;
        }
        if let Some(days) = changes.specific_days {
            next.specific_days = days;
        }
        if let Some(amount) = changes.fixed_amount {
            next.fixed_amount = amount;
        }
        if let Some(limit) = changes.budget_limit {
            Self::validate_limit(limit)?;
            next.budget_limit = limit;
        }
        if let Some(enabled) = changes.is_email_enabled {
            next.is_email_enabled = enabled;
        }
        if let Some(active) = changes.is_active {
            next.is_active = active;
        }

        let rule = next.recurrence_rule()?;
        next.specific_days = rule.specific_days().iter().copied().collect();
        let now = clock.now();
        next.updated_at = now;

        if let Some(slot) = book.category_mut(id) {
            *slot = next;
        }
        info!(%id, "category updated");
        book.touch(now);
        Ok(())
    }

    /// Deletes the category together with its expenses. Returns how many
    /// expenses went with it.
    pub fn remove(book: &mut Book, id: Uuid, clock: &dyn Clock) -> ServiceResult<usize> {
        let before = book.categories.len();
        book.categories.retain(|category| category.id != id);
        if book.categories.len() == before {
            return Err(ServiceError::CategoryNotFound(id));
        }
        let expenses_before = book.expenses.len();
        book.expenses.retain(|expense| !expense.belongs_to(id));
        let removed = expenses_before - book.expenses.len();
        info!(%id, removed_expenses = removed, "category removed");
        book.touch(clock.now());
        Ok(removed)
    }

    /// Assigns `sort_order` by position in `ids`. Categories not listed follow
    /// in their previous order.
    pub fn reorder(book: &mut Book, ids: &[Uuid], clock: &dyn Clock) -> ServiceResult<()> {
        let mut seen = HashSet::new();
        for id in ids {
            if book.category(*id).is_none() {
                return Err(ServiceError::CategoryNotFound(*id));
            }
            if !seen.insert(*id) {
                return Err(ServiceError::Invalid(format!(
                    "category {id} listed more than once"
                )));
            }
        }

        let trailing: Vec<Uuid> = Self::list(book)
            .into_iter()
            .map(|category| category.id)
            .filter(|id| !seen.contains(id))
            .collect();
        for (position, id) in ids.iter().chain(trailing.iter()).enumerate() {
            if let Some(category) = book.category_mut(*id) {
                category.sort_order = position as u32;
            }
        }
        info!(count = ids.len(), "categories reordered");
        book.touch(clock.now());
        Ok(())
    }

    /// Categories by `sort_order`, newest first on ties.
    pub fn list(book: &Book) -> Vec<&Category> {
        let mut categories: Vec<&Category> = book.categories.iter().collect();
        categories.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        categories
    }

    /// Resolves a category by id or by case-insensitive name.
    pub fn find<'a>(book: &'a Book, key: &str) -> ServiceResult<&'a Category> {
        let key = key.trim();
        if let Ok(id) = Uuid::parse_str(key) {
            return book.category(id).ok_or(ServiceError::CategoryNotFound(id));
        }
        let normalized = key.to_lowercase();
        book.categories
            .iter()
            .find(|category| category.name.trim().to_lowercase() == normalized)
            .ok_or_else(|| ServiceError::Invalid(format!("no category named `{key}`")))
    }

    fn validate_name(book: &Book, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::Invalid("category name cannot be empty".into()));
        }
        let normalized = trimmed.to_lowercase();
        let duplicate = book.categories.iter().any(|category| {
            category.name.trim().to_lowercase() == normalized
                && exclude.map_or(true, |id| category.id != id)
        });
        if duplicate {
            Err(ServiceError::Invalid(format!(
                "category `{trimmed}` already exists"
            )))
        } else {
            Ok(trimmed.to_string())
        }
    }

    fn validate_color(color: &str) -> ServiceResult<()> {
        let valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());
        if valid {
            Ok(())
        } else {
            Err(ServiceError::Invalid(format!(
                "colour `{color}` must look like #RRGGBB"
            )))
        }
    }

    fn validate_limit(limit: Option<f64>) -> ServiceResult<()> {
        match limit {
            Some(value) if !value.is_finite() || value < 0.0 => Err(ServiceError::Invalid(
                format!("budget limit must be a non-negative number, got {value}"),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::recurrence::RuleError;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap())
    }

    fn book() -> Book {
        Book::new("test", clock().0)
    }

    #[test]
    fn create_rotates_palette_and_sort_order() {
        let mut book = book();
        for i in 0..9 {
            CategoryService::create(
                &mut book,
                CategoryCreate::new(format!("c{i}"), Frequency::Daily),
                &clock(),
            )
            .unwrap();
        }
        assert_eq!(book.categories[0].color, CATEGORY_PALETTE[0]);
        assert_eq!(book.categories[3].color, CATEGORY_PALETTE[3]);
        assert_eq!(book.categories[8].color, CATEGORY_PALETTE[0]);
        assert_eq!(book.categories[8].sort_order, 8);
        assert_eq!(book.categories[0].icon, DEFAULT_ICON);
    }

    #[test]
    fn create_rejects_duplicate_names_case_insensitively() {
        let mut book = book();
        CategoryService::create(&mut book, CategoryCreate::new("Rent", Frequency::Monthly), &clock())
            .unwrap();
        let err = CategoryService::create(
            &mut book,
            CategoryCreate::new("  rent ", Frequency::Monthly),
            &clock(),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(msg) if msg.contains("already exists")));
    }

    #[test]
    fn create_surfaces_rule_errors() {
        let mut book = book();
        let err = CategoryService::create(
            &mut book,
            CategoryCreate::new("Gym", Frequency::Weekly).with_interval(0),
            &clock(),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Rule(RuleError::InvalidInterval(0))));
        assert!(book.categories.is_empty());
    }

    #[test]
    fn create_anchors_on_the_local_day() {
        use chrono::{FixedOffset, TimeZone, Utc};
        // 21:00 UTC on 5 May is 6 May at UTC+05:30.
        let late = FixedClock::at(Utc.with_ymd_and_hms(2024, 5, 5, 21, 0, 0).unwrap())
            .in_offset(FixedOffset::east_opt(19_800).unwrap());
        let mut book = book();
        let id = CategoryService::create(&mut book, CategoryCreate::new("Tea", Frequency::Weekly), &late)
            .unwrap();
        let category = book.category(id).unwrap();
        assert_eq!(category.created_on, Some(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()));
        assert_eq!(category.anchor_date(), NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
    }

    #[test]
    fn weekdays_category_stores_no_day_list() {
        let mut book = book();
        let id = CategoryService::create(
            &mut book,
            CategoryCreate::new("Lunch", Frequency::Weekdays).with_days([1, 2, 3, 4, 5]),
            &clock(),
        )
        .unwrap();
        assert!(book.category(id).unwrap().specific_days.is_empty());
    }

    #[test]
    fn update_revalidates_rule() {
        let mut book = book();
        let id = CategoryService::create(
            &mut book,
            CategoryCreate::new("Class", Frequency::Custom).with_days([1, 3]),
            &clock(),
        )
        .unwrap();
        let bad = CategoryUpdate {
            specific_days: Some(vec![9]),
            ..CategoryUpdate::default()
        };
        let err = CategoryService::update(&mut book, id, bad, &clock()).unwrap_err();
        assert!(matches!(err, ServiceError::Rule(RuleError::InvalidWeekday(9))));
        assert_eq!(book.category(id).unwrap().specific_days, vec![1, 3]);

        let switch = CategoryUpdate {
            frequency: Some(Frequency::Weekly),
            fixed_amount: Some(Some(12.5)),
            ..CategoryUpdate::default()
        };
        CategoryService::update(&mut book, id, switch, &clock()).unwrap();
        let category = book.category(id).unwrap();
        assert_eq!(category.frequency, Frequency::Weekly);
        assert!(category.specific_days.is_empty());
        assert_eq!(category.fixed_amount, Some(12.5));
    }

    #[test]
    fn reorder_puts_unlisted_categories_last() {
        let mut book = book();
        let ids: Vec<Uuid> = ["a", "b", "c"]
            .iter()
            .map(|name| {
                CategoryService::create(&mut book, CategoryCreate::new(*name, Frequency::Daily), &clock())
                    .unwrap()
            })
            .collect();
        CategoryService::reorder(&mut book, &[ids[2]], &clock()).unwrap();
        let names: Vec<&str> = CategoryService::list(&book)
            .into_iter()
            .map(|category| category.name.as_str())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        let err = CategoryService::reorder(&mut book, &[ids[0], ids[0]], &clock()).unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn find_accepts_id_or_name() {
        let mut book = book();
        let id = CategoryService::create(&mut book, CategoryCreate::new("Coffee", Frequency::Daily), &clock())
            .unwrap();
        assert_eq!(CategoryService::find(&book, "coffee").unwrap().id, id);
        assert_eq!(CategoryService::find(&book, &id.to_string()).unwrap().id, id);
        assert!(CategoryService::find(&book, "tea").is_err());
    }
}
