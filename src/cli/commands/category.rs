use uuid::Uuid;

use crate::cli::commands::{parse_amount, parse_days, parse_switch, ParsedArgs};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::core::services::{CategoryCreate, CategoryService, CategoryUpdate};
use crate::domain::{Displayable, TrackingMode};
use crate::recurrence::Frequency;

const USAGE: &str = "category add <name> [--frequency F] [--interval N] [--days mon,wed] [--amount X] [--budget X] [--icon I] [--color #hex] [--email on|off]
category edit <name|id> [--name NEW] [--frequency F] [--interval N] [--days D] [--amount X|none] [--budget X|none] [--mode calendar|budget] [--icon I] [--color #hex] [--email on|off] [--active on|off]
category list
category remove <name|id>
category reorder <name|id>...";

const ADD_FLAGS: &[&str] = &[
    "frequency", "interval", "days", "amount", "budget", "icon", "color", "email",
];
const EDIT_FLAGS: &[&str] = &[
    "name", "frequency", "interval", "days", "amount", "budget", "mode", "icon", "color", "email",
    "active",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "category",
        "Manage categories and their recurrence rules",
        USAGE,
        cmd_category,
    )]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(CommandError::usage("usage: category <add|edit|list|remove|reorder>"));
    };
    match action.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "edit" => edit(context, rest),
        "list" => list(context),
        "remove" | "rm" => remove(context, rest),
        "reorder" => reorder(context, rest),
        other => Err(CommandError::usage(format!("unknown category action `{other}`"))),
    }
}

fn parse_frequency(raw: &str) -> Result<Frequency, CommandError> {
    raw.parse::<Frequency>()
        .map_err(|err| CommandError::usage(err.to_string()))
}

/// `none` clears an optional amount.
fn optional_amount(raw: &str) -> Result<Option<f64>, CommandError> {
    if raw.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        parse_amount(raw).map(Some)
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    parsed.only(ADD_FLAGS)?;
    let name = match parsed.positional.as_slice() {
        [] => return Err(CommandError::usage("usage: category add <name> [options]")),
        words => words.join(" "),
    };

    let frequency = match parsed.value("frequency")? {
        Some(raw) => parse_frequency(raw)?,
        None => Frequency::Monthly,
    };
    let mut input = CategoryCreate::new(name, frequency);
    if let Some(count) = parsed.parsed::<u32>("interval")? {
        input = input.with_interval(count);
    }
    if let Some(raw) = parsed.value("days")? {
        input = input.with_days(parse_days(raw)?);
    }
    if let Some(raw) = parsed.value("amount")? {
        input = input.with_fixed_amount(parse_amount(raw)?);
    }
    if let Some(raw) = parsed.value("budget")? {
        input = input.with_budget(parse_amount(raw)?);
    }
    if let Some(icon) = parsed.value("icon")? {
        input = input.with_icon(icon);
    }
    if let Some(color) = parsed.value("color")? {
        input = input.with_color(color);
    }
    if let Some(raw) = parsed.value("email")? {
        input.is_email_enabled = parse_switch(raw)?;
    }

    let id = CategoryService::create(&mut context.book, input, context.clock.as_ref())?;
    context.mark_dirty();
    if let Some(category) = context.book.category(id) {
        output::success(format!("Added category {}", category.display_label()));
    }
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    parsed.only(EDIT_FLAGS)?;
    let [key] = parsed.positional.as_slice() else {
        return Err(CommandError::usage("usage: category edit <name|id> [options]"));
    };
    let id = context.category(key)?.id;

    let mut changes = CategoryUpdate {
        name: parsed.value("name")?.map(str::to_string),
        icon: parsed.value("icon")?.map(str::to_string),
        color: parsed.value("color")?.map(str::to_string),
        interval_count: parsed.parsed::<u32>("interval")?,
        ..CategoryUpdate::default()
    };
    if let Some(raw) = parsed.value("frequency")? {
        changes.frequency = Some(parse_frequency(raw)?);
    }
    if let Some(raw) = parsed.value("days")? {
        changes.specific_days = Some(parse_days(raw)?);
    }
    if let Some(raw) = parsed.value("amount")? {
        changes.fixed_amount = Some(optional_amount(raw)?);
    }
    if let Some(raw) = parsed.value("budget")? {
        changes.budget_limit = Some(optional_amount(raw)?);
    }
    if let Some(raw) = parsed.value("mode")? {
        changes.tracking_mode = Some(match raw.to_ascii_lowercase().as_str() {
            "calendar" => TrackingMode::Calendar,
            "budget" => TrackingMode::Budget,
            other => {
                return Err(CommandError::usage(format!(
                    "unknown tracking mode `{other}` (calendar or budget)"
                )))
            }
        });
    }
    if let Some(raw) = parsed.value("email")? {
        changes.is_email_enabled = Some(parse_switch(raw)?);
    }
    if let Some(raw) = parsed.value("active")? {
        changes.is_active = Some(parse_switch(raw)?);
    }
    if changes.is_empty() {
        return Err(CommandError::usage("nothing to change"));
    }

    CategoryService::update(&mut context.book, id, changes, context.clock.as_ref())?;
    context.mark_dirty();
    if let Some(category) = context.book.category(id) {
        output::success(format!("Updated {}", category.display_label()));
    }
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let categories = CategoryService::list(&context.book);
    if categories.is_empty() {
        output::info("No categories yet. Try `category add Rent --amount 500`.");
        return Ok(());
    }
    let symbol = &context.config.currency_symbol;
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Name").max(24),
        TableColumn::left("Schedule").max(28),
        TableColumn::right("Amount"),
        TableColumn::left("Mode"),
        TableColumn::left("Email"),
        TableColumn::left("Id"),
    ]);
    for (idx, category) in categories.iter().enumerate() {
        let amount = category
            .fixed_amount
            .or(category.budget_limit)
            .map(|value| super::money(symbol, value))
            .unwrap_or_else(|| "-".into());
        let mut name = format!("{} {}", category.icon, category.name);
        if !category.is_active {
            name.push_str(" (inactive)");
        }
        table.push(vec![
            (idx + 1).to_string(),
            name,
            category.schedule_label(),
            amount,
            category.tracking_mode.to_string(),
            if category.is_email_enabled { "on" } else { "off" }.into(),
            short_id(category.id),
        ]);
    }
    output::section(format!("Categories ({})", categories.len()));
    output::plain(table.render());
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [key] = args else {
        return Err(CommandError::usage("usage: category remove <name|id>"));
    };
    let (id, name) = {
        let category = context.category(key)?;
        (category.id, category.name.clone())
    };
    let expenses = context.book.expenses_for(id).count();
    let prompt = format!("Remove `{name}` and its {expenses} expense(s)?");
    if !context.confirm(&prompt)? {
        output::info("Nothing removed.");
        return Ok(());
    }
    let removed = CategoryService::remove(&mut context.book, id, context.clock.as_ref())?;
    context.mark_dirty();
    output::success(format!("Removed `{name}` and {removed} expense(s)"));
    Ok(())
}

fn reorder(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::usage("usage: category reorder <name|id>..."));
    }
    let ids = args
        .iter()
        .map(|key| context.category(key).map(|category| category.id))
        .collect::<Result<Vec<Uuid>, _>>()?;
    CategoryService::reorder(&mut context.book, &ids, context.clock.as_ref())?;
    context.mark_dirty();
    output::success("Categories reordered");
    list(context)
}

pub(crate) fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
