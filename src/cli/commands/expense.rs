use uuid::Uuid;

use crate::cli::commands::category::short_id;
use crate::cli::commands::{money, parse_amount, parse_date, parse_month, ParsedArgs};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::core::services::{ExpenseCreate, ExpenseService, ToggleOutcome};
use crate::domain::Displayable;

const USAGE: &str = "expense add <amount> [--category C] [--date YYYY-MM-DD] [--note text]
expense list [YYYY-MM] [--category C]
expense remove <id>
expense toggle <category> <YYYY-MM-DD>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "expense",
        "Record, list, remove or toggle expenses",
        USAGE,
        cmd_expense,
    )]
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(CommandError::usage("usage: expense <add|list|remove|toggle>"));
    };
    match action.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context, rest),
        "remove" | "rm" => remove(context, rest),
        "toggle" => toggle(context, rest),
        other => Err(CommandError::usage(format!("unknown expense action `{other}`"))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    parsed.only(&["category", "date", "note"])?;
    let [amount] = parsed.positional.as_slice() else {
        return Err(CommandError::usage("usage: expense add <amount> [options]"));
    };

    let mut input = ExpenseCreate::new(parse_amount(amount)?);
    if let Some(key) = parsed.value("category")? {
        input = input.in_category(context.category(key)?.id);
    }
    if let Some(raw) = parsed.value("date")? {
        input = input.on(parse_date(raw)?);
    }
    if let Some(note) = parsed.value("note")? {
        input = input.described(note);
    }

    let id = ExpenseService::add(&mut context.book, input, context.clock.as_ref())?;
    context.mark_dirty();
    if let Some(expense) = context.book.expense(id) {
        output::success(format!(
            "Recorded {} on {} [{}]",
            money(&context.config.currency_symbol, expense.amount),
            expense.date,
            short_id(id)
        ));
    }
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    parsed.only(&["category"])?;
    let month = match parsed.positional.as_slice() {
        [] => context.current_month(),
        [raw] => parse_month(raw)?,
        _ => return Err(CommandError::usage("usage: expense list [YYYY-MM] [--category C]")),
    };
    let category_id = match parsed.value("category")? {
        Some(key) => Some(context.category(key)?.id),
        None => None,
    };

    let expenses = ExpenseService::list_for_month(&context.book, month, category_id);
    if expenses.is_empty() {
        output::info(format!("No expenses in {}.", month.long_label()));
        return Ok(());
    }

    let symbol = &context.config.currency_symbol;
    let mut table = Table::new(vec![
        TableColumn::left("Date"),
        TableColumn::right("Amount"),
        TableColumn::left("Category").max(20),
        TableColumn::left("Note").max(32),
        TableColumn::left("Id"),
    ]);
    let mut total = 0.0;
    for expense in &expenses {
        total += expense.amount;
        let category = expense
            .category_id
            .and_then(|id| context.book.category(id))
            .map(|category| category.name.clone())
            .unwrap_or_else(|| "-".into());
        let mut note = expense.description.clone().unwrap_or_default();
        if expense.is_auto_generated {
            note.push_str(" (auto)");
        }
        table.push(vec![
            expense.date.to_string(),
            money(symbol, expense.amount),
            category,
            note.trim().to_string(),
            short_id(expense.id),
        ]);
    }
    output::section(format!("Expenses for {}", month.long_label()));
    output::plain(table.render());
    output::plain(format!(
        "{} expense(s), total {}",
        expenses.len(),
        money(symbol, total)
    ));
    Ok(())
}

/// Accepts a full id or an unambiguous prefix of its simple form.
fn resolve_expense(context: &ShellContext, key: &str) -> Result<Uuid, CommandError> {
    if let Ok(id) = Uuid::parse_str(key) {
        return Ok(id);
    }
    let prefix = key.to_ascii_lowercase();
    let matches: Vec<Uuid> = context
        .book
        .expenses
        .iter()
        .map(|expense| expense.id)
        .filter(|id| id.simple().to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CommandError::Message(format!("no expense matches `{key}`"))),
        _ => Err(CommandError::Message(format!(
            "`{key}` matches {} expenses; use more characters",
            matches.len()
        ))),
    }
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [key] = args else {
        return Err(CommandError::usage("usage: expense remove <id>"));
    };
    let id = resolve_expense(context, key)?;
    let removed = ExpenseService::remove(&mut context.book, id, context.clock.as_ref())?;
    context.mark_dirty();
    output::success(format!("Removed expense {}", removed.display_label()));
    Ok(())
}

fn toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [key, day] = args else {
        return Err(CommandError::usage("usage: expense toggle <category> <YYYY-MM-DD>"));
    };
    let day = parse_date(day)?;
    let id = context.category(key)?.id;
    match ExpenseService::toggle_day(&mut context.book, id, day, context.clock.as_ref())? {
        ToggleOutcome::Recorded(expense_id) => {
            output::success(format!("Marked {day} as paid [{}]", short_id(expense_id)))
        }
        ToggleOutcome::Removed(count) => {
            output::success(format!("Cleared {count} expense(s) on {day}"))
        }
    }
    context.mark_dirty();
    Ok(())
}
