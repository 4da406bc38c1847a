use colored::Colorize;

use crate::cli::commands::{money, parse_month};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::core::services::{BudgetStatus, ReportService};
use crate::recurrence::YearMonth;

const BAR_WIDTH: usize = 20;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "budget",
        "Show spending against budget limits",
        "budget [YYYY-MM]\nbudget <category> [YYYY-MM]",
        cmd_budget,
    )]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => overview(context, context.current_month()),
        [raw] => match raw.parse::<YearMonth>() {
            Ok(month) => overview(context, month),
            Err(_) => single(context, raw, context.current_month()),
        },
        [key, raw] => single(context, key, parse_month(raw)?),
        _ => Err(CommandError::usage("usage: budget [category] [YYYY-MM]")),
    }
}

fn single(context: &ShellContext, key: &str, month: YearMonth) -> CommandResult {
    let id = context.category(key)?.id;
    let status = ReportService::budget_status(&context.book, id, month)?;
    print_status(&status, &context.config.currency_symbol);
    Ok(())
}

fn overview(context: &ShellContext, month: YearMonth) -> CommandResult {
    let statuses = ReportService::budget_overview(&context.book, month);
    if statuses.is_empty() {
        output::info("No active budget categories. Try `category add Food --budget 300`.");
        return Ok(());
    }
    let symbol = &context.config.currency_symbol;
    let mut table = Table::new(vec![
        TableColumn::left("Category").max(24),
        TableColumn::right("Spent"),
        TableColumn::right("Limit"),
        TableColumn::right("Used"),
        TableColumn::left("Status"),
    ]);
    for status in &statuses {
        table.push(vec![
            format!("{} {}", status.icon, status.name),
            money(symbol, status.spent),
            money(symbol, status.limit),
            format!("{:.0}%", status.percentage),
            standing(status, symbol),
        ]);
    }
    output::section(format!("Budgets for {}", month.long_label()));
    output::plain(table.render());
    let over = statuses.iter().filter(|status| status.over_budget).count();
    if over > 0 {
        output::warning(format!("{over} budget(s) exceeded"));
    }
    Ok(())
}

fn standing(status: &BudgetStatus, symbol: &str) -> String {
    if status.over_budget {
        format!("{} over", money(symbol, -status.remaining()))
    } else {
        format!("{} remaining", money(symbol, status.remaining()))
    }
}

/// Filled share of the bar, capped at full.
fn bar(percentage: f64) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub(crate) fn print_status(status: &BudgetStatus, symbol: &str) {
    output::section(format!(
        "{} {} · {}",
        status.icon,
        status.name,
        status.month.long_label()
    ));
    let gauge = bar(status.percentage);
    let gauge = if status.over_budget {
        gauge.red().to_string()
    } else {
        gauge.green().to_string()
    };
    output::plain(format!(
        "Spent {} / {}  {gauge}  {:.0}% used",
        money(symbol, status.spent),
        money(symbol, status.limit),
        status.percentage
    ));
    if status.over_budget {
        output::warning(standing(status, symbol));
    } else {
        output::plain(standing(status, symbol));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_capped_and_rounded() {
        assert_eq!(bar(0.0), format!("[{}]", "-".repeat(20)));
        assert_eq!(bar(50.0), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(bar(240.0), format!("[{}]", "#".repeat(20)));
    }
}
