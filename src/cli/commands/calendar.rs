use colored::Colorize;

use crate::cli::commands::budget::print_status;
use crate::cli::commands::category::short_id;
use crate::cli::commands::{money, parse_month};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{CategoryCalendarReport, ReportService};
use crate::domain::TrackingMode;
use crate::recurrence::{OccurrenceDay, OccurrenceLabel};

const WEEK_HEADER: &str = " Su   Mo   Tu   We   Th   Fr   Sa";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "calendar",
        "Show a category's month of expected and recorded days",
        "calendar <category> [YYYY-MM]",
        cmd_calendar,
    )]
}

fn cmd_calendar(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (key, month) = match args {
        [key] => (*key, context.current_month()),
        [key, raw] => (*key, parse_month(raw)?),
        _ => return Err(CommandError::usage("usage: calendar <category> [YYYY-MM]")),
    };
    let (id, mode) = {
        let category = context.category(key)?;
        (category.id, category.tracking_mode)
    };
    if mode == TrackingMode::Budget {
        let status = ReportService::budget_status(&context.book, id, month)?;
        print_status(&status, &context.config.currency_symbol);
        return Ok(());
    }
    let report = ReportService::category_calendar(&context.book, id, month, context.today())?;

    output::section(format!(
        "{} {} · {}",
        report.category.icon,
        report.category.name,
        month.long_label()
    ));
    output::plain(format!("Schedule: {}", report.category.schedule_label()));
    for line in render_grid(&report) {
        output::plain(line);
    }
    output::plain(legend());
    output::plain(summary(&report, &context.config.currency_symbol));
    for line in rejection_warnings(&report) {
        output::warning(line);
    }
    Ok(())
}

fn rejection_warnings(report: &CategoryCalendarReport) -> Vec<String> {
    report
        .projection
        .rejected
        .iter()
        .zip(&report.rejected_ids)
        .map(|(rejected, id)| {
            format!(
                "expense {} was left off the calendar: {}",
                short_id(*id),
                rejected.error
            )
        })
        .collect()
}

fn marker(label: OccurrenceLabel) -> char {
    match label {
        OccurrenceLabel::Ordered => '✓',
        OccurrenceLabel::Skipped => '✗',
        OccurrenceLabel::Planned => '•',
        OccurrenceLabel::NoPlan => ' ',
    }
}

fn cell(day: &OccurrenceDay) -> String {
    let label = day.label();
    let text = format!("{:>3}{}", day.day(), marker(label));
    match label {
        OccurrenceLabel::Ordered => text.green().to_string(),
        OccurrenceLabel::Skipped => text.red().to_string(),
        OccurrenceLabel::Planned => text.blue().to_string(),
        OccurrenceLabel::NoPlan => text.dimmed().to_string(),
    }
}

/// Sunday-first week rows, blank-padded before day 1.
fn render_grid(report: &CategoryCalendarReport) -> Vec<String> {
    let mut lines = vec![WEEK_HEADER.to_string()];
    let mut row: Vec<String> = (0..report.leading_offset()).map(|_| "    ".to_string()).collect();
    for day in &report.projection.days {
        row.push(cell(day));
        if row.len() == 7 {
            lines.push(row.join(" "));
            row.clear();
        }
    }
    if !row.is_empty() {
        lines.push(row.join(" "));
    }
    lines
}

fn legend() -> String {
    [
        OccurrenceLabel::Ordered,
        OccurrenceLabel::Skipped,
        OccurrenceLabel::Planned,
    ]
    .iter()
    .map(|label| format!("{} {}", marker(*label), label.as_str()))
    .collect::<Vec<_>>()
    .join("   ")
}

fn summary(report: &CategoryCalendarReport, symbol: &str) -> String {
    let projection = &report.projection;
    let mut line = format!(
        "Ordered: {}  Skipped: {}  Planned: {}  Total: {}",
        projection.count(OccurrenceLabel::Ordered),
        projection.count(OccurrenceLabel::Skipped),
        projection.count(OccurrenceLabel::Planned),
        money(symbol, report.total)
    );
    if let Some(amount) = report.fixed_amount() {
        line.push_str(&format!("  Fixed: {}", money(symbol, amount)));
    }
    line
}
