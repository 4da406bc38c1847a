use std::{fs, path::Path};

use crate::cli::commands::{money, parse_month, ParsedArgs};
use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::core::services::{ReportService, SpendingBreakdown};
use crate::domain::TrackingMode;
use crate::notify::{Mailer, OutboxMailer, OutgoingMessage, ReportComposer};
use crate::recurrence::OccurrenceLabel;
use crate::report::{self, RenderContext};
use crate::utils::PathResolver;

const USAGE: &str = "report category <category> [YYYY-MM] [--send] [--out FILE]
report monthly [YYYY-MM] [--send] [--out FILE]
report digest [--send] [--out FILE]
report outbox";

const FLAGS: &[&str] = &["send", "out"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "report",
        "Preview, export or queue report e-mails",
        USAGE,
        cmd_report,
    )]
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(CommandError::usage(
            "usage: report <category|monthly|digest|outbox>",
        ));
    };
    match action.to_ascii_lowercase().as_str() {
        "category" => category(context, rest),
        "monthly" => monthly(context, rest),
        "digest" => digest(context, rest),
        "outbox" => outbox(context),
        other => Err(CommandError::usage(format!("unknown report `{other}`"))),
    }
}

fn preview_context(context: &ShellContext) -> RenderContext {
    RenderContext::new(
        context.config.currency_symbol.clone(),
        context.book.settings.greeting_name(),
    )
    .with_app_url(context.config.app_url.clone())
}

fn outbox_mailer(context: &ShellContext) -> Result<OutboxMailer, CommandError> {
    Ok(OutboxMailer::new(PathResolver::outbox_dir_in(
        context.storage.base_dir(),
    ))?)
}

fn deliver(context: &ShellContext, message: OutgoingMessage) -> CommandResult {
    let receipt = outbox_mailer(context)?.send(&message)?;
    output::success(format!("Queued \"{}\" for {}", message.subject, message.to));
    if let Some(location) = receipt.location {
        output::info(format!("Outbox file: {location}"));
    }
    Ok(())
}

fn export(path: &str, html: &str) -> CommandResult {
    fs::write(Path::new(path), html)?;
    output::success(format!("Wrote {path}"));
    Ok(())
}

fn category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    parsed.only(FLAGS)?;
    let (key, month) = match parsed.positional.as_slice() {
        [key] => (*key, context.current_month()),
        [key, raw] => (*key, parse_month(raw)?),
        _ => {
            return Err(CommandError::usage(
                "usage: report category <category> [YYYY-MM] [--send] [--out FILE]",
            ))
        }
    };
    let id = context.category(key)?.id;
    let calendar = ReportService::category_calendar(&context.book, id, month, context.today())?;
    let projection = &calendar.projection;

    output::section(report::category_report_subject(&calendar.category.name, month));
    output::plain(format!(
        "Ordered: {}  Skipped: {}  Planned: {}  Total: {}",
        projection.count(OccurrenceLabel::Ordered),
        projection.count(OccurrenceLabel::Skipped),
        projection.count(OccurrenceLabel::Planned),
        money(&context.config.currency_symbol, calendar.total)
    ));
    if calendar.category.tracking_mode == TrackingMode::Budget {
        let status = ReportService::budget_status(&context.book, id, month)?;
        output::plain(format!(
            "Budget: {} of {} ({:.0}% used{})",
            money(&context.config.currency_symbol, status.spent),
            money(&context.config.currency_symbol, status.limit),
            status.percentage,
            if status.over_budget { ", over budget" } else { "" }
        ));
    }

    if let Some(path) = parsed.value("out")? {
        export(path, &report::render_category_calendar(&calendar, &preview_context(context)))?;
    }
    if parsed.has("send") {
        let message = ReportComposer::new(&context.config, &context.book.settings)
            .category_calendar(&calendar)?;
        deliver(context, message)?;
    }
    Ok(())
}

fn monthly(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    parsed.only(FLAGS)?;
    let month = match parsed.positional.as_slice() {
        [] => context.current_month(),
        [raw] => parse_month(raw)?,
        _ => return Err(CommandError::usage("usage: report monthly [YYYY-MM] [--send] [--out FILE]")),
    };
    let breakdown = ReportService::monthly_analysis(&context.book, month);

    output::section(report::monthly_analysis_subject(month));
    print_breakdown(context, &breakdown);

    if let Some(path) = parsed.value("out")? {
        let html = report::render_monthly_analysis(month, &breakdown, &preview_context(context));
        export(path, &html)?;
    }
    if parsed.has("send") {
        let message = ReportComposer::new(&context.config, &context.book.settings)
            .monthly_analysis(month, &breakdown)?;
        deliver(context, message)?;
    }
    Ok(())
}

fn digest(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args);
    parsed.only(FLAGS)?;
    if !parsed.positional.is_empty() {
        return Err(CommandError::usage("usage: report digest [--send] [--out FILE]"));
    }
    let Some(digest) = ReportService::due_digest(&context.book, context.today()) else {
        let settings = &context.book.settings;
        output::info(format!(
            "No {} digest due today (report day {}, or nothing to report).",
            settings.frequency.as_str().to_lowercase(),
            settings.report_day
        ));
        return Ok(());
    };

    output::section(report::digest_subject(digest.frequency));
    print_breakdown(context, &digest.breakdown);

    if let Some(path) = parsed.value("out")? {
        export(path, &report::render_digest(&digest, &preview_context(context)))?;
    }
    if parsed.has("send") {
        let message =
            ReportComposer::new(&context.config, &context.book.settings).digest(&digest)?;
        deliver(context, message)?;
    }
    Ok(())
}

fn outbox(context: &mut ShellContext) -> CommandResult {
    let pending = outbox_mailer(context)?.pending()?;
    if pending.is_empty() {
        output::info("Outbox is empty.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Queued"),
        TableColumn::left("To").max(32),
        TableColumn::left("Subject").max(48),
    ]);
    for entry in &pending {
        table.push(vec![
            entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            entry.message.to.clone(),
            entry.message.subject.clone(),
        ]);
    }
    output::section(format!("Outbox ({})", pending.len()));
    output::plain(table.render());
    Ok(())
}

fn print_breakdown(context: &ShellContext, breakdown: &SpendingBreakdown) {
    let symbol = &context.config.currency_symbol;
    output::plain(format!(
        "{} to {}: {} across {} expense(s)",
        breakdown.period_start,
        breakdown.period_end,
        money(symbol, breakdown.total),
        breakdown.transaction_count
    ));
    if breakdown.is_empty() {
        output::info("No spending in this period.");
    } else {
        let mut table = Table::new(vec![
            TableColumn::left("Category").max(24),
            TableColumn::right("Amount"),
            TableColumn::right("Share"),
        ]);
        for entry in &breakdown.entries {
            table.push(vec![
                entry.name.clone(),
                money(symbol, entry.amount),
                format!("{:.1}%", entry.percentage),
            ]);
        }
        output::plain(table.render());
        output::plain(format!("Highest: {}", breakdown.highest_category));
    }
    if breakdown.skipped_records > 0 {
        output::warning(format!(
            "{} expense(s) skipped because their date could not be read",
            breakdown.skipped_records
        ));
    }
}
