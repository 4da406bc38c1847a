//! Inline-styled HTML bodies for report e-mails.

use crate::core::services::{CategoryCalendarReport, Digest, SpendingBreakdown};
use crate::domain::ReportFrequency;
use crate::recurrence::{OccurrenceDay, OccurrenceLabel, YearMonth};

const WEEKDAY_INITIALS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];
const ACCENT: &str = "#8B5CF6";

/// Presentation settings shared by all report bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub currency_symbol: String,
    pub recipient_name: String,
    pub app_url: String,
}

impl RenderContext {
    pub fn new(currency_symbol: impl Into<String>, recipient_name: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            recipient_name: recipient_name.into(),
            app_url: String::new(),
        }
    }

    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.app_url = url.into();
        self
    }

    fn money(&self, amount: f64, decimals: usize) -> String {
        format!("{}{:.*}", escape_html(&self.currency_symbol), decimals, amount)
    }
}

/// Cell and badge colours for one label: (background, text).
struct Swatch {
    background: &'static str,
    foreground: &'static str,
}

fn swatch(label: OccurrenceLabel) -> Swatch {
    match label {
        OccurrenceLabel::Ordered => Swatch {
            background: "#dcfce7",
            foreground: "#166534",
        },
        OccurrenceLabel::Skipped => Swatch {
            background: "#fee2e2",
            foreground: "#991b1b",
        },
        OccurrenceLabel::Planned => Swatch {
            background: "#e0f2fe",
            foreground: "#0369a1",
        },
        OccurrenceLabel::NoPlan => Swatch {
            background: "#f3f4f6",
            foreground: "#6b7280",
        },
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn category_report_subject(category_name: &str, month: YearMonth) -> String {
    format!(
        "SpendWise Category Report: {} ({})",
        category_name,
        month.short_label()
    )
}

pub fn monthly_analysis_subject(month: YearMonth) -> String {
    format!("Analysis Hub: {} Report", month.long_label())
}

pub fn digest_subject(frequency: ReportFrequency) -> String {
    format!("Your SpendWise {} Report", frequency.as_str())
}

fn day_cell(day: &OccurrenceDay, fixed_amount: Option<f64>) -> String {
    let label = day.label();
    let colours = swatch(label);
    let border = match label {
        OccurrenceLabel::NoPlan => "transparent",
        _ => colours.foreground,
    };
    let badge = match fixed_amount {
        Some(amount) if day.recorded || day.expected => format!(
            r#"<div class="badge" style="position: absolute; top: -5px; right: -5px; background: {}; color: #ffffff; font-size: 7px; padding: 1px 3px; border-radius: 4px; font-weight: bold;">{}</div>"#,
            colours.foreground, amount
        ),
        _ => String::new(),
    };
    format!(
        r#"<td class="day {}" style="padding: 8px; text-align: center;"><div style="position: relative; width: 32px; height: 32px; margin: 0 auto;"><div style="width: 32px; height: 32px; line-height: 32px; border-radius: 8px; background: {}; color: {}; border: 1px solid {}; font-size: 12px; font-weight: bold;">{}</div>{}</div></td>"#,
        label_class(label),
        colours.background,
        colours.foreground,
        border,
        day.day(),
        badge
    )
}

fn label_class(label: OccurrenceLabel) -> &'static str {
    match label {
        OccurrenceLabel::Ordered => "ordered",
        OccurrenceLabel::Skipped => "skipped",
        OccurrenceLabel::Planned => "planned",
        OccurrenceLabel::NoPlan => "no-plan",
    }
}

fn legend() -> String {
    let items: String = [
        (OccurrenceLabel::Ordered, "Ordered"),
        (OccurrenceLabel::Skipped, "Skipped"),
        (OccurrenceLabel::Planned, "Planned"),
        (OccurrenceLabel::NoPlan, "No Plan"),
    ]
    .into_iter()
    .map(|(label, text)| {
        let colours = swatch(label);
        format!(
            r#"<span style="display: inline-flex; align-items: center; gap: 4px; margin-right: 15px;"><span style="width: 12px; height: 12px; background: {}; border-radius: 3px; display: inline-block;"></span>{}</span>"#,
            colours.background, text
        )
    })
    .collect();
    format!(r#"<div class="legend" style="margin-top: 25px; font-size: 11px;">{items}</div>"#)
}

/// Month grid for one category: Sunday-first weeks, blank leading cells,
/// a coloured cell per day and a legend.
pub fn render_category_calendar(report: &CategoryCalendarReport, ctx: &RenderContext) -> String {
    let offset = report.leading_offset() as usize;
    let mut cells: Vec<String> = vec!["<td></td>".to_string(); offset];
    cells.extend(
        report
            .projection
            .days
            .iter()
            .map(|day| day_cell(day, report.fixed_amount())),
    );
    while cells.len() % 7 != 0 {
        cells.push("<td></td>".to_string());
    }
    let rows: String = cells
        .chunks(7)
        .map(|week| format!("<tr>{}</tr>", week.concat()))
        .collect();
    let header: String = WEEKDAY_INITIALS
        .iter()
        .map(|initial| {
            format!(
                r#"<th style="padding: 10px; text-align: center; font-size: 12px; color: #6b7280;">{initial}</th>"#
            )
        })
        .collect();

    format!(
        r#"<div style="font-family: 'Inter', sans-serif; max-width: 500px; margin: 0 auto; padding: 20px; color: #333; border: 1px solid #eee; border-radius: 16px;">
<p>Hello {name},</p>
<h2 style="color: {accent}; margin-bottom: 5px;">{icon} {category}</h2>
<p style="color: #6b7280; font-size: 14px; margin-top: 0;">Monthly Report: {month}</p>
<div style="margin: 20px 0; background: #fafafa; border-radius: 12px; padding: 15px; text-align: center; border: 1px dashed #ddd;"><span style="display: block; font-size: 12px; color: #6b7280; text-transform: uppercase;">Total Amount</span><span class="total" style="font-size: 28px; font-weight: bold; color: #111827;">{total}</span></div>
<table class="calendar" style="width: 100%; border-collapse: collapse;"><thead><tr>{header}</tr></thead><tbody>{rows}</tbody></table>
{legend}
<p style="text-align: center; color: #9ca3af; font-size: 10px; margin-top: 30px;">Generated by SpendWise. Your digital expense companion.</p>
</div>"#,
        name = escape_html(&ctx.recipient_name),
        accent = ACCENT,
        icon = escape_html(&report.category.icon),
        category = escape_html(&report.category.name),
        month = report.month().long_label(),
        total = ctx.money(report.total, 0),
        header = header,
        rows = rows,
        legend = legend(),
    )
}

fn breakdown_rows(breakdown: &SpendingBreakdown, ctx: &RenderContext) -> String {
    breakdown
        .entries
        .iter()
        .map(|entry| {
            format!(
                r#"<tr class="entry"><td style="padding: 12px; border-bottom: 1px solid #eee;"><span style="display: inline-block; width: 10px; height: 10px; border-radius: 50%; background: {}; margin-right: 6px;"></span>{}</td><td style="padding: 12px; border-bottom: 1px solid #eee; text-align: right;">{}</td><td style="padding: 12px; border-bottom: 1px solid #eee; text-align: right;">{:.1}%</td></tr>"#,
                escape_html(&entry.color),
                escape_html(&entry.name),
                ctx.money(entry.amount, 2),
                entry.percentage
            )
        })
        .collect()
}

/// Body of the periodic digest e-mail.
pub fn render_digest(digest: &Digest, ctx: &RenderContext) -> String {
    let duration = match digest.frequency {
        ReportFrequency::Weekly => "Weekly",
        ReportFrequency::Monthly => "Monthly",
    };
    render_breakdown_body(
        &format!("SpendWise {duration} Report"),
        &format!(
            "{} to {}",
            digest.breakdown.period_start.format("%d %b %Y"),
            digest.breakdown.period_end.format("%d %b %Y")
        ),
        &digest.breakdown,
        ctx,
        None,
    )
}

/// Body of the monthly analysis e-mail, with a link back to the app.
pub fn render_monthly_analysis(
    month: YearMonth,
    breakdown: &SpendingBreakdown,
    ctx: &RenderContext,
) -> String {
    let link = (!ctx.app_url.is_empty()).then(|| {
        format!(
            "{}/api/reports/download?month={}",
            ctx.app_url.trim_end_matches('/'),
            month
        )
    });
    render_breakdown_body(
        "Monthly Analysis Hub",
        &format!("{} Financial Insights", month.long_label()),
        breakdown,
        ctx,
        link.as_deref(),
    )
}

fn render_breakdown_body(
    title: &str,
    subtitle: &str,
    breakdown: &SpendingBreakdown,
    ctx: &RenderContext,
    download_link: Option<&str>,
) -> String {
    let action = download_link
        .map(|href| {
            format!(
                r#"<p style="text-align: center; margin-top: 30px;"><a href="{}" style="background: {}; color: white; padding: 14px 28px; border-radius: 12px; text-decoration: none; font-weight: 800;">Download PDF Report</a></p>"#,
                escape_html(href),
                ACCENT
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div style="font-family: 'Inter', sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; color: #333;">
<h1 style="color: {accent}; border-bottom: 2px solid {accent}; padding-bottom: 10px;">{title}</h1>
<p style="color: #6b7280;">{subtitle}</p>
<p>Hello {name}, here is your expense summary.</p>
<div style="background: #f9fafb; padding: 20px; border-radius: 12px; margin: 20px 0;"><h2 style="margin-top: 0; font-size: 16px; color: #6b7280;">TOTAL SPENT</h2><p class="total" style="font-size: 32px; font-weight: bold; margin: 0; color: #111827;">{total}</p><p style="font-size: 14px; color: #64748b;">Across {count} transactions</p></div>
<h3>Category Breakdown</h3>
<table class="breakdown" style="width: 100%; border-collapse: collapse;"><thead><tr style="background: #f3f4f6;"><th style="padding: 12px; text-align: left;">Category</th><th style="padding: 12px; text-align: right;">Amount</th><th style="padding: 12px; text-align: right;">%</th></tr></thead><tbody>{rows}</tbody></table>
<div class="highest" style="margin-top: 20px; padding: 15px; background: #e0f2fe; border-radius: 8px;"><strong>Highest Spending Category:</strong> {highest}</div>
{action}
<p style="text-align: center; color: #9ca3af; font-size: 12px; margin-top: 40px;">Sent by SpendWise. You can manage your report settings in the app.</p>
</div>"#,
        accent = ACCENT,
        title = escape_html(title),
        subtitle = escape_html(subtitle),
        name = escape_html(&ctx.recipient_name),
        total = ctx.money(breakdown.total, 2),
        count = breakdown.transaction_count,
        rows = breakdown_rows(breakdown, ctx),
        highest = escape_html(&breakdown.highest_category),
        action = action,
    )
}
