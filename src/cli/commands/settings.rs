use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::config::Config;
use crate::core::services::{ReportSettingsUpdate, SettingsService};
use crate::domain::ReportFrequency;

const REPORT_KEYS: [&str; 4] = ["email", "name", "frequency", "day"];

const USAGE: &str = "settings show
settings set <key> <value>
  report keys: email, name, frequency (weekly|monthly), day (0-6 weekly, 1-31 monthly)
  config keys: locale, currency_symbol, currency_code, sender_address, app_url, default_book
  `none` clears email and name";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "settings",
        "Show or change report and app settings",
        USAGE,
        cmd_settings,
    )]
}

fn cmd_settings(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => show(context),
        ["set", key, value @ ..] if !value.is_empty() => set(context, key, &value.join(" ")),
        _ => Err(CommandError::usage("usage: settings show | settings set <key> <value>")),
    }
}

fn show(context: &mut ShellContext) -> CommandResult {
    let settings = &context.book.settings;
    output::section("Report settings");
    output::plain(format!(
        "  {:<16} {}",
        "email",
        settings.email.as_deref().unwrap_or("(not set)")
    ));
    output::plain(format!(
        "  {:<16} {}",
        "name",
        settings.display_name.as_deref().unwrap_or("(not set)")
    ));
    output::plain(format!("  {:<16} {}", "frequency", settings.frequency));
    output::plain(format!("  {:<16} {}", "day", settings.report_day));

    output::section(format!("Config ({})", context.config_manager.path().display()));
    for key in Config::KEYS {
        output::plain(format!(
            "  {:<16} {}",
            key,
            context.config.get(key).unwrap_or_default()
        ));
    }
    Ok(())
}

fn clearable(value: &str) -> Option<String> {
    if value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

fn set(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let key = key.to_ascii_lowercase();
    if REPORT_KEYS.contains(&key.as_str()) {
        let mut changes = ReportSettingsUpdate::default();
        match key.as_str() {
            "email" => changes.email = Some(clearable(value)),
            "name" => changes.display_name = Some(clearable(value)),
            "frequency" => {
                let frequency = value
                    .parse::<ReportFrequency>()
                    .map_err(CommandError::InvalidArguments)?;
                changes.frequency = Some(frequency);
                // Keep the day valid when switching cadence.
                if !frequency.day_range().contains(&context.book.settings.report_day) {
                    changes.report_day = Some(*frequency.day_range().start());
                }
            }
            _ => {
                let day = value
                    .parse::<u32>()
                    .map_err(|err| CommandError::usage(format!("invalid day `{value}`: {err}")))?;
                changes.report_day = Some(day);
            }
        }
        SettingsService::update(&mut context.book, changes, context.clock.as_ref())?;
        context.mark_dirty();
        output::success(format!("Report setting `{key}` updated"));
        return Ok(());
    }

    let mut next = context.config.clone();
    next.set(&key, value)?;
    context.config_manager.save(&next)?;
    context.config = next;
    output::success(format!("Config `{key}` set to `{value}`"));
    if key == "default_book" {
        output::hint("The new default book is used the next time the shell starts.");
    }
    Ok(())
}
