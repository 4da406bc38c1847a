pub mod backup;
pub mod budget;
pub mod calendar;
pub mod category;
pub mod expense;
pub mod report;
pub mod settings;
pub mod system;

use std::str::FromStr;

use chrono::NaiveDate;

use crate::cli::context::CommandError;
use crate::cli::registry::CommandEntry;
use crate::recurrence::YearMonth;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(category::definitions());
    commands.extend(expense::definitions());
    commands.extend(calendar::definitions());
    commands.extend(budget::definitions());
    commands.extend(report::definitions());
    commands.extend(settings::definitions());
    commands.extend(backup::definitions());
    commands
}

/// Positional words and `--flag [value]` pairs of one command line.
///
/// A flag takes the next token as its value unless that token is itself a
/// flag; switches such as `--send` therefore have no value.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    flags: Vec<(&'a str, Option<&'a str>)>,
}

impl<'a> ParsedArgs<'a> {
    pub fn parse(args: &[&'a str]) -> Self {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied().peekable();
        while let Some(token) = iter.next() {
            match token.strip_prefix("--") {
                Some(name) if !name.is_empty() => {
                    let value = match iter.peek() {
                        Some(next) if !next.starts_with("--") => iter.next(),
                        _ => None,
                    };
                    parsed.flags.push((name, value));
                }
                _ => parsed.positional.push(token),
            }
        }
        parsed
    }

    pub fn has(&self, name: &str) -> bool {
        self.flags.iter().any(|(flag, _)| *flag == name)
    }

    pub fn value(&self, name: &str) -> Result<Option<&'a str>, CommandError> {
        match self.flags.iter().rev().find(|(flag, _)| *flag == name) {
            None => Ok(None),
            Some((_, Some(value))) => Ok(Some(*value)),
            Some((_, None)) => Err(CommandError::usage(format!("`--{name}` needs a value"))),
        }
    }

    pub fn parsed<T>(&self, name: &str) -> Result<Option<T>, CommandError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.value(name)?
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|err| CommandError::usage(format!("invalid `--{name}` value: {err}")))
            })
            .transpose()
    }

    /// Rejects flags outside `allowed`.
    pub fn only(&self, allowed: &[&str]) -> Result<(), CommandError> {
        match self.flags.iter().find(|(flag, _)| !allowed.contains(flag)) {
            Some((flag, _)) => Err(CommandError::usage(format!("unknown option `--{flag}`"))),
            None => Ok(()),
        }
    }
}

pub(crate) fn parse_month(raw: &str) -> Result<YearMonth, CommandError> {
    raw.parse::<YearMonth>()
        .map_err(|err| CommandError::usage(format!("invalid month `{raw}`: {err}")))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| CommandError::usage(format!("invalid date `{raw}` (use YYYY-MM-DD): {err}")))
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, CommandError> {
    raw.parse::<f64>()
        .map_err(|err| CommandError::usage(format!("invalid amount `{raw}`: {err}")))
}

pub(crate) fn parse_switch(raw: &str) -> Result<bool, CommandError> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(CommandError::usage(format!("expected on/off, got `{other}`"))),
    }
}

/// Parses `mon,wed` or `1,3` into weekday indices (Sunday = 0).
pub(crate) fn parse_days(raw: &str) -> Result<Vec<u8>, CommandError> {
    const NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let lower = part.to_ascii_lowercase();
            if let Some(idx) = NAMES.iter().position(|name| lower.starts_with(name)) {
                return Ok(idx as u8);
            }
            lower
                .parse::<u8>()
                .map_err(|_| CommandError::usage(format!("unknown weekday `{part}`")))
        })
        .collect()
}

pub(crate) fn money(symbol: &str, amount: f64) -> String {
    format!("{symbol}{amount:.2}")
}
