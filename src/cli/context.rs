use std::{env, fmt, io, sync::Arc};

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cli::{commands, help, output, registry::CommandRegistry},
    config::{Config, ConfigManager},
    core::{
        services::ServiceError,
        time::{Clock, FixedClock, SystemClock},
    },
    domain::{Book, Category},
    errors::{CliError, SpendError},
    recurrence::YearMonth,
    storage::{JsonStorage, StorageBackend},
    utils::PathResolver,
};

/// Pins the shell's notion of today, in `YYYY-MM-DD`.
pub const TODAY_ENV: &str = "SPENDWISE_TODAY";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Core(#[from] SpendError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    pub fn usage(message: impl fmt::Display) -> Self {
        CommandError::InvalidArguments(message.to_string())
    }
}

/// State shared by every command for the lifetime of one shell session.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub storage: JsonStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub book: Book,
    pub book_name: String,
    pub clock: Arc<dyn Clock>,
    pub running: bool,
    pub dirty: bool,
    pub last_command: Option<String>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = PathResolver::base_dir();
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load()?;
        let storage = JsonStorage::new(Some(base), None)?;
        let clock = clock_from_env()?;
        let book_name = config.default_book.clone();

        let book = match storage.load_with_report(&book_name)? {
            Some(report) => {
                for warning in &report.warnings {
                    output::warning(warning);
                }
                report.book
            }
            None => {
                debug!(book = %book_name, "starting empty book");
                Book::new(book_name.clone(), clock.now())
            }
        };

        Ok(Self {
            mode,
            registry: CommandRegistry::with_entries(commands::all_definitions()),
            storage,
            config_manager,
            config,
            book,
            book_name,
            clock,
            running: true,
            dirty: false,
            last_command: None,
        })
    }

    pub fn prompt(&self) -> String {
        let marker = if self.dirty { "*" } else { "" };
        format!("spendwise({}{marker})> ", self.book_name)
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn current_month(&self) -> YearMonth {
        YearMonth::containing(self.today())
    }

    /// Resolves a category by id or case-insensitive name.
    pub fn category(&self, key: &str) -> Result<&Category, CommandError> {
        Ok(crate::core::services::CategoryService::find(&self.book, key)?)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn save(&mut self) -> Result<(), CommandError> {
        let path = self.storage.save(&self.book, &self.book_name)?;
        self.dirty = false;
        info!(book = %self.book_name, path = %path.display(), "book saved");
        output::success(format!("Saved `{}` to {}", self.book_name, path.display()));
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn show_help(&self, args: &[&str]) {
        match args.first() {
            Some(name) => match self.registry.get(&name.to_ascii_lowercase()) {
                Some(entry) => help::print_command(entry),
                None => self.suggest_command(name),
            },
            None => help::print_overview(&self.registry),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &input.to_ascii_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    /// Asks for confirmation; script mode always proceeds.
    pub fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        self.confirm("Exit shell?")
            .map_err(|err| CliError::Command(err.to_string()))
    }

    /// Called once the loop ends: scripts persist silently, interactive
    /// sessions ask first.
    pub(crate) fn finish(&mut self) -> Result<(), CliError> {
        if !self.dirty {
            return Ok(());
        }
        let keep = match self.mode {
            CliMode::Script => true,
            CliMode::Interactive => self
                .confirm("Save changes before exiting?")
                .map_err(|err| CliError::Command(err.to_string()))?,
        };
        if keep {
            self.save().map_err(|err| CliError::Command(err.to_string()))?;
        }
        Ok(())
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }
}

fn clock_from_env() -> Result<Arc<dyn Clock>, CliError> {
    match env::var(TODAY_ENV) {
        Ok(raw) if !raw.trim().is_empty() => {
            let day = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| {
                CliError::Input(format!("{TODAY_ENV} must be YYYY-MM-DD: {err}"))
            })?;
            Ok(Arc::new(FixedClock::on(day)))
        }
        _ => Ok(Arc::new(SystemClock)),
    }
}
