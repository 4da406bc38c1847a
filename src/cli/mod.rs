//! Interactive shell and script runner over a book.

pub mod commands;
pub mod context;
pub mod help;
pub mod output;
pub mod registry;
pub mod shell;
pub mod table;

pub use context::{CliMode, CommandError, ShellContext, TODAY_ENV};
pub use shell::{run_cli, SCRIPT_ENV};
