use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::domain::CURRENT_SCHEMA_VERSION;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("help", "Show available commands", "help [command]", cmd_help),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.show_help(args);
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("SpendWise {}", meta.version));
    output::plain(format!("  Schema ver   : v{CURRENT_SCHEMA_VERSION}"));
    output::plain(format!("  Build hash   : {} ({})", meta.git_hash, meta.git_status));
    output::plain(format!("  Built at     : {}", meta.timestamp));
    output::plain(format!("  Target       : {}", meta.target));
    output::plain(format!("  Profile      : {}", meta.profile));
    output::plain(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
