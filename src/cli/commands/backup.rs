use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::storage::StorageBackend;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("save", "Write the book to disk", "save", cmd_save),
        CommandEntry::new(
            "backup",
            "Create, list or restore book backups",
            "backup [create] [note]\nbackup list\nbackup restore <file|number>",
            cmd_backup,
        ),
    ]
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if !args.is_empty() {
        return Err(CommandError::usage("usage: save"));
    }
    context.save()
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["list"] => list(context),
        ["restore", target] => restore(context, target),
        ["create", note @ ..] => create(context, note),
        note => create(context, note),
    }
}

fn create(context: &mut ShellContext, note: &[&str]) -> CommandResult {
    let note = note.join(" ");
    let note = Some(note.trim()).filter(|text| !text.is_empty());
    let name = context
        .storage
        .backup(&context.book, &context.book_name, note)?;
    output::success(format!("Backup created: {name}"));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let backups = context.storage.list_backups(&context.book_name)?;
    if backups.is_empty() {
        output::info("No backups yet.");
        return Ok(());
    }
    output::section(format!("Backups of `{}`", context.book_name));
    for (idx, name) in backups.iter().enumerate() {
        output::plain(format!("  {:>2}. {name}", idx + 1));
    }
    Ok(())
}

/// `target` is a file name or a 1-based position from `backup list`.
fn restore(context: &mut ShellContext, target: &str) -> CommandResult {
    let backups = context.storage.list_backups(&context.book_name)?;
    let name = match target.parse::<usize>() {
        Ok(position) => backups
            .get(position.wrapping_sub(1))
            .cloned()
            .ok_or_else(|| CommandError::Message(format!("no backup number {position}")))?,
        Err(_) => target.to_string(),
    };
    if !context.confirm(&format!("Replace the current book with `{name}`?"))? {
        output::info("Restore cancelled.");
        return Ok(());
    }
    context.book = context.storage.restore(&context.book_name, &name)?;
    context.dirty = false;
    output::success(format!("Restored `{}` from {name}", context.book_name));
    Ok(())
}
