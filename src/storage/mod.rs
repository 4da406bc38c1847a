pub mod json_backend;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{domain::Book, errors::SpendError};

pub type Result<T> = std::result::Result<T, SpendError>;

/// Persistence for books and their backups.
pub trait StorageBackend: Send + Sync {
    /// `Ok(None)` when no book with that name has been saved yet.
    fn load(&self, name: &str) -> Result<Option<Book>>;
    fn save(&self, book: &Book, name: &str) -> Result<PathBuf>;
    /// Returns the file name of the new backup.
    fn backup(&self, book: &Book, name: &str, note: Option<&str>) -> Result<String>;
    /// Backup file names, newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Book>;

    /// Loads the book or starts an empty one named `name`.
    fn load_or_new(&self, name: &str, now: DateTime<Utc>) -> Result<Book> {
        Ok(self
            .load(name)?
            .unwrap_or_else(|| Book::new(name, now)))
    }
}

pub use json_backend::{book_warnings, JsonStorage, LoadReport};
