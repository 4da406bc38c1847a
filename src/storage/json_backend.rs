use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::{
    domain::{Book, CURRENT_SCHEMA_VERSION},
    errors::SpendError,
    recurrence::Dated,
    utils::{ensure_dir, PathResolver},
};

use super::{Result, StorageBackend};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_DATE_FORMAT: &str = "%Y%m%d";
const BACKUP_TIME_FORMAT: &str = "%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// A loaded book plus data-quality warnings found while reading it.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub book: Book,
    pub warnings: Vec<String>,
}

/// Stores each book as a pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    books_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let books_dir = PathResolver::book_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&books_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            books_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.{}", canonical_name(name), BACKUP_EXTENSION))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    /// Like [`StorageBackend::load`] but also returns data-quality warnings.
    pub fn load_with_report(&self, name: &str) -> Result<Option<LoadReport>> {
        Ok(self.load(name)?.map(|book| {
            let warnings = book_warnings(&book);
            for warning in &warnings {
                warn!(book = %name, "{warning}");
            }
            LoadReport { book, warnings }
        }))
    }

    /// Saved book names (file stems), sorted.
    pub fn list_books(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn write_backup(&self, name: &str, note: Option<&str>, json: &str) -> Result<String> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let now = Utc::now();
        let stamp = format!(
            "{}_{}",
            now.format(BACKUP_DATE_FORMAT),
            now.format(BACKUP_TIME_FORMAT)
        );
        let label = sanitize_backup_note(note);

        let mut sequence = 0u32;
        let file_name = loop {
            let time = if sequence == 0 {
                stamp.clone()
            } else {
                format!("{stamp}-{sequence}")
            };
            let mut stem = format!("{}_{}", canonical_name(name), time);
            if let Some(label) = &label {
                stem.push('_');
                stem.push_str(label);
            }
            let candidate = format!("{stem}.{BACKUP_EXTENSION}");
            if !dir.join(&candidate).exists() {
                break candidate;
            }
            sequence += 1;
        };

        write_atomic(&dir.join(&file_name), json)?;
        debug!(book = %name, backup = %file_name, "backup written");
        self.prune_backups(name)?;
        Ok(file_name)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(name, entry);
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self, name: &str) -> Result<Option<Book>> {
        let path = self.book_path(name);
        if !path.exists() {
            return Ok(None);
        }
        load_book_from_path(&path).map(Some)
    }

    /// Writes the book atomically, backing up the previous file first.
    fn save(&self, book: &Book, name: &str) -> Result<PathBuf> {
        let path = self.book_path(name);
        if path.exists() {
            let previous = fs::read_to_string(&path)?;
            self.write_backup(name, None, &previous)?;
        }
        save_book_to_path(book, &path)?;
        info!(book = %name, path = %path.display(), "book saved");
        Ok(path)
    }

    fn backup(&self, book: &Book, name: &str, note: Option<&str>) -> Result<String> {
        let json = serde_json::to_string_pretty(book)?;
        self.write_backup(name, note, &json)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(file_name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b)
                .cmp(&parse_backup_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Book> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(SpendError::StorageError(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let book = load_book_from_path(&backup_path)?;
        self.save(&book, name)?;
        info!(book = %name, backup = %backup_name, "book restored");
        Ok(book)
    }
}

pub fn save_book_to_path(book: &Book, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(book)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_book_from_path(path: &Path) -> Result<Book> {
    let data = fs::read_to_string(path)?;
    let book: Book = serde_json::from_str(&data)?;
    if book.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(SpendError::StorageError(format!(
            "`{}` uses schema version {} but this build only reads up to {}",
            path.display(),
            book.schema_version,
            CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(book)
}

/// Problems that do not stop a book from loading but make some records
/// invisible to reports.
pub fn book_warnings(book: &Book) -> Vec<String> {
    let category_ids: HashSet<_> = book.categories.iter().map(|c| c.id).collect();
    let mut warnings = Vec::new();

    for category in &book.categories {
        if let Err(err) = category.recurrence_rule() {
            warnings.push(format!(
                "category {} ({}) has an invalid recurrence rule: {}",
                category.id, category.name, err
            ));
        }
    }
    for expense in &book.expenses {
        if let Some(category) = expense.category_id {
            if !category_ids.contains(&category) {
                warnings.push(format!(
                    "expense {} references missing category {}",
                    expense.id, category
                ));
            }
        }
        if let Err(err) = expense.calendar_day() {
            warnings.push(format!("expense {}: {}", expense.id, err));
        }
    }
    warnings
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "book".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Finds the `<date>_<time>[-seq]` pair in a backup file name. Notes never
/// contain underscores, so the pair is the last one that parses.
fn parse_backup_timestamp(file_name: &str) -> Option<(DateTime<Utc>, u32)> {
    let stem = file_name.strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    let parts: Vec<&str> = stem.split('_').collect();
    parts.windows(2).rev().find_map(|pair| {
        let (time, sequence) = match pair[1].split_once('-') {
            Some((time, seq)) => (time, seq.parse().ok()?),
            None => (pair[1], 0),
        };
        if !is_digits(pair[0], 8) || !is_digits(time, 9) {
            return None;
        }
        NaiveDateTime::parse_from_str(&format!("{}{}", pair[0], time), "%Y%m%d%H%M%S%3f")
            .ok()
            .map(|naive| (DateTime::from_naive_utc_and_offset(naive, Utc), sequence))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
