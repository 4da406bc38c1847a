#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use spendwise_core::{config::ConfigManager, storage::JsonStorage};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Storage and config rooted in a fresh directory.
pub fn setup_test_env() -> (JsonStorage, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let storage = JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage");
    let config = ConfigManager::with_base_dir(base).expect("create config manager");
    (storage, config)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
