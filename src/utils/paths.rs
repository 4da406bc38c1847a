use std::{
    env,
    path::{Path, PathBuf},
};

pub const HOME_ENV: &str = "SPENDWISE_HOME";
const DEFAULT_DIR_NAME: &str = ".spendwise";

/// Layout of the data directory:
///
/// ```text
/// <base>/config.json
/// <base>/books/<slug>.json
/// <base>/backups/<slug>/<slug>_<date>_<time>[_note].json
/// <base>/outbox/<id>.json
/// ```
pub struct PathResolver;

impl PathResolver {
    /// `SPENDWISE_HOME`, else `~/.spendwise`, else `./.spendwise`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return PathBuf::from(custom);
        }
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR_NAME))
    }

    pub fn resolve_base(explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(Self::base_dir)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join("config.json")
    }

    pub fn book_dir_in(base: &Path) -> PathBuf {
        base.join("books")
    }

    pub fn backup_dir_in(base: &Path) -> PathBuf {
        base.join("backups")
    }

    pub fn outbox_dir_in(base: &Path) -> PathBuf {
        base.join("outbox")
    }
}
