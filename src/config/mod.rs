use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    errors::SpendError,
    utils::{ensure_dir, PathResolver},
};

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency_symbol: String,
    pub currency_code: String,
    /// Address used in the `From` header of outgoing reports.
    pub sender_address: String,
    /// Linked from report footers.
    pub app_url: String,
    pub default_book: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency_symbol: "₹".into(),
            currency_code: "INR".into(),
            sender_address: "reports@spendwise.local".into(),
            app_url: "http://localhost:3000".into(),
            default_book: "personal".into(),
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 6] = [
        "locale",
        "currency_symbol",
        "currency_code",
        "sender_address",
        "app_url",
        "default_book",
    ];

    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "locale" => &self.locale,
            "currency_symbol" => &self.currency_symbol,
            "currency_code" => &self.currency_code,
            "sender_address" => &self.sender_address,
            "app_url" => &self.app_url,
            "default_book" => &self.default_book,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SpendError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SpendError::ConfigError(format!("`{key}` cannot be empty")));
        }
        let slot = match key {
            "locale" => &mut self.locale,
            "currency_symbol" => &mut self.currency_symbol,
            "currency_code" => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(SpendError::ConfigError(format!(
                        "currency code `{value}` must be three letters"
                    )));
                }
                self.currency_code = value.to_ascii_uppercase();
                return Ok(());
            }
            "sender_address" => {
                if !value.contains('@') {
                    return Err(SpendError::ConfigError(format!(
                        "sender address `{value}` is not an e-mail address"
                    )));
                }
                &mut self.sender_address
            }
            "app_url" => &mut self.app_url,
            "default_book" => &mut self.default_book,
            other => {
                return Err(SpendError::ConfigError(format!(
                    "unknown setting `{other}` (expected one of {})",
                    Self::KEYS.join(", ")
                )))
            }
        };
        *slot = value.to_string();
        Ok(())
    }

    /// `"SpendWise Reports" <address>`
    pub fn sender(&self) -> String {
        format!("\"SpendWise Reports\" <{}>", self.sender_address)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, SpendError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, SpendError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    /// Reads the config file, falling back to defaults when none exists.
    pub fn load(&self) -> Result<Config, SpendError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            SpendError::ConfigError(format!("{}: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<(), SpendError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension(format!("json.{TMP_SUFFIX}"));
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_and_reload() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("currency_code", "eur").unwrap();
        config.set("currency_symbol", "€").unwrap();
        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.currency_code, "EUR");
        assert_eq!(loaded.currency_symbol, "€");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "default_book": "family" }"#).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.default_book, "family");
        assert_eq!(loaded.locale, "en-US");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let mut config = Config::default();
        assert!(config.set("theme", "dark").is_err());
        assert!(config.set("currency_code", "EURO").is_err());
        assert!(config.set("sender_address", "nobody").is_err());
        assert_eq!(config.sender(), "\"SpendWise Reports\" <reports@spendwise.local>");
    }
}
