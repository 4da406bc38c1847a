use std::result::Result as StdResult;

use thiserror::Error;

use crate::core::services::ServiceError;
use crate::recurrence::YearMonthError;

/// Error type shared by the storage, configuration and notification layers.
#[derive(Error, Debug)]
pub enum SpendError {
    #[error("Book not found: {0}")]
    BookNotFound(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Delivery error: {0}")]
    DeliveryError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, SpendError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] SpendError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::io::Error> for SpendError {
    fn from(err: std::io::Error) -> Self {
        SpendError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for SpendError {
    fn from(err: serde_json::Error) -> Self {
        SpendError::StorageError(err.to_string())
    }
}

impl From<YearMonthError> for SpendError {
    fn from(err: YearMonthError) -> Self {
        SpendError::InvalidInput(err.to_string())
    }
}
