use thiserror::Error;

use crate::sync::SyncFailure;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid base_url: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sync(#[from] SyncFailure),
}
