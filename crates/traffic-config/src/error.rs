//! `ConfigLoadError` — the config bundle's crate-scoped error type (§7
//! "Config load failure").

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ConfigLoadResult<T> = Result<T, ConfigLoadError>;
