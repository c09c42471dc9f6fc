//! Errors raised while loading engine inputs

use ampere_shared::types::profile::ProfileError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration or snapshots.
///
/// The attribution computation itself never fails; only getting inputs
/// into memory can.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Result type for loading operations
pub type Result<T> = std::result::Result<T, LoadError>;
