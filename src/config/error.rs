use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, querying or writing config files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Typed getter called on a key that is not present.
    #[error("Key not found: {0}")]
    MissingKey(String),
    /// Stored string does not convert to the requested type.
    #[error("Value {value:?} for key '{key}' is not a valid {expected}")]
    TypeMismatch {
        key: String,
        value: String,
        expected: &'static str,
    },
    /// Entry cannot be serialised without changing its meaning on reload.
    #[error("Cannot write entry '{key}': {reason}")]
    InvalidEntry { key: String, reason: &'static str },
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Failed to create or restore a backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Settings file is not valid JSON for the settings schema.
    #[error("Invalid settings file: {0}")]
    Settings(#[from] serde_json::Error),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
