use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the key-value persistence surface.
///
/// Callers treat these as degraded conditions: a failed read hydrates a
/// default value, a failed write keeps the in-memory state. Neither is
/// surfaced to the user.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read storage key {key:?} from {}", path.display())]
    Read {
        key: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write storage key {key:?} to {}", path.display())]
    Write {
        key: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove storage key {key:?} at {}", path.display())]
    Remove {
        key: String,
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;
