//! Error types for the sync engine library

use photosync_core::{CatalogError, RemoteError};
use std::path::PathBuf;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Comprehensive error type for sync operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog store failures
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Remote library failures
    #[error("Remote library error: {0}")]
    Remote(#[from] RemoteError),

    /// Directory scanning errors
    #[error("Directory scan error at '{path}': {message}")]
    DirectoryScan { path: PathBuf, message: String },

    /// Hash computation errors
    #[error("Hash computation error for '{path}': {message}")]
    Hash { path: PathBuf, message: String },
}

impl SyncError {
    /// Create a new directory scan error
    pub fn scan_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DirectoryScan {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new hash error
    pub fn hash_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Hash {
            path: path.into(),
            message: message.into(),
        }
    }
}
