//! Backup/Restore Synchronization Engine
//!
//! Reconciles a local filesystem inventory of media files with a remote
//! managed photo library and a local persistent catalog:
//! - [`scanner`] walks photo sources and fingerprints media files
//! - [`resolver`] ensures a remote+catalog album exists per derived title
//! - [`uploader`] drives the per-item upload/finalize state machine
//! - [`backup`] is the end-to-end backup pipeline
//! - [`pager`] materializes paginated remote and catalog listings
//! - [`restore`] rebuilds catalog rows and local files from the remote side
//!
//! All remote and catalog calls are issued sequentially and awaited; every
//! state transition is persisted before the next call, so interrupted runs
//! are safe to repeat.

pub mod backup;
pub mod error;
pub mod pager;
pub mod resolver;
pub mod restore;
pub mod scanner;
pub mod uploader;

// Re-export main types and functions
pub use backup::{BackupCoordinator, BackupReport};
pub use error::{Result, SyncError};
pub use resolver::AlbumResolver;
pub use restore::RestoreCoordinator;
pub use scanner::{FileInfo, MediaScanner};
pub use uploader::UploadOrchestrator;

// Test modules
#[cfg(test)]
pub mod test_support;
