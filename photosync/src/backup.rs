//! Backup pipeline: scan sources, reconcile the catalog, upload
//!
//! One invocation runs the explicit step sequence
//! scan -> group -> resolve albums -> reconcile items -> orchestrate
//! uploads, and reports the items that did not reach `Complete`. Every step
//! persists its progress, so re-running after a failure resumes from the
//! last checkpoint instead of redoing finished work.

use photosync_core::{Album, CatalogStore, MediaItem, MediaStatus, NewMediaItem, RemoteLibrary};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{error, info};

use crate::error::Result;
use crate::resolver::AlbumResolver;
use crate::scanner::{FileInfo, MediaScanner};
use crate::uploader::UploadOrchestrator;

/// Outcome of one backup invocation.
#[derive(Debug)]
pub struct BackupReport {
    /// Every item touched by this run, in its final persisted state.
    pub processed: Vec<MediaItem>,
}

impl BackupReport {
    /// Items that did not reach `Complete` and will be retried next run.
    pub fn unresolved(&self) -> Vec<&MediaItem> {
        self.processed
            .iter()
            .filter(|item| item.status != MediaStatus::Complete)
            .collect()
    }
}

/// Top-level coordinator for the backup direction.
pub struct BackupCoordinator<'a, C, R> {
    catalog: &'a C,
    remote: &'a R,
    scanner: MediaScanner,
}

impl<'a, C: CatalogStore, R: RemoteLibrary> BackupCoordinator<'a, C, R> {
    pub fn new(catalog: &'a C, remote: &'a R) -> Self {
        Self {
            catalog,
            remote,
            scanner: MediaScanner::new(),
        }
    }

    /// Run the full backup pipeline once.
    pub async fn run(&self) -> Result<BackupReport> {
        let files = self.scan_sources().await?;
        info!("Scanned {} media file(s)", files.len());

        let pending = self.reconcile_catalog(files).await?;
        info!("{} item(s) pending upload", pending.len());

        let orchestrator = UploadOrchestrator::new(self.catalog, self.remote);
        let processed = orchestrator.process(pending).await?;

        let report = BackupReport { processed };
        for item in report.unresolved() {
            error!(
                "Item '{}' did not complete (status {:?})",
                item.filekey, item.status
            );
        }
        Ok(report)
    }

    /// Step 1-2: fetch configured photo sources and scan each, concatenating
    /// the file sequences.
    async fn scan_sources(&self) -> Result<Vec<FileInfo>> {
        let sources = self.catalog.photo_sources().await?;

        let mut files = Vec::new();
        for source in sources {
            let root = local_root(&source.uri);
            info!("Scanning source '{}'", root.display());
            files.extend(self.scanner.scan(&root).await?);
        }
        Ok(files)
    }

    /// Step 3-5: group files by derived album title, resolve each album,
    /// then reconcile every file against the catalog. Returns the items now
    /// in `Pending`.
    async fn reconcile_catalog(&self, files: Vec<FileInfo>) -> Result<Vec<MediaItem>> {
        let resolver = AlbumResolver::new(self.catalog, self.remote);

        let mut pending = Vec::new();
        for (title, group) in group_by_album_title(files) {
            let album = resolver.resolve(&title).await?;
            for file in group {
                if let Some(item) = self.reconcile_file(&album, &file).await? {
                    pending.push(item);
                }
            }
        }
        Ok(pending)
    }

    /// Apply the creation, hash-check and re-arm rules to one scanned file.
    /// Returns the catalog row when it ends up `Pending`.
    async fn reconcile_file(&self, album: &Album, file: &FileInfo) -> Result<Option<MediaItem>> {
        let filekey = format!("{}/{}", album.title, file.filename);

        let mut item = match self.catalog.find_media_item_by_filekey(&filekey).await? {
            Some(item) => item,
            None => {
                self.catalog
                    .create_media_item(&NewMediaItem {
                        filekey: filekey.clone(),
                        filepath: Some(file.path.display().to_string()),
                        album_id: album.id.clone(),
                        hash: Some(file.hash.clone()),
                        status: MediaStatus::Pending,
                        remote_id: None,
                        remote_url: None,
                    })
                    .await?
            }
        };

        // Surfaced to the operator only; neither the file nor the row is
        // corrected.
        if item.hash.as_deref() != Some(file.hash.as_str()) {
            error!(
                "hash mismatch for '{}': scanned {} but catalog has {:?}",
                item.filekey, file.hash, item.hash
            );
        }

        // Re-arm: a row that lost its way short of finalize (no remote id,
        // status advanced past Pending) goes back to Pending for retry.
        if item.remote_id.is_none() && item.status != MediaStatus::Pending {
            item.status = MediaStatus::Pending;
            item = self.catalog.update_media_item(&item).await?;
        }

        if item.status == MediaStatus::Pending {
            Ok(Some(item))
        } else {
            Ok(None)
        }
    }
}

/// Strip the `file://` scheme a photo-source uri carries.
fn local_root(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

/// Group scanned files by album title, preserving first-seen order.
fn group_by_album_title(files: Vec<FileInfo>) -> Vec<(String, Vec<FileInfo>)> {
    let mut order: Vec<String> = Vec::new();
    let mut map: HashMap<String, Vec<FileInfo>> = HashMap::new();

    for file in files {
        if !map.contains_key(&file.album_title) {
            order.push(file.album_title.clone());
        }
        map.entry(file.album_title.clone()).or_default().push(file);
    }

    order
        .into_iter()
        .filter_map(|title| map.remove(&title).map(|group| (title, group)))
        .collect()
}
