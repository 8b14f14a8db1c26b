//! Upload orchestration: drives the per-item upload/finalize state machine
//!
//! Input is the set of catalog media items still missing a remote id,
//! grouped by their catalog album. Each group is pushed through
//! `PENDING -> UPLOADING -> UPLOADED` one item at a time, then finalized
//! with a single batch call per album. Every transition is persisted before
//! the next remote call so an interrupted run resumes from the last
//! checkpoint.

use photosync_core::{CatalogStore, MediaItem, MediaStatus, RemoteLibrary};
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::Result;

/// Drives uploads and batch finalize calls for pending media items.
pub struct UploadOrchestrator<'a, C, R> {
    catalog: &'a C,
    remote: &'a R,
}

impl<'a, C: CatalogStore, R: RemoteLibrary> UploadOrchestrator<'a, C, R> {
    pub fn new(catalog: &'a C, remote: &'a R) -> Self {
        Self { catalog, remote }
    }

    /// Process a batch of catalog items. Items that already carry a remote
    /// id pass through untouched; the rest are grouped by album, uploaded,
    /// and finalized. Returns every input item in its final persisted state
    /// so the caller can report the ones that did not reach `Complete`.
    pub async fn process(&self, items: Vec<MediaItem>) -> Result<Vec<MediaItem>> {
        let mut processed = Vec::new();
        let mut group_order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<MediaItem>> = HashMap::new();

        for item in items {
            if item.remote_id.is_some() {
                processed.push(item);
            } else {
                if !groups.contains_key(&item.album_id) {
                    group_order.push(item.album_id.clone());
                }
                groups.entry(item.album_id.clone()).or_default().push(item);
            }
        }

        for album_id in group_order {
            let group = groups.remove(&album_id).unwrap_or_default();
            let finalized = self.process_album_group(&album_id, group).await?;
            processed.extend(finalized);
        }

        Ok(processed)
    }

    async fn process_album_group(
        &self,
        album_id: &str,
        group: Vec<MediaItem>,
    ) -> Result<Vec<MediaItem>> {
        // The album association on the catalog row is authoritative; it
        // carries the remote album id the finalize call needs.
        let album = self.catalog.album(album_id).await?;
        info!(
            "Uploading {} item(s) for album '{}'",
            group.len(),
            album.title
        );

        let mut uploaded = Vec::new();
        for item in group {
            uploaded.push(self.ensure_uploaded(item).await?);
        }

        let tokens: Vec<String> = uploaded
            .iter()
            .filter_map(|item| item.upload_token.clone())
            .collect();
        if tokens.is_empty() {
            return Ok(uploaded);
        }

        let response = self.remote.batch_create(&album.remote_id, &tokens).await?;

        let mut finalized = Vec::new();
        match response.new_media_item_results {
            Some(results) => {
                for item in uploaded {
                    finalized.push(self.apply_finalize_result(item, &results).await?);
                }
            }
            None => {
                error!(
                    "Batch finalize for album '{}' returned no results; {} item(s) left for retry",
                    album.title,
                    uploaded.len()
                );
                finalized = uploaded;
            }
        }

        Ok(finalized)
    }

    /// Obtain an upload token for the item if it does not already have one,
    /// persisting `Uploading` before and `Uploaded` after the transfer.
    async fn ensure_uploaded(&self, mut item: MediaItem) -> Result<MediaItem> {
        if item.upload_token.is_some() {
            return Ok(item);
        }

        let filepath = match item.filepath.clone() {
            Some(path) => path,
            None => {
                warn!(
                    "Item '{}' has no local file path; skipping upload",
                    item.filekey
                );
                return Ok(item);
            }
        };

        item.status = MediaStatus::Uploading;
        item = self.catalog.update_media_item(&item).await?;

        let filename = basename(&item.filekey);
        let token = self
            .remote
            .upload_file(Path::new(&filepath), filename)
            .await?;

        item.upload_token = Some(token);
        item.status = MediaStatus::Uploaded;
        item = self.catalog.update_media_item(&item).await?;

        Ok(item)
    }

    /// Match this item's finalize result strictly by upload token (response
    /// ordering is not guaranteed to match request ordering) and persist the
    /// outcome. A missing or failed result leaves the item `Uploaded` so the
    /// next run finalizes it again.
    async fn apply_finalize_result(
        &self,
        mut item: MediaItem,
        results: &[photosync_core::NewMediaItemResult],
    ) -> Result<MediaItem> {
        let token = match item.upload_token.as_deref() {
            Some(token) => token,
            None => return Ok(item),
        };

        match results.iter().find(|r| r.upload_token == token) {
            Some(result) if result.status.is_success() => match &result.media_item {
                Some(remote_item) => {
                    item.remote_id = Some(remote_item.id.clone());
                    item.remote_url = remote_item.product_url.clone();
                    item.status = MediaStatus::Complete;
                    item = self.catalog.update_media_item(&item).await?;
                    Ok(item)
                }
                None => {
                    error!(
                        "Finalize result for '{}' reported success without a media item",
                        item.filekey
                    );
                    Ok(item)
                }
            },
            Some(result) => {
                error!(
                    "Finalize failed for '{}': {:?} (code {:?})",
                    item.filekey, result.status.message, result.status.code
                );
                Ok(item)
            }
            None => {
                error!("No finalize result for '{}'", item.filekey);
                Ok(item)
            }
        }
    }
}

fn basename(filekey: &str) -> &str {
    filekey.rsplit('/').next().unwrap_or(filekey)
}
