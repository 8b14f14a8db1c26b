//! Restore pipelines: rebuild the catalog from the remote library, and pull
//! file contents back down
//!
//! Both passes are gap-filling reconciliations: they create whatever side is
//! missing and never mutate records that already match.

use photosync_core::{CatalogStore, ItemQuery, MediaStatus, NewAlbum, NewMediaItem, RemoteLibrary};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::pager;

/// Page size for remote album/media-item listings.
const REMOTE_PAGE_SIZE: u32 = 50;

/// Window size for catalog media-item listings.
const CATALOG_WINDOW: u32 = 100;

/// Invert the album-title flattening for the leading filekey segment: the
/// first `" - "` becomes a path separator again. Lossy by design; a
/// directory whose real name contains `" - "` is indistinguishable from
/// nesting.
pub fn local_relative_path(filekey: &str) -> PathBuf {
    let mut segments: Vec<String> = filekey.split('/').map(str::to_string).collect();
    if let Some(first) = segments.first_mut() {
        *first = first.replacen(" - ", "/", 1);
    }
    PathBuf::from(segments.join("/"))
}

/// Coordinator for the restore direction.
pub struct RestoreCoordinator<'a, C, R> {
    catalog: &'a C,
    remote: &'a R,
}

impl<'a, C: CatalogStore, R: RemoteLibrary> RestoreCoordinator<'a, C, R> {
    pub fn new(catalog: &'a C, remote: &'a R) -> Self {
        Self { catalog, remote }
    }

    /// Catalog reconciliation: create catalog rows for every remote album
    /// and media item the catalog does not know yet. Restored items start
    /// at `Complete` directly; the bytes already exist remotely.
    pub async fn restore_catalog(&self) -> Result<()> {
        let remote_albums = pager::fetch_all(|token| async move {
            self.remote
                .list_albums(REMOTE_PAGE_SIZE, token.as_deref())
                .await
                .map(|page| (page.albums, page.next_page_token))
        })
        .await?;
        info!("Remote library lists {} album(s)", remote_albums.len());

        for remote_album in remote_albums {
            // Album rows must exist before the media items that reference
            // them.
            let album = match self
                .catalog
                .find_album_by_remote_id(&remote_album.id)
                .await?
            {
                Some(album) => album,
                None => {
                    info!("Restoring album '{}' into catalog", remote_album.title);
                    self.catalog
                        .create_album(&NewAlbum {
                            title: remote_album.title.clone(),
                            remote_id: remote_album.id.clone(),
                            remote_url: remote_album.product_url.clone(),
                        })
                        .await?
                }
            };

            let album_id = remote_album.id.clone();
            let remote_items = pager::fetch_all(|token| {
                let album_id = album_id.clone();
                async move {
                    self.remote
                        .search_media_items(&album_id, REMOTE_PAGE_SIZE, token.as_deref())
                        .await
                        .map(|page| (page.media_items, page.next_page_token))
                }
            })
            .await?;

            for remote_item in remote_items {
                let filekey = format!("{}/{}", remote_album.title, remote_item.filename);
                if self
                    .catalog
                    .find_media_item_by_filekey(&filekey)
                    .await?
                    .is_none()
                {
                    info!("Restoring item '{}' into catalog", filekey);
                    self.catalog
                        .create_media_item(&NewMediaItem {
                            filekey,
                            filepath: None,
                            album_id: album.id.clone(),
                            hash: None,
                            status: MediaStatus::Complete,
                            remote_id: Some(remote_item.id.clone()),
                            remote_url: remote_item.product_url.clone(),
                        })
                        .await?;
                }
            }
        }

        Ok(())
    }

    /// Download reconciliation: materialize catalog items as local files
    /// under `dir`, optionally restricted to one album. Existing files are
    /// left untouched; the resolved local path is re-stamped on the row
    /// either way.
    pub async fn restore_downloads(&self, dir: &Path, album_id: Option<&str>) -> Result<()> {
        let items = pager::fetch_all_offset(CATALOG_WINDOW, |offset| {
            let mut query = ItemQuery::new().count(CATALOG_WINDOW).offset(offset);
            if let Some(album_id) = album_id {
                query = query.album_id(album_id);
            }
            async move { self.catalog.media_items_page(&query).await }
        })
        .await?;
        info!("Restoring {} item(s) under '{}'", items.len(), dir.display());

        for mut item in items {
            let target = dir.join(local_relative_path(&item.filekey));

            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            if !target.exists() {
                match item.remote_id.as_deref() {
                    Some(remote_id) => {
                        let bytes = self.remote.download(remote_id).await?;
                        tokio::fs::write(&target, &bytes).await?;
                        info!("Restored {}", target.display());
                    }
                    None => {
                        warn!(
                            "Item '{}' has no remote id; cannot download",
                            item.filekey
                        );
                    }
                }
            }

            item.filepath = Some(target.display().to_string());
            self.catalog.update_media_item(&item).await?;
        }

        Ok(())
    }
}
