//! Album resolution: find-or-create across catalog and remote library

use photosync_core::{Album, CatalogStore, NewAlbum, RemoteLibrary};
use tracing::info;

use crate::error::Result;

/// Ensures a catalog album row (mirroring a remote album) exists for a
/// given title.
pub struct AlbumResolver<'a, C, R> {
    catalog: &'a C,
    remote: &'a R,
}

impl<'a, C: CatalogStore, R: RemoteLibrary> AlbumResolver<'a, C, R> {
    pub fn new(catalog: &'a C, remote: &'a R) -> Self {
        Self { catalog, remote }
    }

    /// Look the title up in the catalog; if absent, create the album
    /// remotely and mirror the returned identifiers into a new catalog row.
    ///
    /// Titles are treated as immutable and unique: an existing row is
    /// returned unchanged, and a remote album renamed out of band will get
    /// a duplicate rather than be reconciled.
    pub async fn resolve(&self, title: &str) -> Result<Album> {
        if let Some(album) = self.catalog.find_album_by_title(title).await? {
            return Ok(album);
        }

        info!("Creating album '{}'", title);
        let remote_album = self.remote.create_album(title).await?;
        let album = self
            .catalog
            .create_album(&NewAlbum {
                title: title.to_string(),
                remote_id: remote_album.id,
                remote_url: remote_album.product_url,
            })
            .await?;

        Ok(album)
    }
}
