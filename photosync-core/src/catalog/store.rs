use super::error::Result;
use super::types::*;
use async_trait::async_trait;

/// The engine's seam over catalog persistence.
///
/// Identity assignment (surrogate ids) belongs to the store; the engine only
/// reads and writes field values through this interface. Implementations
/// must be read-your-write consistent within a run: a row created or updated
/// here is observable by the next call.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn photo_sources(&self) -> Result<Vec<PhotoSource>>;

    async fn create_photo_source(&self, uri: &str) -> Result<PhotoSource>;

    async fn create_album(&self, album: &NewAlbum) -> Result<Album>;

    async fn album(&self, id: &str) -> Result<Album>;

    async fn find_album_by_title(&self, title: &str) -> Result<Option<Album>>;

    async fn find_album_by_remote_id(&self, remote_id: &str) -> Result<Option<Album>>;

    async fn create_media_item(&self, item: &NewMediaItem) -> Result<MediaItem>;

    /// Full-row update keyed by the item's id.
    async fn update_media_item(&self, item: &MediaItem) -> Result<MediaItem>;

    async fn find_media_item_by_filekey(&self, filekey: &str) -> Result<Option<MediaItem>>;

    /// One count/offset window of media items, optionally filtered by album.
    /// An empty page means the listing is exhausted.
    async fn media_items_page(&self, query: &ItemQuery) -> Result<Vec<MediaItem>>;
}
