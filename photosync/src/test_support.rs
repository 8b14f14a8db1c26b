//! In-memory fakes of the catalog store and remote library for engine tests

use async_trait::async_trait;
use bytes::Bytes;
use photosync_core::catalog::error::Result as CatalogResult;
use photosync_core::remote::error::Result as RemoteResult;
use photosync_core::{
    Album, AlbumsPage, BatchCreateResponse, CatalogError, CatalogStore, ItemQuery, MediaItem,
    MediaItemsPage, MediaStatus, NewAlbum, NewMediaItem, NewMediaItemResult, PhotoSource,
    RemoteAlbum, RemoteError, RemoteLibrary, RemoteMediaItem,
};
use photosync_core::remote::types::ResultStatus;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct CatalogState {
    sources: Vec<PhotoSource>,
    albums: Vec<Album>,
    items: Vec<MediaItem>,
    next_id: u64,
    status_log: HashMap<String, Vec<MediaStatus>>,
}

/// Catalog store backed by vectors, with surrogate-id assignment, filekey
/// uniqueness enforcement and a per-item status transition log.
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CatalogState::default()),
        }
    }

    pub fn album_count(&self) -> usize {
        self.state.lock().unwrap().albums.len()
    }

    pub fn media_item_count(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    /// Persisted status sequence of one item, in write order.
    pub fn status_history(&self, filekey: &str) -> Vec<MediaStatus> {
        let state = self.state.lock().unwrap();
        let id = state
            .items
            .iter()
            .find(|i| i.filekey == filekey)
            .map(|i| i.id.clone());
        id.and_then(|id| state.status_log.get(&id).cloned())
            .unwrap_or_default()
    }

    fn next_id(state: &mut CatalogState, prefix: &str) -> String {
        state.next_id += 1;
        format!("{}-{}", prefix, state.next_id)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn photo_sources(&self) -> CatalogResult<Vec<PhotoSource>> {
        Ok(self.state.lock().unwrap().sources.clone())
    }

    async fn create_photo_source(&self, uri: &str) -> CatalogResult<PhotoSource> {
        let mut state = self.state.lock().unwrap();
        let source = PhotoSource {
            id: Self::next_id(&mut state, "src"),
            uri: uri.to_string(),
        };
        state.sources.push(source.clone());
        Ok(source)
    }

    async fn create_album(&self, album: &NewAlbum) -> CatalogResult<Album> {
        let mut state = self.state.lock().unwrap();
        let row = Album {
            id: Self::next_id(&mut state, "alb"),
            title: album.title.clone(),
            remote_id: album.remote_id.clone(),
            remote_url: album.remote_url.clone(),
        };
        state.albums.push(row.clone());
        Ok(row)
    }

    async fn album(&self, id: &str) -> CatalogResult<Album> {
        self.state
            .lock()
            .unwrap()
            .albums
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }

    async fn find_album_by_title(&self, title: &str) -> CatalogResult<Option<Album>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .albums
            .iter()
            .find(|a| a.title == title)
            .cloned())
    }

    async fn find_album_by_remote_id(&self, remote_id: &str) -> CatalogResult<Option<Album>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .albums
            .iter()
            .find(|a| a.remote_id == remote_id)
            .cloned())
    }

    async fn create_media_item(&self, item: &NewMediaItem) -> CatalogResult<MediaItem> {
        let mut state = self.state.lock().unwrap();
        if state.items.iter().any(|i| i.filekey == item.filekey) {
            return Err(CatalogError::Validation(format!(
                "filekey '{}' already exists",
                item.filekey
            )));
        }

        let row = MediaItem {
            id: Self::next_id(&mut state, "item"),
            filekey: item.filekey.clone(),
            filepath: item.filepath.clone(),
            album_id: item.album_id.clone(),
            hash: item.hash.clone(),
            status: item.status,
            upload_token: None,
            remote_id: item.remote_id.clone(),
            remote_url: item.remote_url.clone(),
        };
        state
            .status_log
            .entry(row.id.clone())
            .or_default()
            .push(row.status);
        state.items.push(row.clone());
        Ok(row)
    }

    async fn update_media_item(&self, item: &MediaItem) -> CatalogResult<MediaItem> {
        let mut state = self.state.lock().unwrap();
        state
            .status_log
            .entry(item.id.clone())
            .or_default()
            .push(item.status);
        match state.items.iter_mut().find(|i| i.id == item.id) {
            Some(row) => {
                *row = item.clone();
                Ok(row.clone())
            }
            None => Err(CatalogError::NotFound),
        }
    }

    async fn find_media_item_by_filekey(&self, filekey: &str) -> CatalogResult<Option<MediaItem>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|i| i.filekey == filekey)
            .cloned())
    }

    async fn media_items_page(&self, query: &ItemQuery) -> CatalogResult<Vec<MediaItem>> {
        let state = self.state.lock().unwrap();
        let filtered: Vec<MediaItem> = state
            .items
            .iter()
            .filter(|i| match &query.album_id {
                Some(album_id) => &i.album_id == album_id,
                None => true,
            })
            .cloned()
            .collect();

        let offset = query.offset.unwrap_or(0) as usize;
        let count = query.count.unwrap_or(u32::MAX) as usize;
        Ok(filtered.into_iter().skip(offset).take(count).collect())
    }
}

#[derive(Default)]
struct RemoteState {
    albums: Vec<RemoteAlbum>,
    items_by_album: HashMap<String, Vec<RemoteMediaItem>>,
    content: HashMap<String, Vec<u8>>,
    failed_tokens: HashSet<String>,
}

/// Remote library fake. Upload tokens are derived from the uploaded
/// filename (`token-<filename>`) and finalized media ids from the token
/// (`media-<token>`), so tests can assert exact result wiring.
pub struct FakeRemote {
    state: Mutex<RemoteState>,
    pub create_album_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    reverse_batch: AtomicBool,
    omit_batch_results: AtomicBool,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RemoteState::default()),
            create_album_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            reverse_batch: AtomicBool::new(false),
            omit_batch_results: AtomicBool::new(false),
        }
    }

    pub fn seed_album(&self, album: RemoteAlbum, items: Vec<RemoteMediaItem>) {
        let mut state = self.state.lock().unwrap();
        state.items_by_album.insert(album.id.clone(), items);
        state.albums.push(album);
    }

    pub fn seed_content(&self, media_item_id: &str, bytes: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .content
            .insert(media_item_id.to_string(), bytes);
    }

    /// Return batch finalize results in reverse request order.
    pub fn reverse_batch_results(&self) {
        self.reverse_batch.store(true, Ordering::SeqCst);
    }

    /// Drop the results list from batch finalize responses entirely.
    pub fn omit_batch_results(&self) {
        self.omit_batch_results.store(true, Ordering::SeqCst);
    }

    pub fn fail_finalize_for_filename(&self, filename: &str) {
        self.state
            .lock()
            .unwrap()
            .failed_tokens
            .insert(format!("token-{}", filename));
    }

    pub fn clear_finalize_failures(&self) {
        self.state.lock().unwrap().failed_tokens.clear();
    }
}

fn paginate<T: Clone>(all: &[T], page_size: u32, page_token: Option<&str>) -> (Vec<T>, Option<String>) {
    let start = page_token.and_then(|t| t.parse().ok()).unwrap_or(0usize);
    let end = (start + page_size as usize).min(all.len());
    let next = if end < all.len() {
        Some(end.to_string())
    } else {
        None
    };
    (all[start.min(all.len())..end].to_vec(), next)
}

#[async_trait]
impl RemoteLibrary for FakeRemote {
    async fn list_albums(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> RemoteResult<AlbumsPage> {
        let state = self.state.lock().unwrap();
        let (albums, next_page_token) = paginate(&state.albums, page_size, page_token);
        Ok(AlbumsPage {
            albums,
            next_page_token,
        })
    }

    async fn create_album(&self, title: &str) -> RemoteResult<RemoteAlbum> {
        let n = self.create_album_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let album = RemoteAlbum {
            id: format!("remote-album-{}", n),
            title: title.to_string(),
            product_url: Some(format!("https://photos.example/album/{}", n)),
        };
        self.state.lock().unwrap().albums.push(album.clone());
        Ok(album)
    }

    async fn search_media_items(
        &self,
        album_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> RemoteResult<MediaItemsPage> {
        let state = self.state.lock().unwrap();
        let items = state
            .items_by_album
            .get(album_id)
            .cloned()
            .unwrap_or_default();
        let (media_items, next_page_token) = paginate(&items, page_size, page_token);
        Ok(MediaItemsPage {
            media_items,
            next_page_token,
        })
    }

    async fn upload_file(&self, _path: &Path, filename: &str) -> RemoteResult<String> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("token-{}", filename))
    }

    async fn batch_create(
        &self,
        _album_id: &str,
        upload_tokens: &[String],
    ) -> RemoteResult<BatchCreateResponse> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);

        if self.omit_batch_results.load(Ordering::SeqCst) {
            return Ok(BatchCreateResponse {
                new_media_item_results: None,
            });
        }

        let state = self.state.lock().unwrap();
        let mut results: Vec<NewMediaItemResult> = upload_tokens
            .iter()
            .map(|token| {
                if state.failed_tokens.contains(token) {
                    NewMediaItemResult {
                        upload_token: token.clone(),
                        status: ResultStatus {
                            code: Some(13),
                            message: Some("Internal error".to_string()),
                        },
                        media_item: None,
                    }
                } else {
                    NewMediaItemResult {
                        upload_token: token.clone(),
                        status: ResultStatus {
                            code: None,
                            message: Some("Success".to_string()),
                        },
                        media_item: Some(RemoteMediaItem {
                            id: format!("media-{}", token),
                            filename: token.trim_start_matches("token-").to_string(),
                            product_url: Some(format!("https://photos.example/item/{}", token)),
                            base_url: None,
                        }),
                    }
                }
            })
            .collect();

        if self.reverse_batch.load(Ordering::SeqCst) {
            results.reverse();
        }

        Ok(BatchCreateResponse {
            new_media_item_results: Some(results),
        })
    }

    async fn download(&self, media_item_id: &str) -> RemoteResult<Bytes> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .unwrap()
            .content
            .get(media_item_id)
            .map(|bytes| Bytes::from(bytes.clone()))
            .ok_or_else(|| RemoteError::Unknown(format!("no content for '{}'", media_item_id)))
    }
}

/// Create a `Pending` media item with a plausible local path.
pub async fn item_fixture(
    catalog: &InMemoryCatalog,
    album: &Album,
    filekey: &str,
    hash: &str,
) -> MediaItem {
    let filename = filekey.rsplit('/').next().unwrap_or(filekey);
    catalog
        .create_media_item(&NewMediaItem {
            filekey: filekey.to_string(),
            filepath: Some(format!("/media/{}", filename)),
            album_id: album.id.clone(),
            hash: Some(hash.to_string()),
            status: MediaStatus::Pending,
            remote_id: None,
            remote_url: None,
        })
        .await
        .unwrap()
}
