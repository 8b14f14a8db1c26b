//! API clients for the photosync engine
//!
//! This crate provides the two external collaborators the sync engine talks
//! to: the catalog store (the local persisted ledger of sources, albums and
//! media items, fronted by a REST CRUD service) and the remote managed
//! photo-library service (albums, media items, upload/finalize protocol).

pub mod catalog;
pub mod remote;

// Re-export main types and functions
pub use catalog::{
    Album, CatalogClient, CatalogError, CatalogStore, ItemQuery, MediaItem, MediaStatus, NewAlbum,
    NewMediaItem, PhotoSource,
};
pub use remote::{
    AlbumsPage, BatchCreateResponse, MediaItemsPage, NewMediaItemResult, OauthTokenProvider,
    PhotosLibraryClient, RemoteAlbum, RemoteError, RemoteLibrary, RemoteMediaItem, StaticToken,
    TokenProvider,
};
