//! Remote photo-library client
//!
//! Façade over the managed photo-library service: album listing/creation,
//! media-item search, the raw-bytes upload that yields an upload token, the
//! batch finalize call that turns tokens into permanent media items, and
//! byte downloads. Authentication is delegated to a [`TokenProvider`].

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{OauthTokenProvider, StaticToken, TokenProvider};
pub use client::{PhotosLibraryClient, RemoteLibrary};
pub use error::{RemoteError, Result};
pub use types::{
    AlbumsPage, BatchCreateResponse, MediaItemsPage, NewMediaItemResult, RemoteAlbum,
    RemoteMediaItem, ResultStatus,
};
