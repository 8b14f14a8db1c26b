//! Catalog store client
//!
//! The catalog is the durable ledger of photo sources, albums and media
//! items. It is served as a plain REST CRUD interface with exact-match
//! field filters and count/offset pagination; this module provides the
//! typed client plus the [`CatalogStore`] seam the engine is written
//! against.

pub mod client;
pub mod error;
pub mod store;
pub mod types;

pub use client::CatalogClient;
pub use error::{CatalogError, Result};
pub use store::CatalogStore;
pub use types::{Album, ItemQuery, MediaItem, MediaStatus, NewAlbum, NewMediaItem, PhotoSource};
