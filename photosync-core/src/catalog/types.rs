use serde::{Deserialize, Serialize};

/// Upload lifecycle state of a media item.
///
/// `Complete` is terminal. There is no failed state: a failed step leaves
/// the item at its last persisted state so the next run retries from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    Pending,
    Uploading,
    Uploaded,
    Complete,
}

/// A root directory registered for backup. The uri carries a `file://`
/// prefix; read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSource {
    pub id: String,
    pub uri: String,
}

/// Catalog mirror of a remote album. `title` is the unique lookup key;
/// `remote_id`/`remote_url` are the remote service's canonical identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub title: String,
    pub remote_id: String,
    pub remote_url: Option<String>,
}

/// Payload for creating a catalog album row. The store assigns the id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlbum {
    pub title: String,
    pub remote_id: String,
    pub remote_url: Option<String>,
}

/// A tracked media file. `filekey` (`"<albumTitle>/<filename>"`) is the
/// catalog's sole deduplication key, independent of the content hash.
///
/// `filepath` and `hash` are absent on rows created by restore-from-remote
/// reconciliation, where the bytes exist remotely but may not yet locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub filekey: String,
    pub filepath: Option<String>,
    pub album_id: String,
    pub hash: Option<String>,
    pub status: MediaStatus,
    pub upload_token: Option<String>,
    pub remote_id: Option<String>,
    pub remote_url: Option<String>,
}

/// Payload for creating a media item row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaItem {
    pub filekey: String,
    pub filepath: Option<String>,
    pub album_id: String,
    pub hash: Option<String>,
    pub status: MediaStatus,
    pub remote_id: Option<String>,
    pub remote_url: Option<String>,
}

/// Query parameters for media item listings (exact-match filters plus
/// count/offset pagination).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filekey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filekey(mut self, filekey: impl Into<String>) -> Self {
        self.filekey = Some(filekey.into());
        self
    }

    pub fn album_id(mut self, album_id: impl Into<String>) -> Self {
        self.album_id = Some(album_id.into());
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}
