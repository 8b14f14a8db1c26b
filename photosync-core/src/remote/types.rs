use serde::{Deserialize, Serialize};

/// An album as the remote service reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAlbum {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub product_url: Option<String>,
}

/// A media item as the remote service reports it. `base_url` is the
/// short-lived content endpoint; appending `=d` yields the original bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMediaItem {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// One page of the album listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumsPage {
    #[serde(default)]
    pub albums: Vec<RemoteAlbum>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One page of an album's media-item search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemsPage {
    #[serde(default)]
    pub media_items: Vec<RemoteMediaItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Per-token outcome inside a batch finalize response. Results are keyed by
/// `upload_token`; response ordering carries no meaning.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaItemResult {
    pub upload_token: String,
    pub status: ResultStatus,
    #[serde(default)]
    pub media_item: Option<RemoteMediaItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultStatus {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ResultStatus {
    /// The service marks a finalized item with the literal message
    /// `"Success"`.
    pub fn is_success(&self) -> bool {
        self.message.as_deref() == Some("Success")
    }
}

/// Response of the batch finalize call. The results list may be absent
/// entirely on malformed responses; callers treat that as a per-item failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateResponse {
    #[serde(default)]
    pub new_media_item_results: Option<Vec<NewMediaItemResult>>,
}
