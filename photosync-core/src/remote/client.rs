use super::auth::TokenProvider;
use super::error::{RemoteError, Result};
use super::types::*;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::ClientBuilder;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Operations the sync engine needs from the remote photo-library service.
#[async_trait]
pub trait RemoteLibrary: Send + Sync {
    async fn list_albums(&self, page_size: u32, page_token: Option<&str>) -> Result<AlbumsPage>;

    async fn create_album(&self, title: &str) -> Result<RemoteAlbum>;

    async fn search_media_items(
        &self,
        album_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MediaItemsPage>;

    /// Stream a file's bytes to the upload endpoint and return the upload
    /// token. The token is single-use and time-bounded; it only becomes a
    /// media item through [`RemoteLibrary::batch_create`].
    async fn upload_file(&self, path: &Path, filename: &str) -> Result<String>;

    /// Finalize a batch of upload tokens into permanent media items inside
    /// an album. Per-item outcomes are reported in the response; callers
    /// must match them back by upload token.
    async fn batch_create(&self, album_id: &str, upload_tokens: &[String])
        -> Result<BatchCreateResponse>;

    /// Fetch the original bytes of a finalized media item.
    async fn download(&self, media_item_id: &str) -> Result<Bytes>;
}

/// HTTP client for the photo-library API.
pub struct PhotosLibraryClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl PhotosLibraryClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)?;

        let client = ClientBuilder::new()
            // Uploads of large video files can be slow; keep only a connect
            // timeout and let transfers run.
            .connect_timeout(Duration::from_secs(10))
            .user_agent("photosync/0.1.0")
            .build()
            .map_err(RemoteError::Network)?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    async fn bearer(&self) -> Result<String> {
        self.tokens.access_token().await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let content: T = response.json().await?;
            Ok(content)
        } else if status == reqwest::StatusCode::UNAUTHORIZED {
            let message = response.text().await.unwrap_or_default();
            Err(RemoteError::Authentication(message))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(RemoteError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn media_item(&self, id: &str) -> Result<RemoteMediaItem> {
        let url = format!("{}/mediaItems/{}", self.base_url, id);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl RemoteLibrary for PhotosLibraryClient {
    async fn list_albums(&self, page_size: u32, page_token: Option<&str>) -> Result<AlbumsPage> {
        let mut url = format!("{}/albums?pageSize={}", self.base_url, page_size);
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencode(token));
        }

        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_album(&self, title: &str) -> Result<RemoteAlbum> {
        let url = format!("{}/albums", self.base_url);
        debug!("POST {} (title: {})", url, title);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "album": { "title": title } }))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn search_media_items(
        &self,
        album_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MediaItemsPage> {
        let url = format!("{}/mediaItems:search", self.base_url);

        let mut body = json!({
            "albumId": album_id,
            "pageSize": page_size,
        });
        if let Some(token) = page_token {
            body["pageToken"] = json!(token);
        }

        debug!("POST {} (album: {})", url, album_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn upload_file(&self, path: &Path, filename: &str) -> Result<String> {
        let url = format!("{}/uploads", self.base_url);
        debug!("POST {} ({})", url, path.display());

        let file = tokio::fs::File::open(path).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .header("Content-Type", "application/octet-stream")
            .header("X-Goog-Upload-File-Name", filename)
            .header("X-Goog-Upload-Protocol", "raw")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(RemoteError::Server {
                status: status.as_u16(),
                message: text,
            });
        }
        if text.is_empty() {
            return Err(RemoteError::Upload(format!(
                "empty upload token for '{}'",
                path.display()
            )));
        }

        Ok(text)
    }

    async fn batch_create(
        &self,
        album_id: &str,
        upload_tokens: &[String],
    ) -> Result<BatchCreateResponse> {
        let url = format!("{}/mediaItems:batchCreate", self.base_url);
        debug!("POST {} ({} items)", url, upload_tokens.len());

        let body = json!({
            "albumId": album_id,
            "newMediaItems": upload_tokens
                .iter()
                .map(|token| json!({ "simpleMediaItem": { "uploadToken": token } }))
                .collect::<Vec<_>>(),
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn download(&self, media_item_id: &str) -> Result<Bytes> {
        let item = self.media_item(media_item_id).await?;
        let base_url = item.base_url.ok_or_else(|| {
            RemoteError::Unknown(format!("media item '{}' has no content URL", media_item_id))
        })?;

        // `=d` asks for the original bytes instead of a scaled rendition.
        let url = format!("{}=d", base_url);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?)
    }
}

fn urlencode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::auth::StaticToken;

    #[test]
    fn client_rejects_invalid_base_url() {
        let tokens = Arc::new(StaticToken("t".to_string()));
        assert!(PhotosLibraryClient::new("not a url", tokens.clone()).is_err());
        assert!(
            PhotosLibraryClient::new("https://photoslibrary.googleapis.com/v1", tokens).is_ok()
        );
    }
}
