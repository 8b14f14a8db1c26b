use super::error::{CatalogError, Result};
use super::store::CatalogStore;
use super::types::*;
use async_trait::async_trait;
use reqwest::ClientBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the catalog's REST CRUD interface.
///
/// The base URL is passed in at construction; nothing here reads shared
/// process state.
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("photosync/0.1.0")
            .build()
            .map_err(CatalogError::Network)?;

        Ok(Self { client, base_url })
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        self.handle_response(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        self.handle_response(response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        debug!("PUT {}", url);
        let response = self.client.put(url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Query a collection with exact-match filters and return the first row,
    /// if any.
    async fn find_one<Q: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Q,
    ) -> Result<Option<T>> {
        let url = format!(
            "{}/{}?{}",
            self.base_url,
            collection,
            serde_urlencoded::to_string(query).unwrap_or_default()
        );
        let mut rows: Vec<T> = self.get_json(&url).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let content: T = response.json().await?;
            Ok(content)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Err(CatalogError::NotFound)
        } else if status.is_client_error() {
            let message = response.text().await.unwrap_or_default();
            Err(CatalogError::Validation(message))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(CatalogError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl CatalogStore for CatalogClient {
    async fn photo_sources(&self) -> Result<Vec<PhotoSource>> {
        self.get_json(&format!("{}/photoSources", self.base_url))
            .await
    }

    async fn create_photo_source(&self, uri: &str) -> Result<PhotoSource> {
        self.post_json(
            &format!("{}/photoSources", self.base_url),
            &json!({ "uri": uri }),
        )
        .await
    }

    async fn create_album(&self, album: &NewAlbum) -> Result<Album> {
        self.post_json(&format!("{}/albums", self.base_url), album)
            .await
    }

    async fn album(&self, id: &str) -> Result<Album> {
        self.get_json(&format!("{}/albums/{}", self.base_url, urlencode(id)))
            .await
    }

    async fn find_album_by_title(&self, title: &str) -> Result<Option<Album>> {
        self.find_one("albums", &[("title", title)]).await
    }

    async fn find_album_by_remote_id(&self, remote_id: &str) -> Result<Option<Album>> {
        self.find_one("albums", &[("remoteId", remote_id)]).await
    }

    async fn create_media_item(&self, item: &NewMediaItem) -> Result<MediaItem> {
        self.post_json(&format!("{}/mediaItems", self.base_url), item)
            .await
    }

    async fn update_media_item(&self, item: &MediaItem) -> Result<MediaItem> {
        self.put_json(
            &format!("{}/mediaItems/{}", self.base_url, urlencode(&item.id)),
            item,
        )
        .await
    }

    async fn find_media_item_by_filekey(&self, filekey: &str) -> Result<Option<MediaItem>> {
        self.find_one("mediaItems", &ItemQuery::new().filekey(filekey))
            .await
    }

    async fn media_items_page(&self, query: &ItemQuery) -> Result<Vec<MediaItem>> {
        let url = format!(
            "{}/mediaItems?{}",
            self.base_url,
            serde_urlencoded::to_string(query).unwrap_or_default()
        );
        self.get_json(&url).await
    }
}

fn urlencode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_invalid_base_url() {
        assert!(CatalogClient::new("not a url").is_err());
        assert!(CatalogClient::new("http://localhost:3000").is_ok());
    }

    #[test]
    fn urlencode_escapes_path_segments() {
        assert_eq!(urlencode("Trip - 2020/x.jpg"), "Trip+-+2020%2Fx.jpg");
    }
}
