//! Client side of the level and asset service

use std::future::Future;

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::model::{DungeonMap, DungeonRequest, MaterialDescriptor, ObjectDescriptor};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Async source of dungeons, materials and objects
///
/// Each call is a single request: no retry, no timeout, no cancellation.
pub trait ContentService: Send + Sync + 'static {
    /// `POST /dungeon`
    fn create_dungeon(&self, request: DungeonRequest) -> impl Future<Output = Result<DungeonMap, ContentError>> + Send;

    /// `GET /materials`
    fn materials(&self) -> impl Future<Output = Result<Vec<MaterialDescriptor>, ContentError>> + Send;

    /// `GET /object/{id}`
    fn object(&self, id: u64) -> impl Future<Output = Result<ObjectDescriptor, ContentError>> + Send;
}

/// [`ContentService`] over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpContentService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a route such as `/materials`
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn send<T: DeserializeOwned>(&self, url: String, request: reqwest::RequestBuilder) -> Result<T, ContentError> {
        log::debug!("Fetching {}", url);
        let response = request.send().await.map_err(|source| ContentError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| ContentError::Transport {
            url: url.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| ContentError::Decode { url, source })
    }
}

impl ContentService for HttpContentService {
    async fn create_dungeon(&self, request: DungeonRequest) -> Result<DungeonMap, ContentError> {
        let url = self.url("/dungeon");
        let builder = self.client.post(&url).json(&request);
        self.send(url, builder).await
    }

    async fn materials(&self) -> Result<Vec<MaterialDescriptor>, ContentError> {
        let url = self.url("/materials");
        let builder = self.client.get(&url);
        self.send(url, builder).await
    }

    async fn object(&self, id: u64) -> Result<ObjectDescriptor, ContentError> {
        let url = self.url(&format!("/object/{}", id));
        let builder = self.client.get(&url);
        self.send(url, builder).await
    }
}
