//! Image-lookup collaborator used by the search-lookup thumbnail strategy.
//!
//! The endpoint is called as `GET {endpoint}?query={title}` and answers
//! `{ "imageUrl": string | null }`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::types::errors::ThumbnailError;

/// Looks up an image URL for a free-text query.
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Returns `Ok(None)` when the collaborator has no image for the query.
    async fn lookup(&self, query: &str) -> Result<Option<String>, ThumbnailError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    image_url: Option<String>,
}

/// Parses a lookup response body. Blank URLs count as no result.
pub fn parse_lookup_response(body: &str) -> Result<Option<String>, ThumbnailError> {
    let parsed: LookupResponse =
        serde_json::from_str(body).map_err(|e| ThumbnailError::ParseError(e.to_string()))?;
    Ok(parsed.image_url.filter(|u| !u.trim().is_empty()))
}

/// `ImageLookup` over HTTP via `reqwest`.
pub struct HttpImageLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpImageLookup {
    /// Builds the client. No timeout is applied unless `timeout` is given.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, ThumbnailError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| ThumbnailError::NetworkError(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn request_url(&self, query: &str) -> String {
        format!("{}?query={}", self.endpoint, urlencoding::encode(query))
    }
}

#[async_trait]
impl ImageLookup for HttpImageLookup {
    async fn lookup(&self, query: &str) -> Result<Option<String>, ThumbnailError> {
        let response = self
            .client
            .get(self.request_url(query))
            .send()
            .await
            .map_err(|e| ThumbnailError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThumbnailError::NetworkError(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ThumbnailError::NetworkError(e.to_string()))?;
        parse_lookup_response(&body)
    }
}
