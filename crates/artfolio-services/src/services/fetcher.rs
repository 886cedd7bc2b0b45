//! Remote image download

use std::sync::Arc;

use artfolio_core::FetchSettings;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{redirect, Url};
use thiserror::Error;

use super::ssrf::{check_url_target, validate_remote_url, PublicOnlyResolver};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL rejected: {0}")]
    Rejected(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Image exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Downloaded image body
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Bytes,
    /// Media type reported by the remote host, without parameters
    pub content_type: String,
}

/// Retrieves the bytes behind an image URL.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// One unauthenticated GET. Any non-success status is an error.
    async fn get(&self, url: &str) -> Result<FetchedImage, FetchError>;
}

/// `reqwest` based fetcher with timeout, size cap and outbound URL checks
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl HttpFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let allow_private = settings.allow_private_urls;
        let allowlist = settings.url_allowlist.clone();

        // Redirect targets go through the same host checks as the requested URL
        let policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.error("too many redirects");
            }
            match check_url_target(attempt.url(), allow_private, allowlist.as_deref()) {
                Ok(_) => attempt.follow(),
                Err(reason) => attempt.error(reason),
            }
        });

        let mut builder = reqwest::Client::builder()
            .timeout(settings.timeout)
            .redirect(policy);
        if !allow_private {
            // Addresses are checked again at connect time, for every hop
            builder = builder.dns_resolver(Arc::new(PublicOnlyResolver));
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, settings })
    }

    fn too_large(&self) -> FetchError {
        FetchError::TooLarge {
            limit: self.settings.max_image_size_bytes,
        }
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let start = std::time::Instant::now();
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        validate_remote_url(
            &parsed,
            self.settings.allow_private_urls,
            self.settings.url_allowlist.as_deref(),
        )
        .await
        .map_err(FetchError::Rejected)?;

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let limit = self.settings.max_image_size_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(self.too_large());
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
        {
            if body.len() + chunk.len() > limit {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }

        tracing::info!(
            url = %url,
            size_bytes = body.len(),
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image downloaded"
        );

        Ok(FetchedImage {
            bytes: body.freeze(),
            content_type,
        })
    }
}
