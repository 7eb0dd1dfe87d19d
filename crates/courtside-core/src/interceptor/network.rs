use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use super::{AssetResponse, RequestInfo};
use crate::api::{FeedError, FeedResult};
use crate::config::Config;

/// Outgoing request path beneath the interceptor.
///
/// Like a browser fetch, a non-success status is still `Ok`; only transport
/// failures are errors.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &RequestInfo) -> FeedResult<AssetResponse>;
}

#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
    timeout_secs: u64,
}

impl HttpNetwork {
    pub fn new(timeout_secs: u64) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, timeout_secs })
    }

    pub fn from_config(config: &Config) -> FeedResult<Self> {
        Self::new(config.request_timeout_secs)
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &RequestInfo) -> FeedResult<AssetResponse> {
        let response = self
            .client
            .get(request.url.clone())
            .send()
            .await
            .map_err(|e| if e.is_timeout() { FeedError::Timeout(Duration::from_secs(self.timeout_secs)) } else { FeedError::Network(e) })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();
        debug!(url = %request.url, status, bytes = body.len(), "Network response");

        Ok(AssetResponse {
            status,
            content_type,
            body,
        })
    }
}
