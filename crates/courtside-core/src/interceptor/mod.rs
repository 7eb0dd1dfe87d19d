//! Request interception with per-resource-class freshness policies.
//!
//! An `Interceptor` sits beneath every outgoing request of the board and
//! owns one versioned asset cache, separate from the response cache in
//! `crate::cache`. Its lifecycle is an explicit state machine:
//!
//! - **Install**: open the versioned cache and pre-populate the app shell
//! - **Activate**: delete caches from other versions and take control
//! - **Intercept**: route each request through the policy `classify` picks
//!
//! Policies: network-first for the data feed, network-first with a shell
//! fallback for navigations, stale-while-revalidate for everything else.

pub mod network;
pub mod policy;
pub mod storage;
pub mod worker;

use reqwest::Url;
use serde::{Deserialize, Serialize};

pub use network::{HttpNetwork, Network};
pub use policy::{classify, Policy};
pub use storage::CacheStorage;
pub use worker::{Intercepted, Interceptor, InterceptorConfig, InterceptorError, WorkerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Full-page navigation
    Navigate,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub url: Url,
    pub mode: RequestMode,
}

impl RequestInfo {
    pub fn navigate(url: Url) -> Self {
        Self {
            url,
            mode: RequestMode::Navigate,
        }
    }

    pub fn other(url: Url) -> Self {
        Self {
            url,
            mode: RequestMode::Other,
        }
    }

    /// Asset cache key: the URL without its fragment
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// Only plain 200 responses are written to the asset cache.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }
}
