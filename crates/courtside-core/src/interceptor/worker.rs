use std::sync::{Arc, RwLock};

use anyhow::Context;
use futures::future::join_all;
use reqwest::Url;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{classify, AssetResponse, CacheStorage, Network, Policy, RequestInfo};
use crate::config::Config;

/// Application shell pre-populated at install, relative to the app origin
pub const DEFAULT_SHELL_PATHS: [&str; 3] = ["./", "./index.html", "./manifest.json"];

/// Served for navigations when the network is unreachable
pub const DEFAULT_NAVIGATION_FALLBACK: &str = "./index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installed,
    Activated,
}

#[derive(Error, Debug)]
pub enum InterceptorError {
    #[error("Cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: WorkerState,
    },
}

#[derive(Debug, Clone)]
pub struct InterceptorConfig {
    /// Versioned asset cache name; changing it retires every older cache
    pub cache_name: String,
    /// Absolute shell URLs fetched at install
    pub shell: Vec<Url>,
    pub navigation_fallback: Url,
    /// Requests to this host (or its subdomains) are data feed calls
    pub feed_host: String,
}

impl InterceptorConfig {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let origin = Url::parse(&config.app_origin)
            .with_context(|| format!("Invalid app origin: {}", config.app_origin))?;
        let shell = DEFAULT_SHELL_PATHS
            .iter()
            .map(|path| origin.join(path))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid shell path")?;
        Ok(Self {
            cache_name: config.asset_cache_name.clone(),
            shell,
            navigation_fallback: origin.join(DEFAULT_NAVIGATION_FALLBACK)?,
            feed_host: config.feed_host().unwrap_or_default(),
        })
    }
}

/// Result of intercepting one request.
#[derive(Debug)]
pub struct Intercepted {
    /// None when the network failed and nothing suitable was cached
    pub response: Option<AssetResponse>,
    /// Background refresh started by stale-while-revalidate
    pub revalidation: Option<JoinHandle<()>>,
}

impl Intercepted {
    fn settled(response: Option<AssetResponse>) -> Self {
        Self {
            response,
            revalidation: None,
        }
    }
}

/// Install -> Activate -> Intercept lifecycle around one asset cache.
///
/// `handle` takes `&self` and is safe to call concurrently from many pages;
/// share the interceptor through an `Arc`.
pub struct Interceptor<N> {
    network: Arc<N>,
    storage: Arc<CacheStorage>,
    config: InterceptorConfig,
    state: RwLock<WorkerState>,
}

impl<N: Network + 'static> Interceptor<N> {
    pub fn new(network: Arc<N>, storage: Arc<CacheStorage>, config: InterceptorConfig) -> Self {
        Self {
            network,
            storage,
            config,
            state: RwLock::new(WorkerState::Parsed),
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, action: &'static str, from: WorkerState, to: WorkerState) -> Result<(), InterceptorError> {
        let mut state = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *state != from {
            return Err(InterceptorError::InvalidTransition { action, state: *state });
        }
        *state = to;
        Ok(())
    }

    /// Open the versioned cache and pre-populate the shell, all or nothing.
    /// A failed shell fetch is logged; the worker is ready either way and
    /// does not wait for a previous version to go away.
    pub async fn install(&self) -> Result<usize, InterceptorError> {
        if self.state() != WorkerState::Parsed {
            return Err(InterceptorError::InvalidTransition {
                action: "install",
                state: self.state(),
            });
        }

        self.storage.open(&self.config.cache_name);

        let requests: Vec<RequestInfo> = self.config.shell.iter().cloned().map(RequestInfo::other).collect();
        let responses = join_all(requests.iter().map(|req| self.network.fetch(req))).await;

        let mut shell = Vec::with_capacity(requests.len());
        let mut failed = false;
        for (request, response) in requests.iter().zip(responses) {
            match response {
                Ok(response) if response.is_cacheable() => shell.push((request.cache_key(), response)),
                Ok(response) => {
                    warn!(url = %request.url, status = response.status, "Shell asset not cacheable");
                    failed = true;
                }
                Err(e) => {
                    warn!(url = %request.url, error = %e, "Failed to fetch shell asset");
                    failed = true;
                }
            }
        }

        let cached = if failed {
            warn!(cache = %self.config.cache_name, "Failed to cache app shell");
            0
        } else {
            let count = shell.len();
            for (key, response) in shell {
                self.storage.put(&self.config.cache_name, &key, response);
            }
            count
        };

        self.transition("install", WorkerState::Parsed, WorkerState::Installed)?;
        info!(cache = %self.config.cache_name, cached, "Interceptor installed");
        Ok(cached)
    }

    /// Delete every cache from another version and take control of requests.
    /// Returns the names of the deleted caches.
    pub fn activate(&self) -> Result<Vec<String>, InterceptorError> {
        self.transition("activate", WorkerState::Installed, WorkerState::Activated)?;

        let stale: Vec<String> = self
            .storage
            .names()
            .into_iter()
            .filter(|name| *name != self.config.cache_name)
            .collect();
        for name in &stale {
            self.storage.delete(name);
            debug!(cache = %name, "Deleted old asset cache");
        }
        info!(cache = %self.config.cache_name, deleted = stale.len(), "Interceptor activated");
        Ok(stale)
    }

    pub async fn handle(&self, request: RequestInfo) -> Intercepted {
        if self.state() != WorkerState::Activated {
            // Not in control yet: requests go straight to the network
            return Intercepted::settled(self.network.fetch(&request).await.ok());
        }

        match classify(&request, &self.config.feed_host) {
            Policy::NetworkFirstApi => {
                let key = request.cache_key();
                Intercepted::settled(self.network_first(&request, &key).await)
            }
            Policy::NetworkFirstNavigation => {
                let key = RequestInfo::other(self.config.navigation_fallback.clone()).cache_key();
                Intercepted::settled(self.network_first(&request, &key).await)
            }
            Policy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        }
    }

    async fn network_first(&self, request: &RequestInfo, fallback_key: &str) -> Option<AssetResponse> {
        match self.network.fetch(request).await {
            Ok(response) => Some(response),
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network failed, trying asset cache");
                self.storage.match_request(&self.config.cache_name, fallback_key)
            }
        }
    }

    async fn stale_while_revalidate(&self, request: RequestInfo) -> Intercepted {
        let key = request.cache_key();
        let cached = self.storage.match_request(&self.config.cache_name, &key);

        let revalidate = revalidate(
            Arc::clone(&self.network),
            Arc::clone(&self.storage),
            self.config.cache_name.clone(),
            request,
            key,
        );

        match cached {
            Some(stale) => Intercepted {
                response: Some(stale),
                revalidation: Some(tokio::spawn(async move {
                    revalidate.await;
                })),
            },
            None => Intercepted::settled(revalidate.await),
        }
    }
}

/// Fetch and, on a 200, overwrite the cached entry for next time.
async fn revalidate<N: Network>(
    network: Arc<N>,
    storage: Arc<CacheStorage>,
    cache_name: String,
    request: RequestInfo,
    key: String,
) -> Option<AssetResponse> {
    match network.fetch(&request).await {
        Ok(response) => {
            if response.is_cacheable() {
                storage.put(&cache_name, &key, response.clone());
            }
            Some(response)
        }
        Err(e) => {
            debug!(url = %request.url, error = %e, "Revalidation failed");
            None
        }
    }
}
