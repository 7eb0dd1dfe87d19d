use super::{RequestInfo, RequestMode};

/// How an intercepted request is answered. First match wins, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Data feed: network, then whatever the asset cache has for the request
    NetworkFirstApi,
    /// Page navigation: network, then the cached shell entry point
    NetworkFirstNavigation,
    /// Static assets: cached copy now, refresh in the background
    StaleWhileRevalidate,
}

/// Pure routing on request host and mode.
pub fn classify(request: &RequestInfo, feed_host: &str) -> Policy {
    if request.url.host_str().is_some_and(|host| host_matches(host, feed_host)) {
        Policy::NetworkFirstApi
    } else if request.mode == RequestMode::Navigate {
        Policy::NetworkFirstNavigation
    } else {
        Policy::StaleWhileRevalidate
    }
}

/// Exact host or any subdomain of it
fn host_matches(host: &str, feed_host: &str) -> bool {
    if feed_host.is_empty() {
        return false;
    }
    host.eq_ignore_ascii_case(feed_host)
        || host
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", feed_host.to_ascii_lowercase()))
}
