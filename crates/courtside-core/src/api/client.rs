//! HTTP client for the public league data feed.
//!
//! The feed is unauthenticated and read-only. `FeedClient` issues the four
//! upstream requests the orchestrator needs and decodes them into the wire
//! types in `super::wire`; it never normalizes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::wire::{RosterResponse, ScoreboardResponse, StandingsResponse, TeamScheduleResponse};
use super::{FeedError, FeedResult};
use crate::config::Config;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// The four upstream resources, each returning a classified failure.
///
/// `SyncService` is generic over this so tests can script upstream behavior.
#[async_trait]
pub trait Feed: Send + Sync {
    async fn standings(&self) -> FeedResult<StandingsResponse>;

    /// Scoreboard for one calendar day
    async fn scoreboard(&self, day: NaiveDate) -> FeedResult<ScoreboardResponse>;

    async fn team_roster(&self, team_id: &str) -> FeedResult<RosterResponse>;

    /// Full season schedule for a team, past and future
    async fn team_schedule(&self, team_id: &str) -> FeedResult<TeamScheduleResponse>;
}

/// reqwest-backed `Feed`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
    site_api_url: Url,
    core_api_url: String,
    timeout: Duration,
}

impl FeedClient {
    pub fn new(config: &Config) -> FeedResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("courtside/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let site = config.site_api_url.trim_end_matches('/');
        let site_api_url = Url::parse(site).map_err(|e| FeedError::InvalidUrl(format!("{}: {}", site, e)))?;
        if site_api_url.cannot_be_a_base() {
            return Err(FeedError::InvalidUrl(site.to_string()));
        }

        Ok(Self {
            client,
            site_api_url,
            core_api_url: config.core_api_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Site API URL with `segments` appended, each escaped as a single path
    /// segment so ids from user input cannot change the endpoint.
    fn site_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.site_api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn team_url(&self, team_id: &str, tail: &[&str]) -> Url {
        self.site_url(["teams", team_id].into_iter().chain(tail.iter().copied()))
    }

    /// Upstream day parameter, e.g. 20240115
    pub(crate) fn format_day(day: NaiveDate) -> String {
        day.format("%Y%m%d").to_string()
    }

    fn map_send_error(&self, e: reqwest::Error) -> FeedError {
        if e.is_timeout() {
            FeedError::Timeout(self.timeout)
        } else {
            FeedError::Network(e)
        }
    }

    /// Check if response is successful.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other statuses.
    async fn check_response_for_retry(response: reqwest::Response) -> FeedResult<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(FeedError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> FeedResult<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response.text().await.map_err(|e| self.map_send_error(e))?;
                    debug!(url = url, bytes = text.len(), "Feed response received");
                    return serde_json::from_str(&text)
                        .map_err(|e| FeedError::InvalidResponse(format!("{}: {}", url, e)));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(FeedError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl Feed for FeedClient {
    async fn standings(&self) -> FeedResult<StandingsResponse> {
        let url = format!("{}/standings", self.core_api_url);
        self.get(&url).await
    }

    async fn scoreboard(&self, day: NaiveDate) -> FeedResult<ScoreboardResponse> {
        let mut url = self.site_url(["scoreboard"]);
        url.query_pairs_mut().append_pair("dates", &Self::format_day(day));
        self.get(url.as_str()).await
    }

    async fn team_roster(&self, team_id: &str) -> FeedResult<RosterResponse> {
        let mut url = self.team_url(team_id, &[]);
        url.set_query(Some("enable=roster"));
        self.get(url.as_str()).await
    }

    async fn team_schedule(&self, team_id: &str) -> FeedResult<TeamScheduleResponse> {
        let url = self.team_url(team_id, &["schedule"]);
        self.get(url.as_str()).await
    }
}
