//! Application configuration management.
//!
//! Configuration is stored at `~/.config/courtside/config.json`. Every field
//! has a default, so a missing or partial file is fine.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "courtside";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Overrides the cache directory when set
pub const CACHE_DIR_ENV: &str = "COURTSIDE_CACHE_DIR";

const DEFAULT_SITE_API_URL: &str = "https://site.api.espn.com/apis/site/v2/sports/basketball/nba";
const DEFAULT_CORE_API_URL: &str = "https://site.api.espn.com/apis/v2/sports/basketball/nba";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Days covered by the schedule, today inclusive.
const DEFAULT_SCHEDULE_DAYS: u32 = 5;

const DEFAULT_ASSET_CACHE_NAME: &str = "league-terminal-v1";
const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site_api_url: String,
    pub core_api_url: String,
    pub request_timeout_secs: u64,
    pub schedule_days: u32,
    /// Versioned name of the interceptor's asset cache
    pub asset_cache_name: String,
    /// Origin the application shell is served from
    pub app_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_api_url: DEFAULT_SITE_API_URL.to_string(),
            core_api_url: DEFAULT_CORE_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            schedule_days: DEFAULT_SCHEDULE_DAYS,
            asset_cache_name: DEFAULT_ASSET_CACHE_NAME.to_string(),
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Host of the data feed, used to route intercepted requests.
    pub fn feed_host(&self) -> Option<String> {
        reqwest::Url::parse(&self.site_api_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"schedule_days": 7}"#).unwrap();
        assert_eq!(config.schedule_days, 7);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.asset_cache_name, "league-terminal-v1");
    }

    #[test]
    fn test_feed_host() {
        assert_eq!(Config::default().feed_host().as_deref(), Some("site.api.espn.com"));
        let config = Config {
            site_api_url: "not a url".to_string(),
            ..Config::default()
        };
        assert_eq!(config.feed_host(), None);
    }
}
