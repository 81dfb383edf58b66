//! Configuration module for the hn-stories application.
//!
//! Values come from raw environment variables (optionally seeded from a `.env`
//! file). Durations accept unit strings such as `10m` or `30s`, or a bare
//! number of seconds.

use figment::Figment;
use figment::providers::Env;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::hn::DEFAULT_BASE_URL;
use crate::stories::StalePolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Log level for this crate when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Port for the web server
    #[serde(default = "default_port")]
    pub port: u16,
    /// Graceful shutdown budget
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub shutdown_timeout: Duration,
    /// Hacker News API root, e.g. `https://hacker-news.firebaseio.com/v0`
    #[serde(default = "default_hn_base_url")]
    pub hn_base_url: String,
    /// Timeout applied to each upstream request
    #[serde(
        default = "default_hn_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub hn_request_timeout: Duration,
    /// How long an aggregated story set is served before refreshing
    #[serde(default = "default_cache_ttl", deserialize_with = "deserialize_duration")]
    pub cache_ttl: Duration,
    /// Story count used when a request does not specify one
    #[serde(default = "default_story_count")]
    pub default_story_count: usize,
    /// Upper bound on the story count a request may ask for
    #[serde(default = "default_max_story_count")]
    pub max_story_count: usize,
    /// Serve an expired entry when its refresh fails
    #[serde(default)]
    pub stale_if_error: bool,
    /// Prime the cache during startup
    #[serde(default = "default_true")]
    pub warm_cache: bool,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::new().merge(Env::raw().only(&[
            "LOG_LEVEL",
            "PORT",
            "SHUTDOWN_TIMEOUT",
            "HN_BASE_URL",
            "HN_REQUEST_TIMEOUT",
            "CACHE_TTL",
            "DEFAULT_STORY_COUNT",
            "MAX_STORY_COUNT",
            "STALE_IF_ERROR",
            "WARM_CACHE",
        ]))
    }

    pub fn stale_policy(&self) -> StalePolicy {
        StalePolicy::from_stale_if_error(self.stale_if_error)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_hn_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_hn_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_cache_ttl() -> Duration {
    crate::stories::cache::DEFAULT_TTL
}

fn default_story_count() -> usize {
    10
}

fn default_max_story_count() -> usize {
    500
}

fn default_true() -> bool {
    true
}

/// Deserialize a duration from either a unit string (`"10m"`, `"1.5s"`) or a
/// number of seconds.
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => fundu::parse_duration(text.trim())
            .map_err(|e| serde::de::Error::custom(format!("invalid duration '{text}': {e}"))),
    }
}
