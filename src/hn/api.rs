//! HTTP client for the Hacker News Firebase API.

use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

use crate::hn::json::{is_empty_payload, parse_json_with_context};
use crate::hn::{HnApiError, StoryDetail, StoryId};
use crate::stories::{DetailFetcher, TopIdFetcher};

/// Public Hacker News API root.
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Ranked list the service serves from.
const TOP_STORIES_PATH: &str = "beststories.json";

/// Client for the Hacker News API.
#[derive(Debug, Clone)]
pub struct HackerNewsApi {
    http: reqwest::Client,
    /// Base URL without a trailing slash.
    base_url: String,
}

impl HackerNewsApi {
    /// Build a client rooted at `base_url`, with `timeout` applied to every request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, anyhow::Error> {
        let parsed = Url::parse(base_url)
            .with_context(|| format!("Invalid Hacker News base URL: {base_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Unsupported scheme for Hacker News base URL: {base_url}");
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hn-stories/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_owned(),
        })
    }

    pub fn top_stories_url(&self) -> String {
        format!("{}/{TOP_STORIES_PATH}", self.base_url)
    }

    pub fn item_url(&self, id: StoryId) -> String {
        format!("{}/item/{id}.json", self.base_url)
    }

    /// GET `url` and return the body of a successful response.
    async fn get_text(&self, url: &str) -> Result<String, HnApiError> {
        trace!(url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| HnApiError::RequestFailed {
                url: url.to_owned(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Upstream returned error status");
            return Err(HnApiError::BadStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|source| HnApiError::RequestFailed {
            url: url.to_owned(),
            source,
        })
    }
}

/// Parse a top-stories body. Empty payloads yield an empty list.
pub fn parse_top_ids(url: &str, body: &str) -> Result<Vec<StoryId>, HnApiError> {
    if is_empty_payload(body) {
        return Ok(Vec::new());
    }
    parse_json_with_context(body).map_err(|source| HnApiError::InvalidJson {
        url: url.to_owned(),
        source,
    })
}

/// Parse an item body. Empty payloads mean the story does not exist.
pub fn parse_story_detail(id: StoryId, url: &str, body: &str) -> Result<StoryDetail, HnApiError> {
    if is_empty_payload(body) {
        return Err(HnApiError::StoryMissing(id));
    }
    parse_json_with_context(body).map_err(|source| HnApiError::InvalidJson {
        url: url.to_owned(),
        source,
    })
}

#[async_trait]
impl TopIdFetcher for HackerNewsApi {
    async fn fetch_top_ids(&self) -> Result<Vec<StoryId>, HnApiError> {
        let url = self.top_stories_url();
        let body = self.get_text(&url).await?;
        let ids = parse_top_ids(&url, &body)?;
        debug!(count = ids.len(), "Fetched top story ids");
        Ok(ids)
    }
}

#[async_trait]
impl DetailFetcher for HackerNewsApi {
    async fn fetch_detail(&self, id: StoryId) -> Result<StoryDetail, HnApiError> {
        let url = self.item_url(id);
        let body = self.get_text(&url).await?;
        parse_story_detail(id, &url, &body)
    }
}
