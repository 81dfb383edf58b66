//! Error types for the Hacker News API client.

use crate::hn::StoryId;

#[derive(Debug, thiserror::Error)]
pub enum HnApiError {
    /// The upstream answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    BadStatus { url: String, status: u16 },
    /// The request could not be sent, or the body could not be read.
    #[error("request to {url} failed")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid JSON received from {url}")]
    InvalidJson {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("no details found for story {0}")]
    StoryMissing(StoryId),
}

impl HnApiError {
    /// Whether the failure happened on the wire rather than in the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::BadStatus { .. } | Self::RequestFailed { .. })
    }
}
