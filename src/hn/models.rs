//! Wire models for the Hacker News API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hacker News item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub u64);

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for StoryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A story item as returned by `/item/{id}.json`.
///
/// Only `score` is mandatory; the API omits fields freely (e.g. `url` on Ask HN
/// posts, `descendants` on jobs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryDetail {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub by: Option<String>,
    /// Creation time, seconds since the Unix epoch.
    #[serde(default)]
    pub time: u64,
    pub score: u32,
    #[serde(default)]
    pub descendants: u32,
}
