//! Cache-resident story summaries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::hn::StoryDetail;

/// A ranked story as served to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    pub title: Option<String>,
    pub uri: Option<String>,
    pub posted_by: Option<String>,
    pub time: DateTime<Utc>,
    pub score: u32,
    pub comment_count: u32,
}

impl From<StoryDetail> for StorySummary {
    fn from(detail: StoryDetail) -> Self {
        Self {
            title: detail.title,
            uri: detail.url,
            posted_by: detail.by,
            time: from_unix_seconds(detail.time),
            score: detail.score,
            comment_count: detail.descendants,
        }
    }
}

/// Convert epoch seconds to a UTC timestamp.
///
/// `DateTime<Utc>` tops out near year 262143, far below `u64::MAX` seconds;
/// anything past that saturates to [`DateTime::<Utc>::MAX_UTC`].
pub fn from_unix_seconds(secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
