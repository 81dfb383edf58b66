//! Collaborator seams the aggregator fetches through.

use async_trait::async_trait;

use crate::hn::{HnApiError, StoryDetail, StoryId};

/// Source of the current ranked list of candidate stories.
#[async_trait]
pub trait TopIdFetcher: Send + Sync {
    /// An empty list is a valid answer, not an error.
    async fn fetch_top_ids(&self) -> Result<Vec<StoryId>, HnApiError>;
}

/// Source of per-story detail records.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    /// Fails with [`HnApiError::StoryMissing`] when the upstream has no record.
    async fn fetch_detail(&self, id: StoryId) -> Result<StoryDetail, HnApiError>;
}
