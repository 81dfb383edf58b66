//! One refresh cycle: top ids, concurrent detail fan-out, summary assembly.

use futures::future::try_join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::hn::HnApiError;
use crate::stories::{DetailFetcher, StorySummary, TopIdFetcher};
use crate::utils::{fmt_duration, log_if_slow};

const SLOW_AGGREGATION_THRESHOLD: Duration = Duration::from_secs(5);

/// Builds a complete summary set from the two upstream sources, or fails as a whole.
#[derive(Clone)]
pub struct Aggregator {
    top_ids: Arc<dyn TopIdFetcher>,
    details: Arc<dyn DetailFetcher>,
}

impl Aggregator {
    pub fn new(top_ids: Arc<dyn TopIdFetcher>, details: Arc<dyn DetailFetcher>) -> Self {
        Self { top_ids, details }
    }

    /// Convenience for a single client implementing both sources.
    pub fn from_source<S>(source: Arc<S>) -> Self
    where
        S: TopIdFetcher + DetailFetcher + 'static,
    {
        Self::new(source.clone(), source)
    }

    /// Run one aggregation.
    ///
    /// Summaries come back in top-id order, unsorted by score. The first failed
    /// detail fetch fails the whole run and drops the fetches still pending.
    pub async fn aggregate(&self) -> Result<Vec<StorySummary>, HnApiError> {
        let start = Instant::now();

        let ids = self.top_ids.fetch_top_ids().await?;
        if ids.is_empty() {
            debug!("Top story list is empty, nothing to fetch");
            return Ok(Vec::new());
        }
        debug!(ids = ids.len(), "Fetching story details");

        let details = try_join_all(ids.iter().map(|&id| self.details.fetch_detail(id))).await?;
        let stories: Vec<StorySummary> = details.into_iter().map(StorySummary::from).collect();

        log_if_slow(start, SLOW_AGGREGATION_THRESHOLD, "story aggregation");
        info!(
            stories = stories.len(),
            duration = fmt_duration(start.elapsed()),
            "Stories aggregated"
        );
        Ok(stories)
    }
}
