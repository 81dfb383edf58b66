//! Single-flight TTL cache over the story aggregator.
//!
//! The cache holds at most one [`CacheEntry`], published through a `watch`
//! channel so hits never take a lock. On a miss, callers pass through a gate
//! that either installs a new refresh or hands out the one already in flight;
//! the refresh itself is a [`Shared`] future, so every caller that joined it
//! observes the same outcome, success or failure.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::hn::HnApiError;
use crate::stories::{Aggregator, StorySummary};

/// Default lifetime of a published entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoryCacheError {
    /// A refresh failed; every caller that waited on it receives the same source.
    #[error("story aggregation failed")]
    AggregationFailed(#[source] Arc<HnApiError>),
}

/// What callers get when an expired entry is present and its refresh fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Propagate the failure; expired data is never served.
    #[default]
    Discard,
    /// Serve the expired entry and log the failure.
    ServeStale,
}

impl StalePolicy {
    pub fn from_stale_if_error(stale_if_error: bool) -> Self {
        if stale_if_error {
            Self::ServeStale
        } else {
            Self::Discard
        }
    }
}

/// An immutable snapshot of one successful aggregation.
#[derive(Debug)]
pub struct CacheEntry {
    /// In top-id order, not ranked.
    stories: Vec<StorySummary>,
    expires_at: Instant,
    refreshed_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(stories: Vec<StorySummary>, ttl: Duration) -> Self {
        Self {
            stories,
            expires_at: Instant::now() + ttl,
            refreshed_at: Utc::now(),
        }
    }

    pub fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// The `count` highest-scored stories, best first. Equal scores keep their
    /// top-id order.
    pub fn top_n(&self, count: usize) -> Vec<StorySummary> {
        let mut ranked: Vec<&StorySummary> = self.stories.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.into_iter().take(count).cloned().collect()
    }
}

/// Point-in-time view of the cache for the status endpoint.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub stories: usize,
    /// `None` when nothing fresh is cached.
    pub expires_in_secs: Option<u64>,
    pub refreshing: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
}

type RefreshOutcome = Result<Arc<CacheEntry>, StoryCacheError>;
type InFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

struct Inner {
    aggregator: Aggregator,
    ttl: Duration,
    stale_policy: StalePolicy,
    /// Current entry, swapped atomically on refresh.
    entry: watch::Sender<Option<Arc<CacheEntry>>>,
    /// The gate. Holds the refresh in flight, if any.
    inflight: Mutex<Option<InFlight>>,
    refreshing: AtomicBool,
}

/// Shared story cache. Clone-cheap.
#[derive(Clone)]
pub struct StoryCache {
    inner: Arc<Inner>,
}

impl StoryCache {
    pub fn new(aggregator: Aggregator, ttl: Duration) -> Self {
        Self::with_stale_policy(aggregator, ttl, StalePolicy::default())
    }

    pub fn with_stale_policy(
        aggregator: Aggregator,
        ttl: Duration,
        stale_policy: StalePolicy,
    ) -> Self {
        let (entry, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                aggregator,
                ttl,
                stale_policy,
                entry,
                inflight: Mutex::new(None),
                refreshing: AtomicBool::new(false),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// The `count` highest-scored stories, refreshing first if the entry is
    /// absent or expired. Returns fewer than `count` when fewer are cached.
    pub async fn get_top_n(&self, count: usize) -> Result<Vec<StorySummary>, StoryCacheError> {
        if let Some(entry) = self.fresh_entry() {
            trace!(count, "Story cache hit");
            return Ok(entry.top_n(count));
        }

        let refresh = {
            let mut gate = self.inner.inflight.lock().await;
            // A refresh may have published while this caller waited on the gate.
            if let Some(entry) = self.fresh_entry() {
                return Ok(entry.top_n(count));
            }
            match gate.as_ref() {
                Some(inflight) => {
                    debug!("Joining in-flight story refresh");
                    inflight.clone()
                }
                None => {
                    let inflight = self.start_refresh();
                    *gate = Some(inflight.clone());
                    inflight
                }
            }
        };

        match refresh.await {
            Ok(entry) => Ok(entry.top_n(count)),
            Err(err) => match (self.inner.stale_policy, self.current_entry()) {
                (StalePolicy::ServeStale, Some(stale)) => {
                    warn!(
                        error = ?err,
                        stories = stale.len(),
                        "Story refresh failed, serving stale entry"
                    );
                    Ok(stale.top_n(count))
                }
                _ => Err(err),
            },
        }
    }

    /// Drop the current entry so the next read refreshes. A refresh already in
    /// flight still publishes when it completes.
    pub fn invalidate(&self) {
        if self.inner.entry.send_replace(None).is_some() {
            info!("Story cache invalidated");
        }
    }

    pub fn status(&self) -> CacheStatus {
        let entry = self.current_entry();
        let now = Instant::now();
        CacheStatus {
            stories: entry.as_ref().map_or(0, |e| e.len()),
            expires_in_secs: entry
                .as_ref()
                .filter(|e| e.expires_at > now)
                .map(|e| (e.expires_at - now).as_secs()),
            refreshing: self.inner.refreshing.load(Ordering::Acquire),
            refreshed_at: entry.map(|e| e.refreshed_at),
        }
    }

    fn current_entry(&self) -> Option<Arc<CacheEntry>> {
        self.inner.entry.borrow().clone()
    }

    fn fresh_entry(&self) -> Option<Arc<CacheEntry>> {
        self.current_entry().filter(|e| e.is_fresh())
    }

    /// Build the shared refresh future. Must be called with the gate held.
    fn start_refresh(&self) -> InFlight {
        let aggregator = self.inner.aggregator.clone();
        let ttl = self.inner.ttl;
        let cache = Arc::downgrade(&self.inner);
        self.inner.refreshing.store(true, Ordering::Release);
        debug!("Starting story refresh");

        async move {
            let outcome = match aggregator.aggregate().await {
                Ok(stories) => Ok(Arc::new(CacheEntry::new(stories, ttl))),
                Err(e) => Err(StoryCacheError::AggregationFailed(Arc::new(e))),
            };
            publish(&cache, &outcome).await;
            outcome
        }
        .boxed()
        .shared()
    }
}

/// Publish a finished refresh and release the gate's in-flight slot.
async fn publish(cache: &Weak<Inner>, outcome: &RefreshOutcome) {
    let Some(inner) = cache.upgrade() else {
        return;
    };

    match outcome {
        Ok(entry) => {
            inner.entry.send_replace(Some(entry.clone()));
            info!(
                stories = entry.len(),
                ttl_secs = inner.ttl.as_secs(),
                "Story cache refreshed"
            );
        }
        Err(err) => {
            // The previous entry, if any, stays in place.
            warn!(error = ?err, "Story cache refresh failed");
        }
    }

    *inner.inflight.lock().await = None;
    inner.refreshing.store(false, Ordering::Release);
}
