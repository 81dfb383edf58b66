//! Story aggregation and the cache that serves it.

pub mod aggregator;
pub mod cache;
pub mod source;
pub mod summary;

pub use aggregator::Aggregator;
pub use cache::{CacheStatus, StalePolicy, StoryCache, StoryCacheError};
pub use source::{DetailFetcher, TopIdFetcher};
pub use summary::StorySummary;
