//! Shared fakes for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use hn_stories::hn::{HnApiError, StoryDetail, StoryId};
use hn_stories::stories::{Aggregator, DetailFetcher, StorySummary, TopIdFetcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Simulated round trip for every upstream call. Tests run on a paused clock,
/// so this only orders events; it never slows the suite down.
pub const LATENCY: Duration = Duration::from_millis(50);

pub const TTL: Duration = Duration::from_secs(10 * 60);

/// A detail record for story `id` with the given score.
pub fn story(id: u64, score: u32) -> StoryDetail {
    StoryDetail {
        title: Some(format!("Story {id}")),
        url: Some(format!("https://example.com/{id}")),
        by: Some(format!("author{id}")),
        time: 1_700_000_000 + id,
        score,
        descendants: id as u32,
    }
}

pub fn titles(stories: &[StorySummary]) -> Vec<String> {
    stories.iter().filter_map(|s| s.title.clone()).collect()
}

pub fn scores(stories: &[StorySummary]) -> Vec<u32> {
    stories.iter().map(|s| s.score).collect()
}

#[derive(Default)]
struct Upstream {
    ids: Vec<StoryId>,
    details: HashMap<StoryId, StoryDetail>,
    top_ids_down: bool,
}

/// In-memory Hacker News that counts every call it receives.
pub struct FakeUpstream {
    state: Mutex<Upstream>,
    top_calls: AtomicUsize,
    detail_calls: Mutex<HashMap<StoryId, usize>>,
}

impl FakeUpstream {
    /// Stories `1..=n` in rank order, story `i + 1` scored `scores[i]`.
    pub fn with_scores(scores: &[u32]) -> Arc<Self> {
        Self::with_details(
            (1..)
                .zip(scores)
                .map(|(id, &score)| (id, story(id, score)))
                .collect(),
        )
    }

    pub fn with_details(details: Vec<(u64, StoryDetail)>) -> Arc<Self> {
        let upstream = Upstream {
            ids: details.iter().map(|(id, _)| StoryId(*id)).collect(),
            details: details
                .into_iter()
                .map(|(id, detail)| (StoryId(id), detail))
                .collect(),
            top_ids_down: false,
        };
        Arc::new(Self {
            state: Mutex::new(upstream),
            top_calls: AtomicUsize::new(0),
            detail_calls: Mutex::new(HashMap::new()),
        })
    }

    pub fn aggregator(self: &Arc<Self>) -> Aggregator {
        Aggregator::from_source(self.clone())
    }

    /// Make the upstream answer "no such item" for `id`.
    pub fn remove_detail(&self, id: u64) -> Option<StoryDetail> {
        self.state.lock().unwrap().details.remove(&StoryId(id))
    }

    pub fn put_detail(&self, id: u64, detail: StoryDetail) {
        self.state.lock().unwrap().details.insert(StoryId(id), detail);
    }

    pub fn set_top_ids_down(&self, down: bool) {
        self.state.lock().unwrap().top_ids_down = down;
    }

    pub fn top_calls(&self) -> usize {
        self.top_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.lock().unwrap().values().sum()
    }

    pub fn detail_calls_for(&self, id: u64) -> usize {
        self.detail_calls
            .lock()
            .unwrap()
            .get(&StoryId(id))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl TopIdFetcher for FakeUpstream {
    async fn fetch_top_ids(&self) -> Result<Vec<StoryId>, HnApiError> {
        self.top_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(LATENCY).await;

        let state = self.state.lock().unwrap();
        if state.top_ids_down {
            return Err(HnApiError::BadStatus {
                url: "http://hn.test/v0/beststories.json".to_owned(),
                status: 503,
            });
        }
        Ok(state.ids.clone())
    }
}

#[async_trait]
impl DetailFetcher for FakeUpstream {
    async fn fetch_detail(&self, id: StoryId) -> Result<StoryDetail, HnApiError> {
        *self.detail_calls.lock().unwrap().entry(id).or_default() += 1;
        tokio::time::sleep(LATENCY).await;

        self.state
            .lock()
            .unwrap()
            .details
            .get(&id)
            .cloned()
            .ok_or(HnApiError::StoryMissing(id))
    }
}
