mod helpers;

use helpers::{FakeUpstream, LATENCY, TTL, scores, story, titles};
use hn_stories::hn::{HnApiError, StoryDetail, StoryId};
use hn_stories::stories::{StalePolicy, StoryCache, StoryCacheError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

fn missing_story(err: &StoryCacheError) -> Option<StoryId> {
    let StoryCacheError::AggregationFailed(source) = err;
    match source.as_ref() {
        HnApiError::StoryMissing(id) => Some(*id),
        _ => None,
    }
}

#[tokio::test(start_paused = true)]
async fn returns_highest_scored_stories_first() {
    let upstream = FakeUpstream::with_scores(&[5, 4, 3, 2, 1]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    let stories = cache.get_top_n(3).await.unwrap();
    assert_eq!(titles(&stories), vec!["Story 1", "Story 2", "Story 3"]);
    assert_eq!(scores(&stories), vec![5, 4, 3]);
}

#[tokio::test(start_paused = true)]
async fn result_is_ranked_and_sized_for_any_count() {
    let upstream = FakeUpstream::with_scores(&[3, 9, 1, 7, 5]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    for count in 0..=8 {
        let stories = cache.get_top_n(count).await.unwrap();
        assert_eq!(stories.len(), count.min(5), "count {count}");
        assert!(
            stories.windows(2).all(|w| w[0].score >= w[1].score),
            "count {count} not ranked: {:?}",
            scores(&stories)
        );
    }
    assert_eq!(scores(&cache.get_top_n(5).await.unwrap()), vec![9, 7, 5, 3, 1]);
    assert_eq!(upstream.top_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn summary_carries_upstream_fields() {
    let detail = StoryDetail {
        title: Some("Hot Story".into()),
        url: Some("SomeUrl".into()),
        by: Some("SomeAuthor".into()),
        time: 99999,
        score: 9,
        descendants: 10,
    };
    let upstream = FakeUpstream::with_details(vec![(42, detail)]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    let stories = cache.get_top_n(1).await.unwrap();
    assert_eq!(stories.len(), 1);
    let story = &stories[0];
    assert_eq!(story.title.as_deref(), Some("Hot Story"));
    assert_eq!(story.uri.as_deref(), Some("SomeUrl"));
    assert_eq!(story.posted_by.as_deref(), Some("SomeAuthor"));
    assert_eq!(story.time.timestamp(), 99999);
    assert_eq!(story.score, 9);
    assert_eq!(story.comment_count, 10);
}

#[tokio::test(start_paused = true)]
async fn cold_read_fetches_each_story_once() {
    let upstream = FakeUpstream::with_scores(&[10, 20, 30, 40, 50]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    cache.get_top_n(2).await.unwrap();
    assert_eq!(upstream.top_calls(), 1);
    assert_eq!(upstream.detail_calls(), 5);
    for id in 1..=5 {
        assert_eq!(upstream.detail_calls_for(id), 1, "story {id}");
    }
}

#[tokio::test(start_paused = true)]
async fn reads_within_ttl_are_served_from_cache() {
    let upstream = FakeUpstream::with_scores(&[1, 2, 3]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    let first = cache.get_top_n(3).await.unwrap();
    tokio::time::advance(TTL - Duration::from_secs(1)).await;
    let second = cache.get_top_n(3).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(upstream.top_calls(), 1);
    assert_eq!(upstream.detail_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn concurrent_cold_reads_share_one_refresh() {
    let upstream = FakeUpstream::with_scores(&[8, 6, 7, 5, 3, 0, 9]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    let mut readers = JoinSet::new();
    for i in 0..16usize {
        let cache = cache.clone();
        let count = i % 9;
        readers.spawn(async move { (count, cache.get_top_n(count).await) });
    }

    while let Some(joined) = readers.join_next().await {
        let (count, result) = joined.unwrap();
        let stories = result.unwrap();
        assert_eq!(stories.len(), count.min(7));
        assert!(stories.windows(2).all(|w| w[0].score >= w[1].score));
    }

    assert_eq!(upstream.top_calls(), 1);
    for id in 1..=7 {
        assert_eq!(upstream.detail_calls_for(id), 1, "story {id}");
    }
}

#[tokio::test(start_paused = true)]
async fn empty_top_list_is_a_cached_empty_result() {
    let upstream = FakeUpstream::with_scores(&[]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    assert!(cache.get_top_n(5).await.unwrap().is_empty());
    assert!(cache.get_top_n(5).await.unwrap().is_empty());
    assert_eq!(upstream.top_calls(), 1);
    assert_eq!(upstream.detail_calls(), 0);

    let status = cache.status();
    assert_eq!(status.stories, 0);
    assert!(status.refreshed_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn missing_story_fails_every_waiting_caller_alike() {
    let upstream = FakeUpstream::with_scores(&[5, 4, 3, 2, 1]);
    upstream.remove_detail(3);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    let (a, b, c) = tokio::join!(cache.get_top_n(1), cache.get_top_n(3), cache.get_top_n(10));
    let (a, b, c) = (a.unwrap_err(), b.unwrap_err(), c.unwrap_err());

    assert_eq!(missing_story(&a), Some(StoryId(3)));
    let StoryCacheError::AggregationFailed(a) = a;
    let StoryCacheError::AggregationFailed(b) = b;
    let StoryCacheError::AggregationFailed(c) = c;
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &c));

    assert_eq!(upstream.top_calls(), 1);
    let status = cache.status();
    assert_eq!(status.stories, 0);
    assert!(status.refreshed_at.is_none());
    assert!(!status.refreshing);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_is_not_cached() {
    let upstream = FakeUpstream::with_scores(&[1, 2]);
    upstream.set_top_ids_down(true);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    let err = cache.get_top_n(2).await.unwrap_err();
    let StoryCacheError::AggregationFailed(source) = &err;
    assert!(matches!(source.as_ref(), HnApiError::BadStatus { status: 503, .. }));
    assert_eq!(upstream.detail_calls(), 0);

    // The next read retries instead of replaying the failure.
    upstream.set_top_ids_down(false);
    assert_eq!(cache.get_top_n(2).await.unwrap().len(), 2);
    assert_eq!(upstream.top_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_is_refreshed_on_read() {
    let upstream = FakeUpstream::with_scores(&[5, 4, 3]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    assert_eq!(titles(&cache.get_top_n(1).await.unwrap()), vec!["Story 1"]);

    upstream.put_detail(3, story(3, 100));
    tokio::time::advance(TTL).await;

    assert_eq!(titles(&cache.get_top_n(1).await.unwrap()), vec!["Story 3"]);
    assert_eq!(upstream.top_calls(), 2);
    assert_eq!(upstream.detail_calls(), 6);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_entry_in_place() {
    let upstream = FakeUpstream::with_scores(&[5, 4, 3, 2, 1]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    cache.get_top_n(5).await.unwrap();
    let refreshed_at = cache.status().refreshed_at;

    tokio::time::advance(TTL).await;
    let removed = upstream.remove_detail(2).unwrap();
    let err = cache.get_top_n(5).await.unwrap_err();
    assert_eq!(missing_story(&err), Some(StoryId(2)));

    // Expired data stays published but is not served.
    let status = cache.status();
    assert_eq!(status.stories, 5);
    assert_eq!(status.refreshed_at, refreshed_at);
    assert_eq!(status.expires_in_secs, None);

    upstream.put_detail(2, removed);
    assert_eq!(cache.get_top_n(5).await.unwrap().len(), 5);
    assert_eq!(upstream.top_calls(), 3);
    assert_eq!(cache.status().expires_in_secs, Some(TTL.as_secs()));
}

#[tokio::test(start_paused = true)]
async fn serve_stale_policy_masks_refresh_failure() {
    let upstream = FakeUpstream::with_scores(&[5, 4, 3]);
    let cache = StoryCache::with_stale_policy(upstream.aggregator(), TTL, StalePolicy::ServeStale);

    let fresh = cache.get_top_n(3).await.unwrap();
    tokio::time::advance(TTL).await;
    upstream.set_top_ids_down(true);

    let stale = cache.get_top_n(3).await.unwrap();
    assert_eq!(stale, fresh);
    assert_eq!(upstream.top_calls(), 2);

    // Without any entry there is nothing stale to fall back on.
    cache.invalidate();
    assert!(cache.get_top_n(3).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn invalidate_forces_next_read_to_refresh() {
    let upstream = FakeUpstream::with_scores(&[1, 2, 3]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    cache.get_top_n(1).await.unwrap();
    cache.invalidate();
    assert_eq!(cache.status().stories, 0);

    cache.get_top_n(1).await.unwrap();
    assert_eq!(upstream.top_calls(), 2);
    assert_eq!(cache.status().stories, 3);
}

#[tokio::test(start_paused = true)]
async fn abandoned_refresh_is_resumed_by_next_caller() {
    let upstream = FakeUpstream::with_scores(&[3, 2, 1]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    let abandoned = tokio::time::timeout(LATENCY / 5, cache.get_top_n(3)).await;
    assert!(abandoned.is_err());
    assert!(cache.status().refreshing);

    let stories = cache.get_top_n(3).await.unwrap();
    assert_eq!(scores(&stories), vec![3, 2, 1]);
    assert_eq!(upstream.top_calls(), 1);
    assert_eq!(upstream.detail_calls(), 3);
    assert!(!cache.status().refreshing);
}

#[tokio::test(start_paused = true)]
async fn status_reports_published_entry() {
    let upstream = FakeUpstream::with_scores(&[1, 2, 3, 4]);
    let cache = StoryCache::new(upstream.aggregator(), TTL);

    let cold = cache.status();
    assert_eq!(cold.stories, 0);
    assert_eq!(cold.expires_in_secs, None);
    assert!(!cold.refreshing);

    cache.get_top_n(1).await.unwrap();
    let warm = cache.status();
    assert_eq!(warm.stories, 4);
    assert_eq!(warm.expires_in_secs, Some(TTL.as_secs()));
    assert!(warm.refreshed_at.is_some());
}
