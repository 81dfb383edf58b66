//! Top-story handlers.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use crate::state::AppState;
use crate::web::error::{ApiError, cache_error};
use crate::web::routes::{cache, with_cache_control};

#[derive(Debug, Deserialize)]
pub struct StoriesParams {
    pub count: Option<String>,
}

/// `GET /api/stories/{count}`
pub(super) async fn top_stories_by_path(
    State(state): State<AppState>,
    Path(count): Path<String>,
) -> Result<Response, ApiError> {
    let count = parse_count(&count)?;
    top_stories(&state, Some(count)).await
}

/// `GET /api/stories?count={n}` (count optional)
pub(super) async fn top_stories_by_query(
    State(state): State<AppState>,
    Query(params): Query<StoriesParams>,
) -> Result<Response, ApiError> {
    let count = params.count.as_deref().map(parse_count).transpose()?;
    top_stories(&state, count).await
}

async fn top_stories(state: &AppState, requested: Option<usize>) -> Result<Response, ApiError> {
    let count = state.limits.resolve(requested);
    let stories = state
        .story_cache
        .get_top_n(count)
        .await
        .map_err(|e| cache_error("Top stories lookup", e))?;

    debug!(requested = ?requested, count, returned = stories.len(), "Serving top stories");
    Ok(with_cache_control(stories, cache::STORIES))
}

fn parse_count(raw: &str) -> Result<usize, ApiError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| ApiError::invalid_count(raw))
}
