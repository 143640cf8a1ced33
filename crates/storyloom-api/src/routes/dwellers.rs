//! Routes for dweller-centric context queries.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use storyloom_core::repository::ArcFilter;
use storyloom_signals::{ArcContext, OpenThread, open_threads};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

const MAX_THREADS: usize = 20;
const CANDIDATE_ARCS: i64 = 200;

/// Query parameters for GET /{id}/open-threads.
#[derive(Debug, Deserialize)]
pub struct OpenThreadsParams {
    /// Restrict to one world.
    pub world_id: Option<Uuid>,
    /// Override the thread cap, at most 20.
    pub limit: Option<usize>,
}

/// GET /{id}/open-threads
#[instrument(skip(state))]
async fn dweller_open_threads(
    State(state): State<AppState>,
    Path(dweller_id): Path<Uuid>,
    Query(params): Query<OpenThreadsParams>,
) -> Result<Json<Vec<OpenThread>>, ApiError> {
    let filter = ArcFilter {
        world_id: params.world_id,
        dweller_id: Some(dweller_id),
        limit: CANDIDATE_ARCS,
        offset: 0,
    };

    let mut candidates = Vec::new();
    for arc in state.arcs.list(&filter).await? {
        let stories = state.stories.get_many(&arc.story_ids).await?;
        let Some(last) = stories.last() else {
            continue;
        };
        let summary = state.summaries.get(arc.id).await?.map(|r| r.summary);
        candidates.push(ArcContext {
            story_times: stories.iter().map(|s| s.created_at).collect(),
            last_story_content: last.content.clone(),
            summary,
            arc,
        });
    }

    let mut config = state.context_config;
    if let Some(limit) = params.limit {
        config.max_threads = limit.min(MAX_THREADS);
    }

    Ok(Json(open_threads(
        &state.signal_config,
        &config,
        candidates,
        state.clock.now(),
    )))
}

/// Returns the router for dweller endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/open-threads", get(dweller_open_threads))
}
