//! Routes for story-centric arc lookups.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use serde::Serialize;
use storyloom_core::error::DomainError;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::view::{ArcView, arc_view};
use crate::state::AppState;

/// A story's arc membership, with its chronological neighbors inside
/// the arc.
#[derive(Debug, Serialize)]
pub struct ArcMembership {
    /// The arc the story belongs to.
    pub arc: ArcView,
    /// The story immediately before this one in the arc, if any.
    pub prev_story_id: Option<Uuid>,
    /// The story immediately after this one in the arc, if any.
    pub next_story_id: Option<Uuid>,
}

/// GET /{id}/arc
///
/// Returns `null` for a story that exists but is not clustered yet.
#[instrument(skip(state))]
async fn story_arc(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<Json<Option<ArcMembership>>, ApiError> {
    state
        .stories
        .get(story_id)
        .await?
        .ok_or(DomainError::NotFound(story_id))?;

    let Some(arc) = state.arcs.find_by_story(story_id).await? else {
        return Ok(Json(None));
    };
    let (prev_story_id, next_story_id) = arc.neighbors(story_id).unwrap_or((None, None));
    let arc = arc_view(&state, arc).await?;

    Ok(Json(Some(ArcMembership {
        arc,
        prev_story_id,
        next_story_id,
    })))
}

/// Returns the router for story endpoints.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/arc", get(story_arc))
}
