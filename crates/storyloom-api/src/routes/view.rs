//! Shared response shapes for arc endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyloom_core::arc::StoryArc;
use storyloom_core::error::DomainError;
use storyloom_signals::{ArcSignal, compute_signal};
use uuid::Uuid;

use crate::state::AppState;

/// An arc as returned by the API, enriched with its live signal.
#[derive(Debug, Serialize)]
pub struct ArcView {
    /// Arc identifier.
    pub id: Uuid,
    /// Arc display name.
    pub name: String,
    /// World the arc belongs to.
    pub world_id: Uuid,
    /// Dweller whose perspective anchors the arc, if dweller-scoped.
    pub dweller_id: Option<Uuid>,
    /// Member story ids, chronological ascending.
    pub story_ids: Vec<Uuid>,
    /// Number of member stories.
    pub story_count: usize,
    /// When the arc was first detected.
    pub created_at: DateTime<Utc>,
    /// When the arc last changed.
    pub updated_at: DateTime<Utc>,
    /// Live momentum and health, computed at request time.
    pub signal: Option<ArcSignal>,
}

/// Builds the API view of an arc, computing its signal from the member
/// stories' creation times.
pub(crate) async fn arc_view(state: &AppState, arc: StoryArc) -> Result<ArcView, DomainError> {
    let stories = state.stories.get_many(&arc.story_ids).await?;
    let story_times: Vec<DateTime<Utc>> = stories.iter().map(|s| s.created_at).collect();
    let signal = compute_signal(&state.signal_config, &story_times, state.clock.now());

    Ok(ArcView {
        id: arc.id,
        name: arc.name,
        world_id: arc.world_id,
        dweller_id: arc.dweller_id,
        story_count: arc.story_ids.len(),
        story_ids: arc.story_ids,
        created_at: arc.created_at,
        updated_at: arc.updated_at,
        signal,
    })
}
