//! Arc model: a detected, chronologically-ordered run of related stories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The isolation unit for clustering: all detection, merging, and locking
/// happens within a single (world, dweller) scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// World the scope belongs to.
    pub world_id: Uuid,
    /// Dweller the scope belongs to, if dweller-scoped.
    pub dweller_id: Option<Uuid>,
}

/// A narrative arc: an ordered sequence of related stories from one
/// dweller's perspective.
///
/// Invariants:
/// - `story_ids` is ordered by story creation time ascending and contains
///   no duplicates.
/// - An arc always holds at least one story.
/// - Within a scope, arcs partition stories: a story belongs to at most
///   one arc at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryArc {
    /// Arc identifier.
    pub id: Uuid,
    /// Display name; starts as a deterministic fallback until the
    /// summarizer produces one.
    pub name: String,
    /// World the arc belongs to.
    pub world_id: Uuid,
    /// Dweller whose perspective anchors the arc, if dweller-scoped.
    pub dweller_id: Option<Uuid>,
    /// Member story ids, chronological ascending.
    pub story_ids: Vec<Uuid>,
    /// When the arc was first detected.
    pub created_at: DateTime<Utc>,
    /// When the arc last changed (append or merge).
    pub updated_at: DateTime<Utc>,
}

impl StoryArc {
    /// The clustering scope this arc lives in.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope {
            world_id: self.world_id,
            dweller_id: self.dweller_id,
        }
    }

    /// Whether the arc contains the given story.
    #[must_use]
    pub fn contains(&self, story_id: Uuid) -> bool {
        self.story_ids.contains(&story_id)
    }

    /// The id of the most recently added story.
    #[must_use]
    pub fn last_story_id(&self) -> Option<Uuid> {
        self.story_ids.last().copied()
    }

    /// Previous and next story ids around `story_id` within the arc, or
    /// `None` if the story is not a member.
    #[must_use]
    pub fn neighbors(&self, story_id: Uuid) -> Option<(Option<Uuid>, Option<Uuid>)> {
        let idx = self.story_ids.iter().position(|&id| id == story_id)?;
        let prev = idx.checked_sub(1).map(|i| self.story_ids[i]);
        let next = self.story_ids.get(idx + 1).copied();
        Some((prev, next))
    }
}

/// Deterministic arc name derived from a story title, used when no
/// generated summary exists yet (or generation failed).
#[must_use]
pub fn fallback_arc_name(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return "Untitled thread".to_owned();
    }
    let mut name: String = trimmed.chars().take(80).collect();
    if trimmed.chars().count() > 80 {
        name.push('…');
    }
    name
}
