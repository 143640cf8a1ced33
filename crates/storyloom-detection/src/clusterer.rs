//! Incremental arc clustering.
//!
//! A pure planning step: given a snapshot of one scope's persisted arcs,
//! the story under detection, and its qualifying edges, compute exactly
//! which arc rows to upsert and remove. The union-find structure is
//! rebuilt from the snapshot on every call; nothing here holds state
//! between detections, which makes re-running detection a convergent
//! fixed-point operation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use storyloom_core::arc::{Scope, StoryArc, fallback_arc_name};
use storyloom_core::story::Story;
use uuid::Uuid;

use crate::similarity::SimilarityEdge;
use crate::union_find::UnionFind;

/// The slice of story data clustering needs: creation time for
/// chronological ordering, title for fallback naming.
#[derive(Debug, Clone)]
pub struct StoryMeta {
    /// Story creation time.
    pub created_at: DateTime<Utc>,
    /// Story title.
    pub title: String,
}

/// Everything known about one scope at the start of a detection call.
#[derive(Debug, Clone)]
pub struct ScopeSnapshot {
    /// The (world, dweller) scope under detection.
    pub scope: Scope,
    /// All persisted arcs in the scope.
    pub arcs: Vec<StoryArc>,
    /// Metadata for every story referenced by `arcs` or by an edge.
    pub stories: HashMap<Uuid, StoryMeta>,
}

/// What one detection call decided for the story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// The story was already in the right arc; nothing changed.
    Unchanged {
        /// The arc the story already belongs to.
        arc_id: Uuid,
    },
    /// No qualifying edges: the story starts a new arc.
    Created {
        /// The freshly created arc.
        arc_id: Uuid,
    },
    /// The story joined exactly one existing arc.
    Appended {
        /// The arc that absorbed the story.
        arc_id: Uuid,
    },
    /// The story bridged two or more previously separate arcs.
    Merged {
        /// The earlier arc, which keeps its identity.
        surviving_arc_id: Uuid,
        /// Arcs absorbed into the survivor and removed.
        absorbed_arc_ids: Vec<Uuid>,
    },
}

impl DetectionOutcome {
    /// The arc the story ended up in.
    #[must_use]
    pub fn arc_id(&self) -> Uuid {
        match self {
            Self::Unchanged { arc_id }
            | Self::Created { arc_id }
            | Self::Appended { arc_id } => *arc_id,
            Self::Merged {
                surviving_arc_id, ..
            } => *surviving_arc_id,
        }
    }
}

/// The writes one detection call must apply, atomically.
#[derive(Debug, Clone)]
pub struct DetectionPlan {
    /// Arc rows to insert or update.
    pub upserts: Vec<StoryArc>,
    /// Arc rows absorbed by a merge, to be removed.
    pub removals: Vec<Uuid>,
    /// What happened.
    pub outcome: DetectionOutcome,
}

/// Plans the arc assignment for `story` given its qualifying `edges`.
///
/// Rebuilds a union-find forest over every story in the snapshot, unions
/// the members of each persisted arc, then unions the new story with each
/// edge target. The connected component containing the new story decides
/// the outcome:
///
/// - component touches no persisted arc → a new arc is created (possibly
///   absorbing other still-unclustered window stories);
/// - component touches exactly one arc → append (or no-op when the arc
///   already holds exactly these stories);
/// - component touches two or more arcs → bridging merge: the
///   earliest-created arc keeps its id and name, member lists are
///   concatenated and re-sorted chronologically, the rest are removed.
#[must_use]
pub fn plan(
    snapshot: &ScopeSnapshot,
    story: &Story,
    edges: &[SimilarityEdge],
    now: DateTime<Utc>,
) -> DetectionPlan {
    let mut ids: Vec<Uuid> = Vec::with_capacity(snapshot.stories.len() + 1);
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let intern = |id: Uuid, ids: &mut Vec<Uuid>, index: &mut HashMap<Uuid, usize>| -> usize {
        *index.entry(id).or_insert_with(|| {
            ids.push(id);
            ids.len() - 1
        })
    };

    let story_idx = intern(story.id, &mut ids, &mut index);
    for arc in &snapshot.arcs {
        for &member in &arc.story_ids {
            intern(member, &mut ids, &mut index);
        }
    }
    for edge in edges {
        intern(edge.story_id, &mut ids, &mut index);
    }

    let mut forest = UnionFind::new(ids.len());
    for arc in &snapshot.arcs {
        for pair in arc.story_ids.windows(2) {
            forest.union(index[&pair[0]], index[&pair[1]]);
        }
    }
    for edge in edges {
        forest.union(story_idx, index[&edge.story_id]);
    }

    let roots: Vec<usize> = (0..ids.len()).map(|i| forest.find(i)).collect();
    let root = roots[story_idx];
    let mut component: Vec<Uuid> = (0..ids.len())
        .filter(|&i| roots[i] == root)
        .map(|i| ids[i])
        .collect();

    let time_of = |id: Uuid| {
        if id == story.id {
            story.created_at
        } else {
            snapshot
                .stories
                .get(&id)
                .map_or(story.created_at, |meta| meta.created_at)
        }
    };
    component.sort_by_key(|&id| (time_of(id), id));

    let mut touched: Vec<&StoryArc> = snapshot
        .arcs
        .iter()
        .filter(|arc| {
            arc.story_ids
                .first()
                .is_some_and(|&first| roots[index[&first]] == root)
        })
        .collect();
    touched.sort_by_key(|arc| (arc.created_at, arc.id));

    match touched.as_slice() {
        [] => {
            let first_title = component
                .first()
                .map(|&id| {
                    if id == story.id {
                        story.title.clone()
                    } else {
                        snapshot
                            .stories
                            .get(&id)
                            .map_or_else(|| story.title.clone(), |meta| meta.title.clone())
                    }
                })
                .unwrap_or_default();
            let arc = StoryArc {
                id: Uuid::new_v4(),
                name: fallback_arc_name(&first_title),
                world_id: snapshot.scope.world_id,
                dweller_id: snapshot.scope.dweller_id,
                story_ids: component,
                created_at: now,
                updated_at: now,
            };
            let arc_id = arc.id;
            DetectionPlan {
                upserts: vec![arc],
                removals: Vec::new(),
                outcome: DetectionOutcome::Created { arc_id },
            }
        }
        [arc] => {
            if arc.story_ids == component {
                DetectionPlan {
                    upserts: Vec::new(),
                    removals: Vec::new(),
                    outcome: DetectionOutcome::Unchanged { arc_id: arc.id },
                }
            } else {
                let mut updated = (*arc).clone();
                updated.story_ids = component;
                updated.updated_at = now;
                let arc_id = updated.id;
                DetectionPlan {
                    upserts: vec![updated],
                    removals: Vec::new(),
                    outcome: DetectionOutcome::Appended { arc_id },
                }
            }
        }
        [survivor, absorbed @ ..] => {
            let mut updated = (*survivor).clone();
            updated.story_ids = component;
            updated.updated_at = now;
            let surviving_arc_id = updated.id;
            let absorbed_arc_ids: Vec<Uuid> = absorbed.iter().map(|arc| arc.id).collect();
            DetectionPlan {
                upserts: vec![updated],
                removals: absorbed_arc_ids.clone(),
                outcome: DetectionOutcome::Merged {
                    surviving_arc_id,
                    absorbed_arc_ids,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use storyloom_core::story::StoryEmbedding;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn story(dweller_id: Uuid, world_id: Uuid, n: i64, title: &str) -> Story {
        let id = Uuid::new_v4();
        Story {
            id,
            world_id,
            dweller_id,
            title: title.to_owned(),
            content: String::new(),
            embedding: Some(StoryEmbedding {
                story_id: id,
                vector: vec![1.0, 0.0],
                created_at: day(n),
            }),
            created_at: day(n),
        }
    }

    fn edge(story_id: Uuid) -> SimilarityEdge {
        SimilarityEdge {
            story_id,
            similarity: 0.9,
        }
    }

    struct Fixture {
        scope: Scope,
        world_id: Uuid,
        dweller_id: Uuid,
        arcs: Vec<StoryArc>,
        stories: HashMap<Uuid, StoryMeta>,
    }

    impl Fixture {
        fn new() -> Self {
            let world_id = Uuid::new_v4();
            let dweller_id = Uuid::new_v4();
            Self {
                scope: Scope {
                    world_id,
                    dweller_id: Some(dweller_id),
                },
                world_id,
                dweller_id,
                arcs: Vec::new(),
                stories: HashMap::new(),
            }
        }

        fn add_story(&mut self, n: i64, title: &str) -> Story {
            let story = story(self.dweller_id, self.world_id, n, title);
            self.stories.insert(
                story.id,
                StoryMeta {
                    created_at: story.created_at,
                    title: story.title.clone(),
                },
            );
            story
        }

        fn add_arc(&mut self, created_day: i64, members: &[&Story]) -> Uuid {
            let arc = StoryArc {
                id: Uuid::new_v4(),
                name: "arc".to_owned(),
                world_id: self.world_id,
                dweller_id: Some(self.dweller_id),
                story_ids: members.iter().map(|s| s.id).collect(),
                created_at: day(created_day),
                updated_at: day(created_day),
            };
            let id = arc.id;
            self.arcs.push(arc);
            id
        }

        fn snapshot(&self) -> ScopeSnapshot {
            ScopeSnapshot {
                scope: self.scope,
                arcs: self.arcs.clone(),
                stories: self.stories.clone(),
            }
        }
    }

    #[test]
    fn test_story_with_no_edges_starts_a_singleton_arc() {
        // Arrange
        let mut fx = Fixture::new();
        let story = fx.add_story(0, "A Door Opens");

        // Act
        let plan = plan(&fx.snapshot(), &story, &[], day(0));

        // Assert
        assert!(matches!(plan.outcome, DetectionOutcome::Created { .. }));
        assert!(plan.removals.is_empty());
        assert_eq!(plan.upserts.len(), 1);
        assert_eq!(plan.upserts[0].story_ids, vec![story.id]);
        assert_eq!(plan.upserts[0].name, "A Door Opens");
    }

    #[test]
    fn test_story_with_one_edge_appends_to_the_existing_arc() {
        // Arrange
        let mut fx = Fixture::new();
        let s1 = fx.add_story(0, "first");
        let s2 = fx.add_story(1, "second");
        let arc_id = fx.add_arc(1, &[&s1, &s2]);
        let s3 = fx.add_story(2, "third");

        // Act
        let plan = plan(&fx.snapshot(), &s3, &[edge(s2.id)], day(2));

        // Assert
        assert_eq!(plan.outcome, DetectionOutcome::Appended { arc_id });
        assert_eq!(plan.upserts[0].story_ids, vec![s1.id, s2.id, s3.id]);
        assert_eq!(plan.upserts[0].updated_at, day(2));
    }

    #[test]
    fn test_rerun_over_clustered_story_is_unchanged() {
        // Arrange
        let mut fx = Fixture::new();
        let s1 = fx.add_story(0, "first");
        let s2 = fx.add_story(1, "second");
        let arc_id = fx.add_arc(1, &[&s1, &s2]);

        // Act: re-detect s2, which is already a member.
        let plan = plan(&fx.snapshot(), &s2, &[edge(s1.id)], day(5));

        // Assert
        assert_eq!(plan.outcome, DetectionOutcome::Unchanged { arc_id });
        assert!(plan.upserts.is_empty());
        assert!(plan.removals.is_empty());
    }

    #[test]
    fn test_bridging_story_merges_two_arcs_into_the_earlier_one() {
        // Arrange: arc A={s1,s2}, arc B={s3,s4}, new s5 qualifies against
        // both s2 and s3.
        let mut fx = Fixture::new();
        let s1 = fx.add_story(0, "s1");
        let s2 = fx.add_story(1, "s2");
        let s3 = fx.add_story(3, "s3");
        let s4 = fx.add_story(4, "s4");
        let arc_a = fx.add_arc(1, &[&s1, &s2]);
        let arc_b = fx.add_arc(4, &[&s3, &s4]);
        let s5 = fx.add_story(2, "s5");

        // Act
        let plan = plan(&fx.snapshot(), &s5, &[edge(s2.id), edge(s3.id)], day(5));

        // Assert: one arc, chronological, earlier arc survives.
        assert_eq!(
            plan.outcome,
            DetectionOutcome::Merged {
                surviving_arc_id: arc_a,
                absorbed_arc_ids: vec![arc_b],
            }
        );
        assert_eq!(plan.removals, vec![arc_b]);
        assert_eq!(plan.upserts.len(), 1);
        assert_eq!(plan.upserts[0].id, arc_a);
        assert_eq!(
            plan.upserts[0].story_ids,
            vec![s1.id, s2.id, s5.id, s3.id, s4.id]
        );
    }

    #[test]
    fn test_edges_to_unclustered_stories_create_one_arc_for_all() {
        // Arrange: the window holds a story that never got clustered.
        let mut fx = Fixture::new();
        let loose = fx.add_story(0, "loose end");
        let story = fx.add_story(1, "follow-up");

        // Act
        let plan = plan(&fx.snapshot(), &story, &[edge(loose.id)], day(1));

        // Assert
        assert!(matches!(plan.outcome, DetectionOutcome::Created { .. }));
        assert_eq!(plan.upserts[0].story_ids, vec![loose.id, story.id]);
        // Named after the chronologically-first member.
        assert_eq!(plan.upserts[0].name, "loose end");
    }

    #[test]
    fn test_merge_never_reorders_only_sorts_by_creation_time() {
        // Arrange: member lists arrive chronological per arc; the merged
        // list must interleave strictly by story time.
        let mut fx = Fixture::new();
        let s1 = fx.add_story(0, "s1");
        let s3 = fx.add_story(4, "s3");
        let arc_a = fx.add_arc(0, &[&s1]);
        let arc_b = fx.add_arc(4, &[&s3]);
        let s2 = fx.add_story(2, "s2");

        // Act
        let plan = plan(&fx.snapshot(), &s2, &[edge(s1.id), edge(s3.id)], day(4));

        // Assert
        assert_eq!(plan.upserts[0].id, arc_a);
        assert_eq!(plan.removals, vec![arc_b]);
        assert_eq!(plan.upserts[0].story_ids, vec![s1.id, s2.id, s3.id]);
    }
}
