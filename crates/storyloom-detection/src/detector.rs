//! Detection orchestration.
//!
//! `ArcDetector` wires the window query, the similarity graph, and the
//! clusterer together, serializing mutations per (world, dweller) scope
//! and committing each plan atomically. The batch sweep partitions work
//! by scope so parallel workers never contend on the same scope, and
//! converts per-story failures into report entries rather than aborting.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use serde::Serialize;
use storyloom_core::arc::Scope;
use storyloom_core::clock::Clock;
use storyloom_core::embedding::EmbeddingProvider;
use storyloom_core::error::DomainError;
use storyloom_core::repository::{ArcRepository, StoryRepository};
use storyloom_core::story::{Story, StoryEmbedding};

use crate::clusterer::{self, DetectionOutcome, ScopeSnapshot, StoryMeta};
use crate::config::DetectionConfig;
use crate::similarity::SimilarityGraphBuilder;

/// Keyed async locks, one per clustering scope.
///
/// Two racing detections in the same scope could otherwise each read the
/// pre-union arc rows and produce two arcs that should have merged.
#[derive(Clone, Default)]
pub struct ScopeLocks {
    inner: Arc<Mutex<HashMap<Scope, Arc<Mutex<()>>>>>,
}

impl ScopeLocks {
    /// Acquires the lock for one scope, creating it on first use.
    pub async fn acquire(&self, scope: Scope) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(scope).or_default())
        };
        lock.lock_owned().await
    }
}

/// One story that could not be processed during a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    /// The story that failed.
    pub story_id: Uuid,
    /// Human-readable reason.
    pub error: String,
}

/// Per-story success/failure summary of a detection sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Stories examined.
    pub processed: usize,
    /// Stories that ended the sweep inside an arc.
    pub clustered: usize,
    /// New arcs created.
    pub arcs_created: usize,
    /// Bridging merges performed.
    pub arcs_merged: usize,
    /// Stories that failed, with reasons. Failures never abort the sweep.
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    fn absorb(&mut self, other: Self) {
        self.processed += other.processed;
        self.clustered += other.clustered;
        self.arcs_created += other.arcs_created;
        self.arcs_merged += other.arcs_merged;
        self.failures.extend(other.failures);
    }
}

/// Detects arc membership for new stories and for historical backfills.
#[derive(Clone)]
pub struct ArcDetector {
    stories: Arc<dyn StoryRepository>,
    arcs: Arc<dyn ArcRepository>,
    embedder: Arc<dyn EmbeddingProvider>,
    clock: Arc<dyn Clock>,
    config: DetectionConfig,
    locks: ScopeLocks,
}

impl ArcDetector {
    /// Creates a detector over the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the configuration is
    /// invalid.
    pub fn new(
        stories: Arc<dyn StoryRepository>,
        arcs: Arc<dyn ArcRepository>,
        embedder: Arc<dyn EmbeddingProvider>,
        clock: Arc<dyn Clock>,
        config: DetectionConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self {
            stories,
            arcs,
            embedder,
            clock,
            config,
            locks: ScopeLocks::default(),
        })
    }

    /// The validated configuration this detector runs with.
    #[must_use]
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Runs detection for a single story: embed if needed, build edges
    /// against the same-dweller window, assign or merge, persist.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] for an unknown story,
    /// [`DomainError::EmbeddingUnavailable`] when no vector could be
    /// obtained, or a persistence error from the store.
    #[instrument(skip(self))]
    pub async fn detect_story(&self, story_id: Uuid) -> Result<DetectionOutcome, DomainError> {
        let story = self
            .stories
            .get(story_id)
            .await?
            .ok_or(DomainError::NotFound(story_id))?;
        let story = self.ensure_embedded(story).await?;

        let scope = Scope {
            world_id: story.world_id,
            dweller_id: Some(story.dweller_id),
        };
        let _guard = self.locks.acquire(scope).await;

        let candidates = self
            .stories
            .window(
                story.world_id,
                story.dweller_id,
                story.id,
                story.created_at,
                self.config.window,
            )
            .await?;
        let edges = SimilarityGraphBuilder::new(&self.config).edges(&story, &candidates);

        let arcs = self.arcs.list_scope(&scope).await?;
        let mut referenced: Vec<Uuid> = arcs
            .iter()
            .flat_map(|arc| arc.story_ids.iter().copied())
            .chain(edges.iter().map(|edge| edge.story_id))
            .collect();
        referenced.sort_unstable();
        referenced.dedup();

        let mut metas: HashMap<Uuid, StoryMeta> = self
            .stories
            .get_many(&referenced)
            .await?
            .into_iter()
            .map(|s| {
                (
                    s.id,
                    StoryMeta {
                        created_at: s.created_at,
                        title: s.title,
                    },
                )
            })
            .collect();
        metas.insert(
            story.id,
            StoryMeta {
                created_at: story.created_at,
                title: story.title.clone(),
            },
        );

        let snapshot = ScopeSnapshot {
            scope,
            arcs,
            stories: metas,
        };
        let plan = clusterer::plan(&snapshot, &story, &edges, self.clock.now());

        if !plan.upserts.is_empty() || !plan.removals.is_empty() {
            self.arcs.commit(&plan.upserts, &plan.removals).await?;
        }

        info!(
            story_id = %story.id,
            edges = edges.len(),
            outcome = ?plan.outcome,
            "detection complete"
        );
        Ok(plan.outcome)
    }

    /// Runs a detection sweep over every story matching the filter.
    ///
    /// Work is partitioned by scope; scopes run in parallel, stories
    /// within a scope chronologically. A failed story is recorded in the
    /// report and never aborts the rest of the sweep.
    ///
    /// # Errors
    ///
    /// Returns an error only when the story listing itself fails or a
    /// sweep worker panics; per-story errors land in the report.
    #[instrument(skip(self))]
    pub async fn sweep(
        &self,
        world_id: Option<Uuid>,
        dweller_id: Option<Uuid>,
    ) -> Result<SweepReport, DomainError> {
        let stories = self.stories.list(world_id, dweller_id).await?;

        // `list` returns chronological order; preserve it per scope.
        let mut by_scope: HashMap<Scope, Vec<Uuid>> = HashMap::new();
        for story in &stories {
            let scope = Scope {
                world_id: story.world_id,
                dweller_id: Some(story.dweller_id),
            };
            by_scope.entry(scope).or_default().push(story.id);
        }

        let mut workers = JoinSet::new();
        for story_ids in by_scope.into_values() {
            let detector = self.clone();
            workers.spawn(async move {
                let mut report = SweepReport::default();
                for story_id in story_ids {
                    report.processed += 1;
                    match detector.detect_story(story_id).await {
                        Ok(outcome) => {
                            report.clustered += 1;
                            match outcome {
                                DetectionOutcome::Created { .. } => report.arcs_created += 1,
                                DetectionOutcome::Merged { .. } => report.arcs_merged += 1,
                                DetectionOutcome::Unchanged { .. }
                                | DetectionOutcome::Appended { .. } => {}
                            }
                        }
                        Err(error) => {
                            warn!(%story_id, %error, "story failed during sweep; continuing");
                            report.failures.push(SweepFailure {
                                story_id,
                                error: error.to_string(),
                            });
                        }
                    }
                }
                report
            });
        }

        let mut total = SweepReport::default();
        while let Some(joined) = workers.join_next().await {
            let report = joined
                .map_err(|e| DomainError::Infrastructure(format!("sweep worker failed: {e}")))?;
            total.absorb(report);
        }

        info!(
            processed = total.processed,
            clustered = total.clustered,
            failed = total.failures.len(),
            "sweep complete"
        );
        Ok(total)
    }

    async fn ensure_embedded(&self, mut story: Story) -> Result<Story, DomainError> {
        if story.embedding.is_some() {
            return Ok(story);
        }
        let vector = match self.embedder.embed(&story.content).await {
            Ok(vector) => vector,
            Err(error) => {
                warn!(story_id = %story.id, %error, "embedding provider failed");
                return Err(DomainError::EmbeddingUnavailable(story.id));
            }
        };
        if vector.len() != self.embedder.dimension() {
            warn!(
                story_id = %story.id,
                got = vector.len(),
                want = self.embedder.dimension(),
                "embedding provider returned a wrong-sized vector"
            );
            return Err(DomainError::EmbeddingUnavailable(story.id));
        }
        let embedding = StoryEmbedding {
            story_id: story.id,
            vector,
            created_at: self.clock.now(),
        };
        self.stories.set_embedding(&embedding).await?;
        story.embedding = Some(embedding);
        Ok(story)
    }
}
