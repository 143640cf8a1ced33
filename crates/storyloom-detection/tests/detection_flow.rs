//! End-to-end detection tests over the in-memory stores.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use storyloom_core::clock::Clock;
use storyloom_core::embedding::EmbeddingProvider;
use storyloom_core::error::DomainError;
use storyloom_core::repository::StoryRepository;
use storyloom_core::story::{Story, StoryEmbedding};
use storyloom_detection::{ArcDetector, DetectionConfig, DetectionOutcome};
use storyloom_test_support::{
    FailingEmbeddingProvider, FixedClock, InMemoryArcRepository, InMemoryStoryRepository,
    StaticEmbeddingProvider, unit_vec,
};
use uuid::Uuid;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + Duration::days(n)
}

fn story_at(world_id: Uuid, dweller_id: Uuid, n: i64, title: &str, angle: Option<f32>) -> Story {
    let id = Uuid::new_v4();
    Story {
        id,
        world_id,
        dweller_id,
        title: title.to_owned(),
        content: format!("the tale of {title}"),
        embedding: angle.map(|a| StoryEmbedding {
            story_id: id,
            vector: unit_vec(a),
            created_at: day(n),
        }),
        created_at: day(n),
    }
}

struct Harness {
    stories: Arc<InMemoryStoryRepository>,
    arcs: Arc<InMemoryArcRepository>,
    detector: ArcDetector,
}

fn harness(embedder: Arc<dyn EmbeddingProvider>) -> Harness {
    let stories = Arc::new(InMemoryStoryRepository::new());
    let arcs = Arc::new(InMemoryArcRepository::new());
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(day(30)));
    let detector = ArcDetector::new(
        stories.clone(),
        arcs.clone(),
        embedder,
        clock,
        DetectionConfig::default(),
    )
    .unwrap();
    Harness {
        stories,
        arcs,
        detector,
    }
}

#[tokio::test]
async fn test_similar_and_close_stories_share_an_arc_but_the_window_splits() {
    // Arrange: day 0 and day 2 are similar (cos 35° ≈ 0.82) and close;
    // day 10 is similar to day 2 (cos 41° ≈ 0.75) but 8 days away.
    let world_id = Uuid::new_v4();
    let dweller_id = Uuid::new_v4();
    let fx = harness(Arc::new(FailingEmbeddingProvider));

    let s0 = story_at(world_id, dweller_id, 0, "day zero", Some(0.0));
    let s2 = story_at(world_id, dweller_id, 2, "day two", Some(35.0));
    let s10 = story_at(world_id, dweller_id, 10, "day ten", Some(76.0));
    for s in [&s0, &s2, &s10] {
        fx.stories.insert(s.clone());
    }

    // Act
    fx.detector.detect_story(s0.id).await.unwrap();
    fx.detector.detect_story(s2.id).await.unwrap();
    let outcome = fx.detector.detect_story(s10.id).await.unwrap();

    // Assert: arc1 = {day0, day2}, arc2 = {day10}.
    assert!(matches!(outcome, DetectionOutcome::Created { .. }));
    let mut arcs = fx.arcs.all();
    arcs.sort_by_key(|arc| arc.story_ids.len());
    assert_eq!(arcs.len(), 2);
    assert_eq!(arcs[0].story_ids, vec![s10.id]);
    assert_eq!(arcs[1].story_ids, vec![s0.id, s2.id]);
}

#[tokio::test]
async fn test_detection_is_idempotent_across_repeated_sweeps() {
    // Arrange
    let world_id = Uuid::new_v4();
    let dweller_id = Uuid::new_v4();
    let fx = harness(Arc::new(FailingEmbeddingProvider));

    for (n, angle) in [(0, 0.0), (1, 10.0), (4, 20.0)] {
        fx.stories.insert(story_at(
            world_id,
            dweller_id,
            n,
            &format!("story {n}"),
            Some(angle),
        ));
    }

    // Act
    let first = fx.detector.sweep(Some(world_id), None).await.unwrap();
    let after_first: Vec<_> = {
        let mut arcs = fx.arcs.all();
        arcs.sort_by_key(|arc| arc.id);
        arcs.iter().map(|a| (a.id, a.story_ids.clone())).collect()
    };
    let second = fx.detector.sweep(Some(world_id), None).await.unwrap();
    let after_second: Vec<_> = {
        let mut arcs = fx.arcs.all();
        arcs.sort_by_key(|arc| arc.id);
        arcs.iter().map(|a| (a.id, a.story_ids.clone())).collect()
    };

    // Assert: identical partition, no duplicate arcs or story ids.
    assert_eq!(first.processed, 3);
    assert_eq!(first.failures.len(), 0);
    assert_eq!(second.arcs_created, 0);
    assert_eq!(second.arcs_merged, 0);
    assert_eq!(after_first, after_second);
    assert_eq!(after_first.len(), 1);
}

#[tokio::test]
async fn test_bridging_story_merges_two_arcs_end_to_end() {
    // Arrange: {s1,s2} cluster at 0°/10°, {s3,s4} at 90°/95°. s5 sits at
    // 50°, within 0.70 of both s2 (cos 40° ≈ 0.77) and s3 (cos 40°).
    let world_id = Uuid::new_v4();
    let dweller_id = Uuid::new_v4();
    let fx = harness(Arc::new(FailingEmbeddingProvider));

    let s1 = story_at(world_id, dweller_id, 0, "s1", Some(0.0));
    let s2 = story_at(world_id, dweller_id, 1, "s2", Some(10.0));
    let s3 = story_at(world_id, dweller_id, 3, "s3", Some(90.0));
    let s4 = story_at(world_id, dweller_id, 4, "s4", Some(95.0));
    let s5 = story_at(world_id, dweller_id, 2, "s5", Some(50.0));
    for s in [&s1, &s2, &s3, &s4, &s5] {
        fx.stories.insert(s.clone());
    }

    for s in [&s1, &s2, &s3, &s4] {
        fx.detector.detect_story(s.id).await.unwrap();
    }
    assert_eq!(fx.arcs.all().len(), 2);

    // Act
    let outcome = fx.detector.detect_story(s5.id).await.unwrap();

    // Assert: one arc, chronological order, not three separate arcs.
    let DetectionOutcome::Merged {
        surviving_arc_id,
        absorbed_arc_ids,
    } = outcome
    else {
        panic!("expected a bridging merge, got {outcome:?}");
    };
    assert_eq!(absorbed_arc_ids.len(), 1);

    let arcs = fx.arcs.all();
    assert_eq!(arcs.len(), 1);
    assert_eq!(arcs[0].id, surviving_arc_id);
    assert_eq!(
        arcs[0].story_ids,
        vec![s1.id, s2.id, s5.id, s3.id, s4.id]
    );
}

#[tokio::test]
async fn test_sweep_records_embedding_failures_and_continues() {
    // Arrange: two embedded stories plus one that cannot be embedded.
    let world_id = Uuid::new_v4();
    let dweller_id = Uuid::new_v4();
    let fx = harness(Arc::new(FailingEmbeddingProvider));

    fx.stories
        .insert(story_at(world_id, dweller_id, 0, "ok one", Some(0.0)));
    fx.stories
        .insert(story_at(world_id, dweller_id, 1, "ok two", Some(5.0)));
    let broken = story_at(world_id, dweller_id, 2, "broken", None);
    fx.stories.insert(broken.clone());

    // Act
    let report = fx.detector.sweep(Some(world_id), None).await.unwrap();

    // Assert
    assert_eq!(report.processed, 3);
    assert_eq!(report.clustered, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].story_id, broken.id);
}

#[tokio::test]
async fn test_unembedded_story_is_embedded_then_clustered() {
    // Arrange
    let world_id = Uuid::new_v4();
    let dweller_id = Uuid::new_v4();
    let provider = Arc::new(StaticEmbeddingProvider::new(2));
    let fx = harness(provider.clone());

    let seeded = story_at(world_id, dweller_id, 0, "seeded", Some(0.0));
    let pending = story_at(world_id, dweller_id, 1, "pending", None);
    provider.register(&pending.content, unit_vec(10.0));
    fx.stories.insert(seeded.clone());
    fx.stories.insert(pending.clone());
    fx.detector.detect_story(seeded.id).await.unwrap();

    // Act
    let outcome = fx.detector.detect_story(pending.id).await.unwrap();

    // Assert: vector was persisted and the story joined the arc.
    assert!(matches!(outcome, DetectionOutcome::Appended { .. }));
    let stored = fx
        .stories
        .get(pending.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.embedding.is_some());
    let arcs = fx.arcs.all();
    assert_eq!(arcs.len(), 1);
    assert_eq!(arcs[0].story_ids, vec![seeded.id, pending.id]);
}

#[tokio::test]
async fn test_wrong_sized_vector_is_rejected_and_not_persisted() {
    // Arrange: the provider declares 3 dimensions but returns 2.
    let world_id = Uuid::new_v4();
    let dweller_id = Uuid::new_v4();
    let provider = Arc::new(StaticEmbeddingProvider::new(3));
    let fx = harness(provider.clone());

    let pending = story_at(world_id, dweller_id, 0, "pending", None);
    provider.register(&pending.content, unit_vec(10.0));
    fx.stories.insert(pending.clone());

    // Act
    let result = fx.detector.detect_story(pending.id).await;

    // Assert: treated as unavailable; the bad vector is never stored.
    assert!(matches!(
        result,
        Err(DomainError::EmbeddingUnavailable(id)) if id == pending.id
    ));
    let stored = fx.stories.get(pending.id).await.unwrap().unwrap();
    assert!(stored.embedding.is_none());
}

#[tokio::test]
async fn test_detect_story_for_unknown_id_is_not_found() {
    let fx = harness(Arc::new(FailingEmbeddingProvider));
    let result = fx.detector.detect_story(Uuid::new_v4()).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}
