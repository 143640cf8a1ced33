//! Open-thread selection for agent context assembly.
//!
//! Given the arcs a dweller is involved in, pick the bounded, ranked set
//! of "open threads": active arcs whose latest story still carries an
//! unresolved narrative obligation. The output is plain structured data
//! for the external agent-context assembler; the cap keeps downstream
//! agent context from flooding.

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyloom_core::arc::StoryArc;
use uuid::Uuid;

use crate::engine::{ArcSignal, Momentum, SignalConfig, compute_signal};

/// Everything the ranker needs to know about one candidate arc.
#[derive(Debug, Clone)]
pub struct ArcContext {
    /// The candidate arc.
    pub arc: StoryArc,
    /// Creation times of the arc's member stories.
    pub story_times: Vec<DateTime<Utc>>,
    /// Full text of the arc's latest story.
    pub last_story_content: String,
    /// Cached summary prose, when one has been generated.
    pub summary: Option<String>,
}

/// Tunables for open-thread selection.
#[derive(Debug, Clone, Copy)]
pub struct ContextConfig {
    /// Maximum threads returned.
    pub max_threads: usize,
    /// Maximum excerpt length in characters.
    pub excerpt_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_threads: 5,
            excerpt_chars: 240,
        }
    }
}

/// One ranked open thread.
#[derive(Debug, Clone, Serialize)]
pub struct OpenThread {
    /// The arc.
    pub arc_id: Uuid,
    /// Arc display name.
    pub name: String,
    /// Short summary prose, when available.
    pub summary: Option<String>,
    /// Excerpt of the arc's latest story.
    pub last_story_excerpt: String,
    /// Live signal used for the ranking.
    pub signal: ArcSignal,
}

/// Whether a story's closing text reads as an unanswered beat.
///
/// Heuristic on the final characters: a trailing question, an ellipsis,
/// or an explicit continuation cue.
#[must_use]
pub fn ends_on_open_beat(content: &str) -> bool {
    let trimmed = content.trim_end();
    let lowered = trimmed.to_lowercase();
    trimmed.ends_with('?')
        || trimmed.ends_with('…')
        || trimmed.ends_with("...")
        || lowered.ends_with("to be continued")
}

/// Character-bounded excerpt with an ellipsis marker when truncated.
#[must_use]
pub fn excerpt(content: &str, max_chars: usize) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_owned();
    }
    let mut cut: String = trimmed.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

/// Selects and ranks open threads from the candidate arcs.
///
/// Keeps arcs with momentum in {Rising, Steady} whose latest story ends
/// on an open beat; ranks by health descending, then recency; returns at
/// most `config.max_threads`.
#[must_use]
pub fn open_threads(
    signal_config: &SignalConfig,
    config: &ContextConfig,
    candidates: Vec<ArcContext>,
    now: DateTime<Utc>,
) -> Vec<OpenThread> {
    let mut threads: Vec<OpenThread> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let signal = compute_signal(signal_config, &candidate.story_times, now)?;
            if !matches!(signal.momentum, Momentum::Rising | Momentum::Steady) {
                return None;
            }
            if !ends_on_open_beat(&candidate.last_story_content) {
                return None;
            }
            Some(OpenThread {
                arc_id: candidate.arc.id,
                name: candidate.arc.name,
                summary: candidate.summary,
                last_story_excerpt: excerpt(&candidate.last_story_content, config.excerpt_chars),
                signal,
            })
        })
        .collect();

    threads.sort_by(|a, b| {
        b.signal
            .health
            .total_cmp(&a.signal.health)
            .then(a.signal.days_since_last.total_cmp(&b.signal.days_since_last))
    });
    threads.truncate(config.max_threads);
    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn candidate(name: &str, story_days: &[i64], closing: &str) -> ArcContext {
        let story_times: Vec<DateTime<Utc>> = story_days.iter().map(|&n| day(n)).collect();
        let story_ids: Vec<Uuid> = story_days.iter().map(|_| Uuid::new_v4()).collect();
        ArcContext {
            arc: StoryArc {
                id: Uuid::new_v4(),
                name: name.to_owned(),
                world_id: Uuid::new_v4(),
                dweller_id: Some(Uuid::new_v4()),
                story_ids,
                created_at: day(story_days[0]),
                updated_at: day(*story_days.last().unwrap()),
            },
            story_times,
            last_story_content: closing.to_owned(),
            summary: None,
        }
    }

    fn select(candidates: Vec<ArcContext>, now_day: i64) -> Vec<OpenThread> {
        open_threads(
            &SignalConfig::default(),
            &ContextConfig::default(),
            candidates,
            day(now_day),
        )
    }

    #[test]
    fn test_dormant_and_stalling_arcs_are_excluded() {
        let threads = select(
            vec![
                candidate("dormant", &[0], "What happens next?"),
                candidate("stalling", &[0], "What happens next?"),
                candidate("steady", &[20], "What happens next?"),
            ],
            25,
        );
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].name, "steady");
    }

    #[test]
    fn test_resolved_endings_are_excluded() {
        let threads = select(
            vec![
                candidate("resolved", &[9, 10], "And so the siege ended."),
                candidate("open", &[9, 10], "But who had taken the key?"),
            ],
            11,
        );
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].name, "open");
    }

    #[test]
    fn test_ranked_by_health_then_recency_and_capped() {
        let mut candidates: Vec<ArcContext> = (0..8)
            .map(|i| {
                candidate(
                    &format!("arc {i}"),
                    &[i, i + 1, i + 2],
                    "The door stood open…",
                )
            })
            .collect();
        // Most recent activity last in the list; ranking must reorder.
        candidates.reverse();

        let threads = select(candidates, 10);
        assert_eq!(threads.len(), 5);
        // Highest health (most recent last story) first.
        assert_eq!(threads[0].name, "arc 7");
        for pair in threads.windows(2) {
            assert!(pair[0].signal.health >= pair[1].signal.health);
        }
    }

    #[test]
    fn test_open_beat_heuristic() {
        assert!(ends_on_open_beat("Where is she?  "));
        assert!(ends_on_open_beat("The light faded…"));
        assert!(ends_on_open_beat("He waited..."));
        assert!(ends_on_open_beat("TO BE CONTINUED"));
        assert!(!ends_on_open_beat("They lived happily."));
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let text = "a".repeat(300);
        let cut = excerpt(&text, 240);
        assert_eq!(cut.chars().count(), 241);
        assert!(cut.ends_with('…'));
        assert_eq!(excerpt("short", 240), "short");
    }
}
