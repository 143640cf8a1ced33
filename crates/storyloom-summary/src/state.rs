//! Summary lifecycle.

use storyloom_core::summary::ArcSummaryRecord;

/// Lifecycle state of an arc's summary.
///
/// `NEW → SUMMARIZED` on successful generation, `SUMMARIZED → STALE`
/// whenever the arc's story set changes (append or merge), and back to
/// `SUMMARIZED` on re-generation. Derived from the cached record rather
/// than persisted as its own column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryState {
    /// No summary has ever been generated.
    New,
    /// The cached summary covers the arc's current story set.
    Summarized,
    /// The story set changed since the summary was generated.
    Stale,
}

/// Derives the state from the cached record and the arc's current
/// story-set fingerprint.
#[must_use]
pub fn summary_state(record: Option<&ArcSummaryRecord>, fingerprint: &str) -> SummaryState {
    match record {
        None => SummaryState::New,
        Some(record) if record.fingerprint == fingerprint => SummaryState::Summarized,
        Some(_) => SummaryState::Stale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(fingerprint: &str) -> ArcSummaryRecord {
        ArcSummaryRecord {
            arc_id: Uuid::new_v4(),
            name: "The Siege".to_owned(),
            summary: "A long winter.".to_owned(),
            fingerprint: fingerprint.to_owned(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_state_machine_transitions() {
        assert_eq!(summary_state(None, "abc"), SummaryState::New);
        assert_eq!(
            summary_state(Some(&record("abc")), "abc"),
            SummaryState::Summarized
        );
        assert_eq!(
            summary_state(Some(&record("abc")), "def"),
            SummaryState::Stale
        );
    }
}
