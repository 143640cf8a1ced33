//! Detection tuning parameters.

use chrono::Duration;
use storyloom_core::error::DomainError;

/// Tunable parameters for similarity-graph construction.
///
/// Both conditions are conjunctive by design: two semantically similar
/// but temporally distant stories (a thematic echo) must not merge, and
/// two temporally close but dissimilar stories must not merge either.
#[derive(Debug, Clone, Copy)]
pub struct DetectionConfig {
    /// Minimum cosine similarity (exclusive) for an edge.
    pub similarity_threshold: f64,
    /// Maximum story age difference (exclusive) for an edge.
    pub window: Duration,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.70,
            window: Duration::days(7),
        }
    }
}

impl DetectionConfig {
    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the threshold is outside
    /// (0, 1) or the window is not positive.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold < 1.0) {
            return Err(DomainError::Validation(format!(
                "similarity threshold must be in (0, 1), got {}",
                self.similarity_threshold
            )));
        }
        if self.window <= Duration::zero() {
            return Err(DomainError::Validation(
                "detection window must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
