//! Shared application state.

use std::sync::Arc;

use storyloom_core::clock::Clock;
use storyloom_core::embedding::EmbeddingProvider;
use storyloom_core::error::DomainError;
use storyloom_core::repository::{ArcRepository, StoryRepository};
use storyloom_core::summary::SummaryRepository;
use storyloom_detection::{ArcDetector, DetectionConfig};
use storyloom_signals::{ContextConfig, SignalConfig};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Story reads.
    pub stories: Arc<dyn StoryRepository>,
    /// Arc reads.
    pub arcs: Arc<dyn ArcRepository>,
    /// Cached summary reads.
    pub summaries: Arc<dyn SummaryRepository>,
    /// Clock used for live signal computation.
    pub clock: Arc<dyn Clock>,
    /// Detection entry point for the privileged sweep.
    pub detector: ArcDetector,
    /// Signal tunables.
    pub signal_config: SignalConfig,
    /// Open-thread tunables.
    pub context_config: ContextConfig,
}

impl AppState {
    /// Builds application state, validating the configurations.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when a configuration is
    /// invalid.
    pub fn new(
        stories: Arc<dyn StoryRepository>,
        arcs: Arc<dyn ArcRepository>,
        summaries: Arc<dyn SummaryRepository>,
        embedder: Arc<dyn EmbeddingProvider>,
        clock: Arc<dyn Clock>,
        detection_config: DetectionConfig,
    ) -> Result<Self, DomainError> {
        let signal_config = SignalConfig::default();
        signal_config.validate()?;
        let detector = ArcDetector::new(
            Arc::clone(&stories),
            Arc::clone(&arcs),
            embedder,
            Arc::clone(&clock),
            detection_config,
        )?;
        Ok(Self {
            stories,
            arcs,
            summaries,
            clock,
            detector,
            signal_config,
            context_config: ContextConfig::default(),
        })
    }
}
