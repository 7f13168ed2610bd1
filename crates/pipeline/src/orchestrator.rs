//! Render pipeline orchestration
//!
//! Thin sequencing over the pipeline components: synthesize-all → merge →
//! publish, with cleanup of every registered temp artifact on every exit
//! path, success or failure.

use std::sync::Arc;

use narrator_config::{MergeConfig, PublishConfig, SynthesisConfig};
use narrator_core::{RenderOutcome, SegmentRequest};

use crate::cleanup::{CleanupManager, TempArtifacts};
use crate::coordinator::ParallelSynthesisCoordinator;
use crate::encoder::TrackEncoder;
use crate::gap::GapSource;
use crate::merger::TimelineMerger;
use crate::provider::SpeechProvider;
use crate::publisher::DurablePublisher;
use crate::store::ObjectStore;
use crate::synthesizer::SegmentSynthesizer;
use crate::PipelineError;

/// End-to-end dialogue render pipeline
pub struct RenderPipeline {
    coordinator: ParallelSynthesisCoordinator,
    merger: TimelineMerger,
    publisher: DurablePublisher,
    cleanup: CleanupManager,
}

impl RenderPipeline {
    /// Wire the pipeline from its collaborator seams and configuration.
    ///
    /// Every external dependency (provider, store, gap randomness,
    /// encoder) is injected so tests can pin behavior.
    pub fn new(
        provider: Arc<dyn SpeechProvider>,
        store: Arc<dyn ObjectStore>,
        gap_source: Arc<dyn GapSource>,
        encoder: Arc<dyn TrackEncoder>,
        synthesis: &SynthesisConfig,
        merge: MergeConfig,
        publish: &PublishConfig,
    ) -> Self {
        let synthesizer = Arc::new(SegmentSynthesizer::new(provider, merge.temp_dir.clone()));
        Self {
            coordinator: ParallelSynthesisCoordinator::new(synthesizer, synthesis.max_concurrent),
            merger: TimelineMerger::new(merge, gap_source, encoder),
            publisher: DurablePublisher::new(store, publish),
            cleanup: CleanupManager::new(),
        }
    }

    /// Render the script into a published track.
    ///
    /// All-or-nothing: any stage failure surfaces as a single error and no
    /// partial timeline is returned. Temp artifacts from every stage,
    /// including segments synthesized by siblings of a failed batch, are
    /// removed before this returns.
    pub async fn run(&self, segments: Vec<SegmentRequest>) -> Result<RenderOutcome, PipelineError> {
        if segments.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "no segments provided".to_string(),
            ));
        }

        let artifacts = Arc::new(TempArtifacts::new());
        let outcome = self.render(&segments, &artifacts).await;
        self.cleanup.cleanup(&artifacts).await;
        outcome
    }

    async fn render(
        &self,
        segments: &[SegmentRequest],
        artifacts: &Arc<TempArtifacts>,
    ) -> Result<RenderOutcome, PipelineError> {
        tracing::info!(segments = segments.len(), "starting dialogue render");

        let synthesized = self.coordinator.synthesize_all(segments, artifacts).await?;
        let (artifact, timeline) = self.merger.merge(&synthesized, artifacts).await?;
        let published = self.publisher.publish(&artifact).await?;

        let total_duration_sec = (artifact.duration_ms as f64 / 1000.0 * 100.0).round() / 100.0;
        tracing::info!(
            url = %published.remote_url,
            total_duration_sec,
            "dialogue render complete"
        );

        Ok(RenderOutcome {
            remote_url: published.remote_url,
            timeline,
            total_duration_sec,
        })
    }
}
