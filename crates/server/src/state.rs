//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use narrator_config::Settings;
use narrator_pipeline::{
    FfmpegEncoder, HttpObjectStore, HttpSpeechProvider, RandomGapSource, RenderPipeline,
    SegmentSynthesizer, SpeechProvider,
};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Settings>,
    /// End-to-end render pipeline
    pub pipeline: Arc<RenderPipeline>,
    /// Single-segment synthesizer for the one-shot endpoint
    pub synthesizer: Arc<SegmentSynthesizer>,
}

impl AppState {
    /// Create new application state with production collaborators
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let provider: Arc<dyn SpeechProvider> =
            Arc::new(HttpSpeechProvider::new(&config.synthesis).map_err(init_error)?);
        let store = Arc::new(HttpObjectStore::new(&config.publish).map_err(init_error)?);
        let gap_source = Arc::new(RandomGapSource::new(
            config.merge.gap_min_ms,
            config.merge.gap_max_ms,
        ));
        let encoder = Arc::new(FfmpegEncoder::new(
            config.merge.sample_rate,
            config.merge.bitrate_kbps,
        ));

        let pipeline = RenderPipeline::new(
            Arc::clone(&provider),
            store,
            gap_source,
            encoder,
            &config.synthesis,
            config.merge.clone(),
            &config.publish,
        );
        let synthesizer = SegmentSynthesizer::new(provider, config.merge.temp_dir.clone());

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            synthesizer: Arc::new(synthesizer),
        })
    }
}

fn init_error(err: narrator_pipeline::PipelineError) -> ServerError {
    ServerError::Init(err.to_string())
}
