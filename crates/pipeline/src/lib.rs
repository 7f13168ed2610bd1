//! Dialogue audio rendering pipeline
//!
//! This crate implements the core render flow:
//! - Parallel segment synthesis through a remote speech provider
//! - Ordered merge with randomized inter-segment pauses
//! - Playback timeline construction
//! - Durable publish with bounded retry
//! - Guaranteed temp-artifact cleanup

pub mod audio;
pub mod cleanup;
pub mod coordinator;
pub mod encoder;
pub mod gap;
pub mod merger;
pub mod orchestrator;
pub mod provider;
pub mod publisher;
pub mod store;
pub mod synthesizer;

pub use audio::AudioBuffer;
pub use cleanup::{CleanupManager, TempArtifacts};
pub use coordinator::ParallelSynthesisCoordinator;
pub use encoder::{FfmpegEncoder, TrackEncoder};
pub use gap::{FixedGapSource, GapSource, RandomGapSource};
pub use merger::TimelineMerger;
pub use orchestrator::RenderPipeline;
pub use provider::{HttpSpeechProvider, SpeechProvider};
pub use publisher::DurablePublisher;
pub use store::{HttpObjectStore, ObjectStore};
pub use synthesizer::SegmentSynthesizer;

use thiserror::Error;

/// Pipeline errors
///
/// Every variant is terminal for the current request: nothing is recovered
/// locally, and no partial result is ever surfaced to the caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Synthesis failed for voice '{voice_id}': {message}")]
    Synthesis { voice_id: String, message: String },

    #[error("Batch synthesis aborted ({failed} of {total} segments failed): {first}")]
    BatchSynthesis {
        failed: usize,
        total: usize,
        first: Box<PipelineError>,
    },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Publish failed after {attempts} attempts: {message}")]
    Publish { attempts: u32, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PipelineError> for narrator_core::Error {
    fn from(err: PipelineError) -> Self {
        narrator_core::Error::Pipeline(err.to_string())
    }
}
