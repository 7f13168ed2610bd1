//! Script segment types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One voice+text unit of a dialogue script.
///
/// The position of a segment in the request sequence is its playback
/// position; that order is preserved through every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRequest {
    /// Voice identity understood by the synthesis provider
    pub role: String,

    /// Text to speak
    pub text: String,
}

impl SegmentRequest {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}

/// A synthesized segment materialized as a temp audio file.
///
/// Owned by the pipeline invocation that created it and deleted before
/// that invocation returns. `source_index` always equals the position of
/// the originating [`SegmentRequest`].
#[derive(Debug, Clone)]
pub struct SynthesizedSegment {
    /// Position of the originating request in the input sequence
    pub source_index: usize,

    /// Path of the per-segment audio file in the temp namespace
    pub artifact_path: PathBuf,

    /// Voice identity the segment was synthesized with
    pub role: String,

    /// Text that was synthesized
    pub text: String,
}
