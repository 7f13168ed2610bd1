//! Ordered merge and timeline construction
//!
//! Walks the synthesized segments in input order, concatenating audio
//! with a randomized pause between segments, and records each segment's
//! playback window. No pause follows the final segment, so the exported
//! duration and the reported duration are the same number.

use std::sync::Arc;
use uuid::Uuid;

use narrator_config::MergeConfig;
use narrator_core::{MergedArtifact, SynthesizedSegment, TimelineEntry};

use crate::audio::AudioBuffer;
use crate::cleanup::TempArtifacts;
use crate::encoder::TrackEncoder;
use crate::gap::GapSource;
use crate::PipelineError;

/// Merges ordered segments into one normalized, encoded track
pub struct TimelineMerger {
    config: MergeConfig,
    gap_source: Arc<dyn GapSource>,
    encoder: Arc<dyn TrackEncoder>,
}

impl TimelineMerger {
    pub fn new(
        config: MergeConfig,
        gap_source: Arc<dyn GapSource>,
        encoder: Arc<dyn TrackEncoder>,
    ) -> Self {
        Self {
            config,
            gap_source,
            encoder,
        }
    }

    /// Concatenate the segments and export the encoded track.
    ///
    /// Returns the merged artifact and the per-segment timeline, in input
    /// order. Both the intermediate WAV and the encoded output are
    /// registered in `artifacts` before they are written.
    pub async fn merge(
        &self,
        segments: &[SynthesizedSegment],
        artifacts: &TempArtifacts,
    ) -> Result<(MergedArtifact, Vec<TimelineEntry>), PipelineError> {
        if segments.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "no segments to merge".to_string(),
            ));
        }

        let mut combined = AudioBuffer::empty(self.config.sample_rate);
        let mut timeline = Vec::with_capacity(segments.len());
        let mut cursor_ms: u64 = 0;

        for (i, segment) in segments.iter().enumerate() {
            let audio =
                AudioBuffer::from_wav_file(&segment.artifact_path, self.config.sample_rate)?;
            let duration_ms = audio.duration_ms();
            let start_ms = cursor_ms;
            let end_ms = cursor_ms + duration_ms;

            timeline.push(TimelineEntry {
                role: segment.role.clone(),
                text: segment.text.clone(),
                start_sec: start_ms as f64 / 1000.0,
                end_sec: end_ms as f64 / 1000.0,
            });

            combined.append(&audio);
            cursor_ms = end_ms;

            if i + 1 < segments.len() {
                let gap_ms = self.gap_source.next_gap_ms();
                combined.append_silence(gap_ms);
                cursor_ms += gap_ms;
                tracing::debug!(index = i, gap_ms, "appended inter-segment pause");
            }
        }

        let token = Uuid::new_v4().simple().to_string();
        let wav_path = self
            .config
            .temp_dir
            .join(format!("merged_{}.wav", &token[..8]));
        artifacts.register(&wav_path);
        combined.write_wav(&wav_path)?;

        let out_path = self
            .config
            .temp_dir
            .join(format!("merged_{}.{}", &token[..8], self.encoder.extension()));
        artifacts.register(&out_path);
        self.encoder.encode(&wav_path, &out_path).await?;

        let size_bytes = tokio::fs::metadata(&out_path).await?.len();
        if size_bytes < self.config.min_artifact_bytes {
            return Err(PipelineError::Encoding(format!(
                "merged track is {} bytes (minimum {}), likely corrupt",
                size_bytes, self.config.min_artifact_bytes
            )));
        }

        tracing::info!(
            path = %out_path.display(),
            size_bytes,
            duration_ms = cursor_ms,
            segments = segments.len(),
            "merged track exported"
        );

        Ok((
            MergedArtifact {
                path: out_path,
                duration_ms: cursor_ms,
                size_bytes,
            },
            timeline,
        ))
    }
}
