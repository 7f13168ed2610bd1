//! Single-segment synthesis
//!
//! One provider call per segment, materialized as one temp WAV file with
//! a collision-resistant name. Retry policy, if any, belongs to a higher
//! layer; this component never retries.

use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use narrator_core::{SegmentRequest, SynthesizedSegment};

use crate::cleanup::TempArtifacts;
use crate::provider::SpeechProvider;
use crate::PipelineError;

/// Synthesizes one segment into a temp audio file
pub struct SegmentSynthesizer {
    provider: Arc<dyn SpeechProvider>,
    temp_dir: PathBuf,
}

impl SegmentSynthesizer {
    pub fn new(provider: Arc<dyn SpeechProvider>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            temp_dir: temp_dir.into(),
        }
    }

    /// Synthesize one segment and write its audio under the temp dir.
    ///
    /// The artifact path is registered for cleanup before the file is
    /// written, so a partially written file can never leak.
    pub async fn synthesize(
        &self,
        index: usize,
        request: &SegmentRequest,
        artifacts: &TempArtifacts,
    ) -> Result<SynthesizedSegment, PipelineError> {
        let audio = self
            .provider
            .synthesize(&request.role, &request.text)
            .await?;

        let token = Uuid::new_v4().simple().to_string();
        let filename = format!("{}_{}.wav", sanitize_role(&request.role), &token[..8]);
        let path = self.temp_dir.join(filename);
        artifacts.register(&path);

        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| PipelineError::Synthesis {
                voice_id: request.role.clone(),
                message: format!("failed to write segment audio: {}", e),
            })?;

        tracing::debug!(
            index,
            role = %request.role,
            path = %path.display(),
            bytes = audio.len(),
            "segment synthesized"
        );

        Ok(SynthesizedSegment {
            source_index: index,
            artifact_path: path,
            role: request.role.clone(),
            text: request.text.clone(),
        })
    }
}

/// Keep the voice id readable in filenames without letting it inject path
/// separators or other surprises.
fn sanitize_role(role: &str) -> String {
    let cleaned: String = role
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "voice".to_string()
    } else {
        cleaned
    }
}
