//! Parallel synthesis fan-out and ordered fan-in
//!
//! One task per segment, bounded by a semaphore. Completion order is
//! unconstrained; results are re-associated into the original request
//! order before anything flows downstream. Any failure aborts the whole
//! batch. Siblings still run to completion, and every artifact they
//! produce stays registered for cleanup.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use narrator_core::{SegmentRequest, SynthesizedSegment};

use crate::cleanup::TempArtifacts;
use crate::synthesizer::SegmentSynthesizer;
use crate::PipelineError;

/// Fans out segment synthesis and fans results back in input order
pub struct ParallelSynthesisCoordinator {
    synthesizer: Arc<SegmentSynthesizer>,
    max_concurrent: usize,
}

impl ParallelSynthesisCoordinator {
    pub fn new(synthesizer: Arc<SegmentSynthesizer>, max_concurrent: usize) -> Self {
        Self {
            synthesizer,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Synthesize every segment concurrently, preserving input order.
    ///
    /// Tasks hand back `(index, Result)` pairs rather than unwinding
    /// across the task boundary, so the first failure by original index
    /// can be picked deterministically. No partial successes are returned.
    pub async fn synthesize_all(
        &self,
        segments: &[SegmentRequest],
        artifacts: &Arc<TempArtifacts>,
    ) -> Result<Vec<SynthesizedSegment>, PipelineError> {
        let total = segments.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut join_set: JoinSet<(usize, Result<SynthesizedSegment, PipelineError>)> =
            JoinSet::new();

        for (index, request) in segments.iter().cloned().enumerate() {
            let synthesizer = Arc::clone(&self.synthesizer);
            let semaphore = Arc::clone(&semaphore);
            let artifacts = Arc::clone(artifacts);
            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            index,
                            Err(PipelineError::Synthesis {
                                voice_id: request.role.clone(),
                                message: "synthesis pool closed".to_string(),
                            }),
                        );
                    }
                };
                let result = synthesizer.synthesize(index, &request, &artifacts).await;
                (index, result)
            });
        }

        let mut ordered: Vec<Option<SynthesizedSegment>> = (0..total).map(|_| None).collect();
        let mut failures: Vec<(usize, PipelineError)> = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(segment))) => {
                    ordered[index] = Some(segment);
                }
                Ok((index, Err(e))) => {
                    tracing::warn!(index, error = %e, "segment synthesis failed");
                    failures.push((index, e));
                }
                Err(join_err) => {
                    tracing::error!(error = %join_err, "synthesis task aborted");
                    failures.push((
                        total,
                        PipelineError::Synthesis {
                            voice_id: "unknown".to_string(),
                            message: format!("synthesis task aborted: {}", join_err),
                        },
                    ));
                }
            }
        }

        if !failures.is_empty() {
            failures.sort_by_key(|(index, _)| *index);
            let failed = failures.len();
            let (_, first) = failures.remove(0);
            return Err(PipelineError::BatchSynthesis {
                failed,
                total,
                first: Box::new(first),
            });
        }

        let segments: Vec<SynthesizedSegment> = ordered.into_iter().flatten().collect();
        debug_assert_eq!(segments.len(), total);
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SpeechProvider;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::time::Duration;

    /// Finishes later for earlier indices, so completion order inverts
    /// request order; fails for any voice named "broken".
    struct InvertedLatencyProvider {
        total: usize,
    }

    #[async_trait]
    impl SpeechProvider for InvertedLatencyProvider {
        async fn synthesize(&self, voice_id: &str, text: &str) -> Result<Bytes, PipelineError> {
            let index: usize = text.parse().unwrap_or(0);
            let delay = (self.total - index) as u64 * 10;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if voice_id == "broken" {
                return Err(PipelineError::Synthesis {
                    voice_id: voice_id.to_string(),
                    message: format!("provider refused segment {index}"),
                });
            }
            Ok(Bytes::from(vec![0u8; 8]))
        }
    }

    fn coordinator(dir: &std::path::Path, total: usize) -> ParallelSynthesisCoordinator {
        let provider = Arc::new(InvertedLatencyProvider { total });
        let synthesizer = Arc::new(SegmentSynthesizer::new(provider, dir));
        ParallelSynthesisCoordinator::new(synthesizer, 4)
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let segments: Vec<SegmentRequest> = (0..5)
            .map(|i| SegmentRequest::new(format!("voice-{i}"), i.to_string()))
            .collect();
        let artifacts = Arc::new(TempArtifacts::new());

        let results = coordinator(dir.path(), 5)
            .synthesize_all(&segments, &artifacts)
            .await
            .unwrap();

        assert_eq!(results.len(), 5);
        for (i, segment) in results.iter().enumerate() {
            assert_eq!(segment.source_index, i);
            assert_eq!(segment.role, format!("voice-{i}"));
        }
    }

    #[tokio::test]
    async fn test_single_failure_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![
            SegmentRequest::new("voice-a", "0"),
            SegmentRequest::new("broken", "1"),
            SegmentRequest::new("voice-c", "2"),
        ];
        let artifacts = Arc::new(TempArtifacts::new());

        let err = coordinator(dir.path(), 3)
            .synthesize_all(&segments, &artifacts)
            .await
            .unwrap_err();

        match err {
            PipelineError::BatchSynthesis { failed, total, first } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 3);
                match *first {
                    PipelineError::Synthesis { ref voice_id, .. } => {
                        assert_eq!(voice_id, "broken")
                    }
                    ref other => panic!("unexpected first failure: {other}"),
                }
            }
            other => panic!("unexpected error: {other}"),
        }

        // The surviving siblings' artifacts stay registered for cleanup
        assert_eq!(artifacts.paths().len(), 2);
    }

    #[tokio::test]
    async fn test_first_failure_is_lowest_index() {
        let dir = tempfile::tempdir().unwrap();
        // Index 3 completes (and fails) before index 1 does
        let segments = vec![
            SegmentRequest::new("voice-a", "0"),
            SegmentRequest::new("broken", "1"),
            SegmentRequest::new("voice-c", "2"),
            SegmentRequest::new("broken", "3"),
        ];
        let artifacts = Arc::new(TempArtifacts::new());

        let err = coordinator(dir.path(), 4)
            .synthesize_all(&segments, &artifacts)
            .await
            .unwrap_err();

        match err {
            PipelineError::BatchSynthesis { failed, first, .. } => {
                assert_eq!(failed, 2);
                let message = first.to_string();
                assert!(message.contains("segment 1"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty_success() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Arc::new(TempArtifacts::new());
        let results = coordinator(dir.path(), 1)
            .synthesize_all(&[], &artifacts)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
