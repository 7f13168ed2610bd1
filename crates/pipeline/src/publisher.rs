//! Durable publish with bounded retry
//!
//! Upload failures are retried with exponential backoff (1 s, then 2 s by
//! default). Blocking the request task during backoff is fine here: the
//! synthesis step dwarfs these waits.

use std::sync::Arc;
use std::time::Duration;

use narrator_config::PublishConfig;
use narrator_core::{MergedArtifact, PublishResult};

use crate::store::ObjectStore;
use crate::PipelineError;

/// Publishes the merged artifact to the object store
pub struct DurablePublisher {
    store: Arc<dyn ObjectStore>,
    max_attempts: u32,
    backoff_base: Duration,
}

impl DurablePublisher {
    pub fn new(store: Arc<dyn ObjectStore>, config: &PublishConfig) -> Self {
        Self {
            store,
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_secs(config.backoff_base_secs),
        }
    }

    /// Upload the artifact, retrying up to the configured attempt bound.
    ///
    /// Exhaustion yields a `Publish` error wrapping the last cause.
    pub async fn publish(&self, artifact: &MergedArtifact) -> Result<PublishResult, PipelineError> {
        let mut last_error: Option<PipelineError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.backoff_base * 2u32.pow(attempt - 1);
                tracing::debug!(
                    attempt = attempt + 1,
                    delay_secs = delay.as_secs(),
                    "waiting before upload retry"
                );
                tokio::time::sleep(delay).await;
            }

            tracing::info!(
                attempt = attempt + 1,
                max_attempts = self.max_attempts,
                path = %artifact.path.display(),
                size_bytes = artifact.size_bytes,
                "uploading merged track"
            );

            match self.store.upload(&artifact.path).await {
                Ok(remote_url) => {
                    tracing::info!(url = %remote_url, "upload succeeded");
                    return Ok(PublishResult { remote_url });
                }
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "upload attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(PipelineError::Publish {
            attempts: self.max_attempts,
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown upload error".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyStore {
        attempts: AtomicU32,
        succeed_after: u32,
    }

    impl FlakyStore {
        fn failing() -> Self {
            Self {
                attempts: AtomicU32::new(0),
                succeed_after: u32::MAX,
            }
        }

        fn succeeding_on(attempt: u32) -> Self {
            Self {
                attempts: AtomicU32::new(0),
                succeed_after: attempt,
            }
        }
    }

    #[async_trait]
    impl ObjectStore for FlakyStore {
        async fn upload(&self, _path: &Path) -> Result<String, PipelineError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt >= self.succeed_after {
                Ok(format!("https://cdn.example.com/track-{attempt}.mp3"))
            } else {
                Err(PipelineError::Http(format!("store unavailable (attempt {attempt})")))
            }
        }
    }

    fn artifact() -> MergedArtifact {
        MergedArtifact {
            path: "merged.mp3".into(),
            duration_ms: 2400,
            size_bytes: 40_000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_exact_attempt_bound() {
        let store = Arc::new(FlakyStore::failing());
        let publisher = DurablePublisher::new(store.clone(), &PublishConfig::default());

        let started = tokio::time::Instant::now();
        let err = publisher.publish(&artifact()).await.unwrap_err();

        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
        match err {
            PipelineError::Publish { attempts, message } => {
                assert_eq!(attempts, 3);
                assert!(message.contains("store unavailable"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Backoffs of 1s then 2s under virtual time
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_retry() {
        let store = Arc::new(FlakyStore::succeeding_on(2));
        let publisher = DurablePublisher::new(store.clone(), &PublishConfig::default());

        let result = publisher.publish(&artifact()).await.unwrap();

        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(result.remote_url, "https://cdn.example.com/track-2.mp3");
    }

    #[tokio::test]
    async fn test_first_attempt_success_skips_backoff() {
        let store = Arc::new(FlakyStore::succeeding_on(1));
        let publisher = DurablePublisher::new(store.clone(), &PublishConfig::default());

        let result = publisher.publish(&artifact()).await.unwrap();
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
        assert!(result.remote_url.starts_with("https://"));
    }
}
