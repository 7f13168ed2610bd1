//! Speech synthesis provider client
//!
//! The provider is an opaque, possibly slow, possibly failing remote
//! service: voice + text in, encoded audio bytes out.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use narrator_config::SynthesisConfig;

use crate::PipelineError;

/// Speech synthesis provider seam
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize one utterance, returning raw encoded audio bytes
    async fn synthesize(&self, voice_id: &str, text: &str) -> Result<Bytes, PipelineError>;
}

/// HTTP speech provider speaking the OpenAI-style speech API
pub struct HttpSpeechProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    response_format: String,
}

impl HttpSpeechProvider {
    /// Create a provider client from configuration.
    ///
    /// The per-call timeout guards the whole batch against a stalled
    /// provider: one hung call would otherwise block the fan-in forever.
    pub fn new(config: &SynthesisConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            response_format: config.response_format.clone(),
        })
    }
}

#[async_trait]
impl SpeechProvider for HttpSpeechProvider {
    async fn synthesize(&self, voice_id: &str, text: &str) -> Result<Bytes, PipelineError> {
        let request_body = json!({
            "model": self.model,
            "input": text,
            "voice": voice_id,
            "response_format": self.response_format,
        });

        let url = format!("{}/v1/audio/speech", self.endpoint);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body);

        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| PipelineError::Synthesis {
            voice_id: voice_id.to_string(),
            message: format!("provider request failed: {}", e),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(PipelineError::Synthesis {
                voice_id: voice_id.to_string(),
                message: format!("provider error ({}): {}", status, error_text),
            });
        }

        response.bytes().await.map_err(|e| PipelineError::Synthesis {
            voice_id: voice_id.to_string(),
            message: format!("failed to read audio response: {}", e),
        })
    }
}
