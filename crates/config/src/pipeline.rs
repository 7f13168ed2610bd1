//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Speech synthesis provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Provider API base URL
    #[serde(default = "default_synthesis_endpoint")]
    pub endpoint: String,

    /// API key; normally supplied via NARRATOR__SYNTHESIS__API_KEY
    #[serde(default)]
    pub api_key: Option<String>,

    /// Provider model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Audio format requested from the provider
    #[serde(default = "default_response_format")]
    pub response_format: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_synthesis_timeout")]
    pub timeout_secs: u64,

    /// Maximum synthesis calls in flight per request
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_synthesis_endpoint() -> String {
    "https://api.openai.com".to_string()
}
fn default_model() -> String {
    "tts-1".to_string()
}
fn default_response_format() -> String {
    "wav".to_string()
}
fn default_synthesis_timeout() -> u64 {
    60
}
fn default_max_concurrent() -> usize {
    8
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_synthesis_endpoint(),
            api_key: None,
            model: default_model(),
            response_format: default_response_format(),
            timeout_secs: default_synthesis_timeout(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Merge and export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Directory for temp artifacts; created at startup
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Output sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Output bitrate in kb/s
    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,

    /// Minimum inter-segment pause (ms)
    #[serde(default = "default_gap_min")]
    pub gap_min_ms: u64,

    /// Maximum inter-segment pause (ms)
    #[serde(default = "default_gap_max")]
    pub gap_max_ms: u64,

    /// Exported files smaller than this are treated as corrupt
    #[serde(default = "default_min_artifact_bytes")]
    pub min_artifact_bytes: u64,
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}
fn default_sample_rate() -> u32 {
    22050
}
fn default_bitrate() -> u32 {
    128
}
fn default_gap_min() -> u64 {
    500
}
fn default_gap_max() -> u64 {
    1500
}
fn default_min_artifact_bytes() -> u64 {
    1000
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            sample_rate: default_sample_rate(),
            bitrate_kbps: default_bitrate(),
            gap_min_ms: default_gap_min(),
            gap_max_ms: default_gap_max(),
            min_artifact_bytes: default_min_artifact_bytes(),
        }
    }
}

/// Durable publish configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Object store upload URL
    #[serde(default = "default_publish_endpoint")]
    pub endpoint: String,

    /// Folder/prefix assigned to uploaded tracks
    #[serde(default = "default_folder")]
    pub folder: String,

    /// Total upload attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base in seconds; doubles after each failed attempt
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,

    /// Per-upload timeout in seconds
    #[serde(default = "default_publish_timeout")]
    pub timeout_secs: u64,
}

fn default_publish_endpoint() -> String {
    "https://api.cloudinary.com/v1_1/demo/video/upload".to_string()
}
fn default_folder() -> String {
    "tts_audio".to_string()
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_base() -> u64 {
    1
}
fn default_publish_timeout() -> u64 {
    120
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            endpoint: default_publish_endpoint(),
            folder: default_folder(),
            max_attempts: default_max_attempts(),
            backoff_base_secs: default_backoff_base(),
            timeout_secs: default_publish_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_merge_config() {
        let config = MergeConfig::default();
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.bitrate_kbps, 128);
        assert_eq!(config.gap_min_ms, 500);
        assert_eq!(config.gap_max_ms, 1500);
    }

    #[test]
    fn test_default_publish_config() {
        let config = PublishConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_base_secs, 1);
    }
}
