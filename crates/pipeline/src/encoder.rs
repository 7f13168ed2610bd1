//! Compressed track export
//!
//! The merged PCM is written as WAV and then handed to an encoder. The
//! production encoder shells out to ffmpeg, which is what the deployment
//! image ships for MP3 export.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::PipelineError;

/// Encoder seam between the merge step and the published artifact
#[async_trait]
pub trait TrackEncoder: Send + Sync {
    /// Encode a WAV file into the final compressed artifact at `out_path`
    async fn encode(&self, wav_path: &Path, out_path: &Path) -> Result<(), PipelineError>;

    /// File extension of the encoder output (without dot)
    fn extension(&self) -> &str;
}

/// MP3 export via the ffmpeg binary
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    sample_rate: u32,
    bitrate_kbps: u32,
}

impl FfmpegEncoder {
    pub fn new(sample_rate: u32, bitrate_kbps: u32) -> Self {
        Self {
            sample_rate,
            bitrate_kbps,
        }
    }

    /// Probe for ffmpeg on PATH. Used at startup so a missing binary is
    /// reported once, loudly, instead of on the first render.
    pub async fn is_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl TrackEncoder for FfmpegEncoder {
    async fn encode(&self, wav_path: &Path, out_path: &Path) -> Result<(), PipelineError> {
        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(wav_path)
            .args(["-ac", "1"])
            .args(["-ar", &self.sample_rate.to_string()])
            .args(["-b:a", &format!("{}k", self.bitrate_kbps)])
            .arg(out_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PipelineError::Encoding("ffmpeg not found on PATH".to_string())
                } else {
                    PipelineError::Encoding(format!("failed to run ffmpeg: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(5)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(PipelineError::Encoding(format!(
                "ffmpeg exited with {}: {}",
                output.status, tail
            )));
        }

        Ok(())
    }

    fn extension(&self) -> &str {
        "mp3"
    }
}
