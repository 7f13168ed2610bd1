//! Timeline and artifact types for merged dialogue tracks

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Playback window of one segment within the merged track.
///
/// Entries are ordered by playback position: `end_sec` of one entry never
/// exceeds `start_sec` of the next (inter-segment pauses can make it
/// strictly less).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Voice identity of the segment
    pub role: String,

    /// Text spoken in the segment
    pub text: String,

    /// Playback start, seconds from track start
    #[serde(rename = "start")]
    pub start_sec: f64,

    /// Playback end, seconds from track start
    #[serde(rename = "end")]
    pub end_sec: f64,
}

impl TimelineEntry {
    /// Spoken duration of the segment in seconds
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }
}

/// The concatenated, normalized, encoded track on local disk.
///
/// Transient: exists only between export and publish (or failure) and is
/// always deleted before the pipeline returns.
#[derive(Debug, Clone)]
pub struct MergedArtifact {
    /// Local path of the encoded track
    pub path: PathBuf,

    /// Spoken duration of the track in milliseconds
    pub duration_ms: u64,

    /// Encoded file size in bytes
    pub size_bytes: u64,
}

/// Stable reference to the published track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResult {
    /// Directly fetchable URL returned by the object store
    pub remote_url: String,
}

/// Final pipeline output returned to the caller.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Published track URL
    pub remote_url: String,

    /// Per-segment playback windows, in input order
    pub timeline: Vec<TimelineEntry>,

    /// Total duration through the last segment's end, in seconds
    pub total_duration_sec: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_entry_duration() {
        let entry = TimelineEntry {
            role: "host".to_string(),
            text: "hello".to_string(),
            start_sec: 1.8,
            end_sec: 2.4,
        };
        assert!((entry.duration_sec() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_timeline_entry_wire_names() {
        let entry = TimelineEntry {
            role: "guest".to_string(),
            text: "world".to_string(),
            start_sec: 0.0,
            end_sec: 0.8,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("start").is_some());
        assert!(json.get("end").is_some());
        assert!(json.get("start_sec").is_none());
    }
}
