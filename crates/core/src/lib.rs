//! Core types for the narrator audio service
//!
//! This crate provides foundational types used across all other crates:
//! - Script segment types (input and synthesized)
//! - Timeline and artifact types
//! - Error types

pub mod error;
pub mod segment;
pub mod timeline;

pub use error::{Error, Result};
pub use segment::{SegmentRequest, SynthesizedSegment};
pub use timeline::{MergedArtifact, PublishResult, RenderOutcome, TimelineEntry};
