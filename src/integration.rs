//! Integration module for connecting detection backends with the frame pipeline.
//!
//! This module provides the per-frame pipeline, the trait an inference
//! backend implements to feed it, and helpers for building raw detector rows.

mod builder;
mod detector;
mod pipeline;

pub use builder::RawDetectionBuilder;
pub use detector::DetectionSource;
pub use pipeline::{FramePipeline, FrameReport, SourcedPipeline, ZoneReport};
