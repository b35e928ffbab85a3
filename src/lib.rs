//! Multi-object tracking and zone occupancy analytics for people counting.
//!
//! Detector output flows through [`FramePipeline`]: it is filtered and
//! unmapped to frame coordinates, associated with persistent identities by
//! [`IdentityTracker`], assigned to polygonal zones, smoothed over a sliding
//! window and checked against an occupancy limit.

pub mod alert;
pub mod category;
pub mod color;
pub mod config;
pub mod detection;
pub mod error;
pub mod integration;
pub mod occupancy;
pub mod overlay;
pub mod tracker;
pub mod zone;

pub use config::PipelineConfig;
pub use detection::{Detection, DetectionFilter, Letterbox, RawDetection, RawFrame};
pub use error::{Error, Result};
pub use integration::{
    DetectionSource, FramePipeline, FrameReport, RawDetectionBuilder, SourcedPipeline, ZoneReport,
};
pub use occupancy::{OccupancyAggregator, OccupancyWindow};
pub use tracker::{IdentityTracker, Rect, TrackState, TrackedObject, TrackerConfig};
pub use zone::{Zone, ZoneRegistry};
