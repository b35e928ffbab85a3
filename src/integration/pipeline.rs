//! Per-frame pipeline: filter, track, assign zones, aggregate, alert.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::DetectionSource;
use crate::alert::AlertEvaluator;
use crate::config::PipelineConfig;
use crate::detection::{Detection, DetectionFilter, RawFrame};
use crate::error::Result;
use crate::occupancy::OccupancyAggregator;
use crate::tracker::{IdentityTracker, TrackedObject};
use crate::zone::ZoneRegistry;

/// Occupancy of one zone on one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneReport {
    pub zone_id: usize,
    /// Indices into the frame's detections
    pub detections: Vec<usize>,
    /// Track associated with each of `detections`, position for position
    pub track_ids: Vec<Option<u64>>,
    /// Instantaneous count
    pub count: usize,
    /// Windowed mean published for alerting
    pub mean: usize,
    pub overloaded: bool,
}

/// Everything computed for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame_id: u64,
    /// Filtered detections, highest confidence first
    pub detections: Vec<Detection>,
    /// Live tracks, ordered to line up with `detections`
    pub tracks: Vec<TrackedObject>,
    pub zones: Vec<ZoneReport>,
}

impl FrameReport {
    /// Track associated with a detection on this frame.
    pub fn track_for(&self, detection: usize) -> Option<&TrackedObject> {
        self.tracks.iter().find(|t| t.detection == Some(detection))
    }
}

/// Owns the stateful components for one video feed.
pub struct FramePipeline {
    category: String,
    filter: DetectionFilter,
    tracker: IdentityTracker,
    zones: Arc<ZoneRegistry>,
    occupancy: OccupancyAggregator,
    alert: AlertEvaluator,
}

impl FramePipeline {
    /// Validate the configuration and build the pipeline.
    pub fn new(config: &PipelineConfig, zones: Arc<ZoneRegistry>) -> Result<Self> {
        config.validate()?;
        let filter = DetectionFilter::new(
            config.confidence_threshold,
            config.iou_threshold,
            config.category_id()?,
        )
        .with_agnostic(config.agnostic_nms)
        .with_max_detections(config.max_detections);

        Ok(Self {
            category: config.category.clone(),
            filter,
            tracker: IdentityTracker::new(config.tracker.clone()),
            occupancy: OccupancyAggregator::new(zones.len(), config.last_frames),
            alert: AlertEvaluator::new(config.object_limit),
            zones,
        })
    }

    /// Process raw detector output for the next frame.
    pub fn process_frame(&mut self, frame: &RawFrame) -> FrameReport {
        let detections = self.filter.apply(frame);
        self.process_detections(detections)
    }

    /// Process already-filtered detections for the next frame.
    pub fn process_detections(&mut self, detections: Vec<Detection>) -> FrameReport {
        let tracks = self.tracker.update(&detections);

        let mut track_of = vec![None; detections.len()];
        for track in &tracks {
            if let Some(i) = track.detection {
                track_of[i] = Some(track.track_id);
            }
        }

        let resolution = self.zones.resolution();
        let mut zones = Vec::with_capacity(self.zones.len());
        for zone in self.zones.iter() {
            let inside = zone.detections_in_zone(&detections, resolution);
            let count = inside.len();
            let mean = self.occupancy.record(zone.id, count);
            let overloaded = self.alert.evaluate(mean);

            info!(
                zone = zone.id,
                category = %self.category,
                mean,
                overloaded,
                "zone occupancy"
            );

            zones.push(ZoneReport {
                zone_id: zone.id,
                track_ids: inside.iter().map(|&i| track_of[i]).collect(),
                detections: inside,
                count,
                mean,
                overloaded,
            });
        }

        FrameReport {
            frame_id: self.tracker.frame_id(),
            detections,
            tracks,
            zones,
        }
    }

    pub fn tracker(&self) -> &IdentityTracker {
        &self.tracker
    }

    pub fn zones(&self) -> &Arc<ZoneRegistry> {
        &self.zones
    }

    pub fn occupancy(&self) -> &OccupancyAggregator {
        &self.occupancy
    }
}

/// A pipeline fed by a detection backend.
pub struct SourcedPipeline<D: DetectionSource> {
    source: D,
    pipeline: FramePipeline,
}

impl<D: DetectionSource> SourcedPipeline<D> {
    pub fn new(source: D, pipeline: FramePipeline) -> Self {
        Self { source, pipeline }
    }

    /// Run detection on the input image, then the frame pipeline.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> std::result::Result<FrameReport, D::Error> {
        let frame = self.source.detect(input, width, height)?;
        Ok(self.pipeline.process_frame(&frame))
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut D {
        &mut self.source
    }

    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }
}
