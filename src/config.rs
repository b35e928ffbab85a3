use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category;
use crate::error::{Error, Result};
use crate::overlay::AnnotatorKind;
use crate::tracker::TrackerConfig;

/// Runtime tunables for one video feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Category name from the COCO table
    pub category: String,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub agnostic_nms: bool,
    pub max_detections: usize,
    /// Objects allowed in a zone before it is reported overloaded
    pub object_limit: usize,
    /// Occupancy window length in frames
    pub last_frames: usize,
    /// Color detections individually instead of by zone
    pub colorful: bool,
    pub annotators: Vec<AnnotatorKind>,
    pub tracker: TrackerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            category: "person".to_string(),
            confidence_threshold: 0.25,
            iou_threshold: 0.75,
            agnostic_nms: false,
            max_detections: 100,
            object_limit: 3,
            last_frames: 50,
            colorful: false,
            annotators: AnnotatorKind::ALL.to_vec(),
            tracker: TrackerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Class id of the configured category.
    pub fn category_id(&self) -> Result<usize> {
        category::category_id(&self.category)
    }

    pub fn validate(&self) -> Result<()> {
        self.category_id()?;

        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be within [0, 1], got {v}")))
            }
        };
        unit("confidence_threshold", self.confidence_threshold as f64)?;
        unit("iou_threshold", self.iou_threshold as f64)?;
        unit("tracker.max_iou_distance", self.tracker.max_iou_distance)?;
        unit("tracker.max_cosine_distance", self.tracker.max_cosine_distance)?;
        unit("tracker.motion_weight", self.tracker.motion_weight)?;

        if self.last_frames == 0 {
            return Err(Error::InvalidConfig("last_frames must be at least 1".into()));
        }
        if self.tracker.n_init == 0 {
            return Err(Error::InvalidConfig("tracker.n_init must be at least 1".into()));
        }
        let gate = self.tracker.gating_threshold;
        if gate.is_nan() || gate <= 0.0 {
            return Err(Error::InvalidConfig(
                "tracker.gating_threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}
