//! Detector output types and the per-frame detection filter.

mod filter;
mod letterbox;
mod mask;
mod nms;

use ndarray::Array2;
use serde::Serialize;

use crate::tracker::Rect;

pub use filter::{DetectionFilter, filter};
pub use letterbox::Letterbox;
pub use mask::recover_mask;
pub use nms::non_max_suppression;

/// A filtered detection in original frame coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Bounding box in TLWH format, frame pixels
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
    pub class_id: usize,
    /// Binary instance mask at frame resolution (rows = height)
    #[serde(skip)]
    pub mask: Option<Array2<bool>>,
    /// Appearance embedding from an external re-identification model
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self::from_rect(Rect::from_tlbr(x1, y1, x2, y2), score)
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self {
            bbox,
            score,
            class_id: 0,
            mask: None,
            embedding: None,
        }
    }

    pub fn with_class(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_mask(mut self, mask: Array2<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// One detector output row, before suppression.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Box as (x1, y1, x2, y2) in the letterboxed inference input
    pub bbox: [f32; 4],
    pub score: f32,
    pub class_id: usize,
    pub embedding: Option<Vec<f32>>,
}

/// Everything the detector produced for one frame.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub detections: Vec<RawDetection>,
    /// One soft mask per detection, at the input resolution or a proportional downscale
    pub masks: Option<Vec<Array2<f32>>>,
    /// Geometry used to build the inference input from the frame
    pub letterbox: Letterbox,
}

impl RawFrame {
    pub fn new(detections: Vec<RawDetection>, letterbox: Letterbox) -> Self {
        Self {
            detections,
            masks: None,
            letterbox,
        }
    }

    pub fn with_masks(mut self, masks: Vec<Array2<f32>>) -> Self {
        self.masks = Some(masks);
        self
    }
}
