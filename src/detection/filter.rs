use ndarray::Array2;
use tracing::warn;

use super::letterbox::Letterbox;
use super::mask::recover_mask;
use super::nms::non_max_suppression;
use super::{Detection, RawDetection, RawFrame};
use crate::tracker::Rect;

/// Suppresses redundant boxes and keeps the target category.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionFilter {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    /// Class id of the category to keep
    pub class_id: usize,
    /// Let boxes of different classes suppress each other
    pub agnostic: bool,
    /// Upper bound on boxes surviving suppression
    pub max_detections: usize,
}

impl DetectionFilter {
    pub fn new(confidence_threshold: f32, iou_threshold: f32, class_id: usize) -> Self {
        Self {
            confidence_threshold,
            iou_threshold,
            class_id,
            agnostic: false,
            max_detections: 100,
        }
    }

    pub fn with_agnostic(mut self, agnostic: bool) -> Self {
        self.agnostic = agnostic;
        self
    }

    pub fn with_max_detections(mut self, max_detections: usize) -> Self {
        self.max_detections = max_detections;
        self
    }

    /// Filter one frame of detector output.
    ///
    /// The result is in original frame coordinates, sorted by confidence
    /// (descending). An empty result is a normal outcome.
    pub fn apply(&self, frame: &RawFrame) -> Vec<Detection> {
        let masks = match frame.masks.as_deref() {
            Some(masks) if masks.len() != frame.detections.len() => {
                warn!(
                    masks = masks.len(),
                    boxes = frame.detections.len(),
                    "mask count does not match box count, ignoring masks"
                );
                None
            }
            other => other,
        };

        // Confidence gate, keeping indices into the raw rows.
        let candidates: Vec<usize> = frame
            .detections
            .iter()
            .enumerate()
            .filter(|(_, d)| d.score >= self.confidence_threshold)
            .filter(|(_, d)| d.bbox[2] > d.bbox[0] && d.bbox[3] > d.bbox[1])
            .map(|(i, _)| i)
            .collect();

        let rects: Vec<Rect> = candidates
            .iter()
            .map(|&i| {
                let [x1, y1, x2, y2] = frame.detections[i].bbox;
                Rect::from_tlbr(x1, y1, x2, y2)
            })
            .collect();
        let scores: Vec<f32> = candidates.iter().map(|&i| frame.detections[i].score).collect();
        let classes: Vec<usize> = candidates
            .iter()
            .map(|&i| frame.detections[i].class_id)
            .collect();

        let class_groups = (!self.agnostic).then_some(classes.as_slice());
        let mut keep = non_max_suppression(&rects, &scores, class_groups, self.iou_threshold);
        keep.truncate(self.max_detections);

        keep.into_iter()
            .map(|k| candidates[k])
            .filter(|&i| frame.detections[i].class_id == self.class_id)
            .filter_map(|i| {
                let mask = masks.map(|m| &m[i]);
                to_detection(&frame.detections[i], mask, &frame.letterbox)
            })
            .collect()
    }
}

/// Map a surviving raw row into the frame; boxes that collapse after clipping are dropped.
fn to_detection(
    raw: &RawDetection,
    mask: Option<&Array2<f32>>,
    letterbox: &Letterbox,
) -> Option<Detection> {
    let bbox = letterbox.to_frame(raw.bbox);
    if !bbox.is_valid() {
        return None;
    }
    Some(Detection {
        bbox,
        score: raw.score,
        class_id: raw.class_id,
        mask: mask.map(|m| recover_mask(m, letterbox, &bbox)),
        embedding: raw.embedding.clone(),
    })
}

/// Functional form of [`DetectionFilter::apply`] with class-aware suppression.
pub fn filter(
    raw_boxes: &[RawDetection],
    raw_masks: Option<&[Array2<f32>]>,
    letterbox: &Letterbox,
    confidence_threshold: f32,
    iou_threshold: f32,
    class_id: usize,
) -> Vec<Detection> {
    let frame = RawFrame {
        detections: raw_boxes.to_vec(),
        masks: raw_masks.map(<[Array2<f32>]>::to_vec),
        letterbox: *letterbox,
    };
    DetectionFilter::new(confidence_threshold, iou_threshold, class_id).apply(&frame)
}
