//! Matching utilities for multi-object tracking.

use ndarray::Array2;

use crate::detection::Detection;
use crate::tracker::assignment::min_cost_matching;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::rect::{Rect, iou_batch};
use crate::tracker::track::Track;

/// Cost value marking a forbidden track/detection pair.
pub const INFEASIBLE: f64 = f64::INFINITY;

/// Thresholds and weights used to price track/detection pairs.
#[derive(Debug, Clone, Copy)]
pub struct CostParams {
    /// Largest accepted `1 - IoU` between predicted and detected boxes
    pub max_iou_distance: f64,
    /// Largest accepted cosine distance between embeddings
    pub max_cosine_distance: f64,
    /// Weight of the motion term when appearance is available
    pub motion_weight: f64,
    /// Largest accepted squared Mahalanobis distance
    pub gating_threshold: f64,
}

impl CostParams {
    /// Cost of leaving a track or detection unmatched.
    ///
    /// Just above the largest feasible cost so every feasible pair is preferred.
    pub fn unmatched_cost(&self) -> f64 {
        self.max_iou_distance.max(self.max_cosine_distance) + 1e-5
    }
}

/// Compute IoU distance matrix between tracks and detections.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f64> {
    iou_batch(track_boxes, det_boxes).mapv(|iou| 1.0 - iou as f64)
}

/// Cosine distance between two embeddings; 1.0 when either is all zeros.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += x as f64 * y as f64;
        norm_a += x as f64 * x as f64;
        norm_b += y as f64 * y as f64;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Smallest cosine distance between an embedding and a track's gallery.
fn nearest_appearance(track: &Track, embedding: &[f32]) -> Option<f64> {
    track
        .features()
        .map(|f| cosine_distance(f, embedding))
        .min_by(f64::total_cmp)
}

/// Gated association cost for every predicted track and detection.
///
/// Pairs outside the Mahalanobis gate, above `max_iou_distance`, or (when
/// both sides carry embeddings) above `max_cosine_distance` are `INFEASIBLE`.
pub fn gated_cost_matrix(
    tracks: &[Track],
    detections: &[Detection],
    kalman_filter: &KalmanFilter,
    params: &CostParams,
) -> Array2<f64> {
    let track_rects: Vec<Rect> = tracks.iter().map(Track::rect).collect();
    let det_rects: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
    let mut cost = iou_distance(&track_rects, &det_rects);

    for (i, track) in tracks.iter().enumerate() {
        for (j, det) in detections.iter().enumerate() {
            let motion = cost[[i, j]];
            let gated = track
                .gating_distance(kalman_filter, &det.bbox)
                .is_none_or(|d| d > params.gating_threshold);
            if gated || motion > params.max_iou_distance {
                cost[[i, j]] = INFEASIBLE;
                continue;
            }

            let appearance = det
                .embedding
                .as_deref()
                .and_then(|e| nearest_appearance(track, e));
            cost[[i, j]] = match appearance {
                Some(a) if a > params.max_cosine_distance => INFEASIBLE,
                Some(a) => params.motion_weight * motion + (1.0 - params.motion_weight) * a,
                None => motion,
            };
        }
    }
    cost
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Optimal assignment over the feasible entries of `cost_matrix`.
pub fn linear_assignment(cost_matrix: &Array2<f64>, unmatched_cost: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    let row_to_col = min_cost_matching(cost_matrix, unmatched_cost);

    let mut matches = Vec::new();
    let mut unmatched_tracks = Vec::new();
    let mut unmatched_detections_mask = vec![true; num_cols];

    for (row, col) in row_to_col.into_iter().enumerate().take(num_rows) {
        match col {
            Some(col) => {
                matches.push((row, col));
                unmatched_detections_mask[col] = false;
            }
            None => unmatched_tracks.push(row),
        }
    }

    let unmatched_detections = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| u.then_some(i))
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::track::Lifecycle;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn params() -> CostParams {
        CostParams {
            max_iou_distance: 0.7,
            max_cosine_distance: 0.2,
            motion_weight: 0.0,
            gating_threshold: crate::tracker::kalman_filter::CHI2INV95_4DOF,
        }
    }

    fn track(det: &Detection) -> Track {
        let lifecycle = Lifecycle {
            n_init: 3,
            max_age: 30,
            nn_budget: 10,
        };
        Track::new(1, det, &KalmanFilter::new(), lifecycle)
    }

    #[test]
    fn test_cosine_distance() {
        assert_relative_eq!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_relative_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 1.0]), 1.0);
        assert_relative_eq!(cosine_distance(&[0.0, 0.0], &[0.0, 1.0]), 1.0);
    }

    #[test]
    fn test_motion_cost_and_gate() {
        let kf = KalmanFilter::new();
        let seed = Detection::new(100.0, 100.0, 150.0, 200.0, 0.9);
        let tracks = vec![track(&seed)];
        let dets = vec![
            Detection::new(102.0, 101.0, 152.0, 201.0, 0.9),
            Detection::new(600.0, 600.0, 650.0, 700.0, 0.9),
        ];
        let cost = gated_cost_matrix(&tracks, &dets, &kf, &params());
        assert!(cost[[0, 0]].is_finite() && cost[[0, 0]] < 0.2);
        assert_eq!(cost[[0, 1]], INFEASIBLE);
    }

    #[test]
    fn test_appearance_cost() {
        let kf = KalmanFilter::new();
        let seed = Detection::new(100.0, 100.0, 150.0, 200.0, 0.9).with_embedding(vec![1.0, 0.0]);
        let tracks = vec![track(&seed)];
        let dets = vec![
            Detection::new(100.0, 100.0, 150.0, 200.0, 0.9).with_embedding(vec![1.0, 0.05]),
            Detection::new(100.0, 100.0, 150.0, 200.0, 0.9).with_embedding(vec![0.0, 1.0]),
        ];
        let cost = gated_cost_matrix(&tracks, &dets, &kf, &params());
        assert!(cost[[0, 0]] < 0.01);
        assert_eq!(cost[[0, 1]], INFEASIBLE);
    }

    #[test]
    fn test_linear_assignment_partitions() {
        let cost = array![[0.1, INFEASIBLE, 0.6], [INFEASIBLE, INFEASIBLE, INFEASIBLE]];
        let result = linear_assignment(&cost, 0.7);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_tracks, vec![1]);
        assert_eq!(result.unmatched_detections, vec![1, 2]);
    }
}
