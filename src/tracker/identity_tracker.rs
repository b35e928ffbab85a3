//! Frame-by-frame data association producing persistent identities.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::Detection;
use crate::tracker::kalman_filter::{CHI2INV95_4DOF, KalmanFilter};
use crate::tracker::matching::{self, AssignmentResult, CostParams};
use crate::tracker::track::{Lifecycle, Track, TrackedObject};
use crate::tracker::track_state::TrackState;

/// Configuration for the IdentityTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Consecutive matches needed to confirm a track
    pub n_init: u32,
    /// Missed frames a confirmed track survives
    pub max_age: u32,
    pub max_iou_distance: f64,
    pub max_cosine_distance: f64,
    /// Weight of the motion cost when embeddings are present (0 = appearance only)
    pub motion_weight: f64,
    /// Squared Mahalanobis gate
    pub gating_threshold: f64,
    /// Embeddings kept per track
    pub nn_budget: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            n_init: 3,
            max_age: 1800,
            max_iou_distance: 0.7,
            max_cosine_distance: 0.2,
            motion_weight: 0.0,
            gating_threshold: CHI2INV95_4DOF,
            nn_budget: 100,
        }
    }
}

impl TrackerConfig {
    fn cost_params(&self) -> CostParams {
        CostParams {
            max_iou_distance: self.max_iou_distance,
            max_cosine_distance: self.max_cosine_distance,
            motion_weight: self.motion_weight,
            gating_threshold: self.gating_threshold,
        }
    }

    fn lifecycle(&self) -> Lifecycle {
        Lifecycle {
            n_init: self.n_init,
            max_age: self.max_age,
            nn_budget: self.nn_budget,
        }
    }
}

pub struct IdentityTracker {
    tracks: Vec<Track>,
    next_id: u64,
    frame_id: u64,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
}

impl IdentityTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
            frame_id: 0,
            config,
            kalman_filter: KalmanFilter::default(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of frames processed so far.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Live tracks in creation order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Associate this frame's detections with existing tracks.
    ///
    /// Returns every live track paired with the index of the detection it was
    /// associated with, ordered by that detection's confidence (descending);
    /// tracks without a detection this frame come last, by id. With no
    /// detections, all tracks are aged and nothing is returned.
    pub fn update(&mut self, detections: &[Detection]) -> Vec<TrackedObject> {
        self.frame_id += 1;

        // Step 1: Predict
        for track in &mut self.tracks {
            track.predict(&self.kalman_filter);
        }

        if detections.is_empty() {
            for track in &mut self.tracks {
                track.mark_missed();
            }
            self.prune();
            return Vec::new();
        }

        // Step 2: Gated costs and optimal assignment
        let params = self.config.cost_params();
        let cost =
            matching::gated_cost_matrix(&self.tracks, detections, &self.kalman_filter, &params);
        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::linear_assignment(&cost, params.unmatched_cost());

        // Step 3: Update matched, age unmatched, seed new tracks
        let mut associated: Vec<Option<usize>> = vec![None; self.tracks.len()];
        for (itrack, idet) in matches {
            let track = &mut self.tracks[itrack];
            let was_confirmed = track.is_confirmed();
            track.update(&detections[idet], &self.kalman_filter);
            if !was_confirmed && track.is_confirmed() {
                debug!(track_id = track.track_id, frame = self.frame_id, "track confirmed");
            }
            associated[itrack] = Some(idet);
        }

        for itrack in unmatched_tracks {
            self.tracks[itrack].mark_missed();
        }

        let lifecycle = self.config.lifecycle();
        for idet in unmatched_detections {
            let track_id = self.next_id;
            self.next_id += 1;
            debug!(track_id, frame = self.frame_id, "track started");
            self.tracks
                .push(Track::new(track_id, &detections[idet], &self.kalman_filter, lifecycle));
            associated.push(Some(idet));
        }

        // Step 4: Drop deleted tracks and publish snapshots
        let mut output: Vec<TrackedObject> = self
            .tracks
            .iter()
            .zip(associated)
            .filter(|(t, _)| !t.is_deleted())
            .map(|(t, det)| t.snapshot(det))
            .collect();
        self.prune();

        output.sort_by(|a, b| order_by_detection(a, b, detections));
        output
    }

    fn prune(&mut self) {
        let frame_id = self.frame_id;
        self.tracks.retain(|t| {
            if t.state == TrackState::Deleted {
                debug!(track_id = t.track_id, frame = frame_id, "track deleted");
                false
            } else {
                true
            }
        });
    }
}

/// Detection confidence descending, then detection index; unassociated last by id.
fn order_by_detection(a: &TrackedObject, b: &TrackedObject, detections: &[Detection]) -> Ordering {
    match (a.detection, b.detection) {
        (Some(da), Some(db)) => detections[db]
            .score
            .total_cmp(&detections[da].score)
            .then(da.cmp(&db)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.track_id.cmp(&b.track_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x: f32, score: f32) -> Detection {
        Detection::new(x, 100.0, x + 50.0, 200.0, score)
    }

    #[test]
    fn test_ids_start_at_one() {
        let mut tracker = IdentityTracker::new(TrackerConfig::default());
        let out = tracker.update(&[det(100.0, 0.9), det(400.0, 0.8)]);
        let ids: Vec<u64> = out.iter().map(|t| t.track_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(out.iter().all(|t| t.state == TrackState::Tentative));
    }

    #[test]
    fn test_output_follows_confidence_order() {
        let mut tracker = IdentityTracker::new(TrackerConfig::default());
        // Low-confidence detection comes first in the input.
        let out = tracker.update(&[det(100.0, 0.3), det(400.0, 0.9)]);
        assert_eq!(out[0].detection, Some(1));
        assert_eq!(out[1].detection, Some(0));
    }

    #[test]
    fn test_unmatched_tracks_listed_last() {
        let config = TrackerConfig {
            n_init: 1,
            ..TrackerConfig::default()
        };
        let mut tracker = IdentityTracker::new(config);
        tracker.update(&[det(100.0, 0.9), det(400.0, 0.9)]);
        let out = tracker.update(&[det(401.0, 0.9)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].track_id, 2);
        assert_eq!(out[0].detection, Some(0));
        assert_eq!(out[1].track_id, 1);
        assert_eq!(out[1].detection, None);
        assert_eq!(out[1].state, TrackState::Lost);
    }

    #[test]
    fn test_empty_frame_ages_tracks() {
        let mut tracker = IdentityTracker::new(TrackerConfig::default());
        tracker.update(&[det(100.0, 0.9)]);
        let out = tracker.update(&[]);
        assert!(out.is_empty());
        // Tentative track missed a frame.
        assert!(tracker.tracks().is_empty());
        assert_eq!(tracker.frame_id(), 2);
    }
}
