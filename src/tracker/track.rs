//! Single tracked identity.

use std::collections::VecDeque;

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::detection::Detection;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Lifecycle parameters copied onto every track at creation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lifecycle {
    pub n_init: u32,
    pub max_age: u32,
    pub nn_budget: usize,
}

/// Persistent identity maintained by the tracker.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier
    pub track_id: u64,
    /// Current lifecycle state
    pub state: TrackState,
    /// Confidence of the last associated detection
    pub score: f32,
    /// Class of the last associated detection
    pub class_id: usize,
    /// Number of associated detections
    pub hits: u32,
    /// Frames since creation
    pub age: u32,
    /// Frames since the last association
    pub time_since_update: u32,
    /// Box of the last associated detection
    pub detection_rect: Rect,
    mean: Array1<f64>,
    covariance: Array2<f64>,
    features: VecDeque<Vec<f32>>,
    lifecycle: Lifecycle,
}

impl Track {
    pub(crate) fn new(
        track_id: u64,
        detection: &Detection,
        kalman_filter: &KalmanFilter,
        lifecycle: Lifecycle,
    ) -> Self {
        let (mean, covariance) = kalman_filter.initiate(detection.bbox.to_xyah());
        let state = if lifecycle.n_init <= 1 {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        };

        let mut features = VecDeque::new();
        if let Some(embedding) = &detection.embedding {
            features.push_back(embedding.clone());
        }

        Self {
            track_id,
            state,
            score: detection.score,
            class_id: detection.class_id,
            hits: 1,
            age: 1,
            time_since_update: 0,
            detection_rect: detection.bbox,
            mean,
            covariance,
            features,
            lifecycle,
        }
    }

    /// Current Kalman estimate of the box in TLWH format.
    pub fn rect(&self) -> Rect {
        Rect::from_xyah(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    pub fn is_tentative(&self) -> bool {
        self.state == TrackState::Tentative
    }

    /// Confirmed tracks stay confirmed while lost.
    pub fn is_confirmed(&self) -> bool {
        matches!(self.state, TrackState::Confirmed | TrackState::Lost)
    }

    pub fn is_deleted(&self) -> bool {
        self.state == TrackState::Deleted
    }

    /// Appearance gallery, oldest first.
    pub fn features(&self) -> impl Iterator<Item = &[f32]> {
        self.features.iter().map(Vec::as_slice)
    }

    /// Squared Mahalanobis distance from the predicted state to a box.
    pub fn gating_distance(&self, kalman_filter: &KalmanFilter, rect: &Rect) -> Option<f64> {
        kalman_filter.gating_distance(&self.mean, &self.covariance, rect.to_xyah())
    }

    /// Propagate the state one frame forward.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) {
        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.age += 1;
        self.time_since_update += 1;
    }

    /// Associate a detection with this track.
    pub fn update(&mut self, detection: &Detection, kalman_filter: &KalmanFilter) {
        let (mean, covariance) =
            kalman_filter.update(&self.mean, &self.covariance, detection.bbox.to_xyah());
        self.mean = mean;
        self.covariance = covariance;
        self.hits += 1;
        self.time_since_update = 0;
        self.score = detection.score;
        self.class_id = detection.class_id;
        self.detection_rect = detection.bbox;

        if let Some(embedding) = &detection.embedding {
            self.features.push_back(embedding.clone());
            while self.features.len() > self.lifecycle.nn_budget.max(1) {
                self.features.pop_front();
            }
        }

        match self.state {
            TrackState::Tentative if self.hits >= self.lifecycle.n_init => {
                self.state = TrackState::Confirmed;
            }
            TrackState::Lost => self.state = TrackState::Confirmed,
            _ => {}
        }
    }

    /// Record a frame without association.
    pub fn mark_missed(&mut self) {
        if self.state == TrackState::Tentative || self.time_since_update > self.lifecycle.max_age {
            self.state = TrackState::Deleted;
        } else if self.state == TrackState::Confirmed {
            self.state = TrackState::Lost;
        }
    }

    pub(crate) fn snapshot(&self, detection: Option<usize>) -> TrackedObject {
        TrackedObject {
            track_id: self.track_id,
            state: self.state,
            rect: self.rect(),
            detection_rect: self.detection_rect,
            score: self.score,
            time_since_update: self.time_since_update,
            detection,
        }
    }
}

/// Read-only view of a track handed out after each update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedObject {
    pub track_id: u64,
    pub state: TrackState,
    /// Kalman estimate of the box
    pub rect: Rect,
    /// Box of the last associated detection
    pub detection_rect: Rect,
    pub score: f32,
    pub time_since_update: u32,
    /// Index into this frame's detections, when associated this frame
    pub detection: Option<usize>,
}

impl TrackedObject {
    /// Label text shown next to a detection; blank while the track is stale.
    pub fn label(&self) -> String {
        if self.time_since_update == 0 {
            format!("ID: {}", self.track_id)
        } else {
            "ID:  ".to_string()
        }
    }
}
