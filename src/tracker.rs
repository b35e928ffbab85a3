mod assignment;
mod identity_tracker;
mod kalman_filter;
mod matching;
mod rect;
mod track;
mod track_state;

pub use assignment::min_cost_matching;
pub use identity_tracker::{IdentityTracker, TrackerConfig};
pub use kalman_filter::{CHI2INV95_4DOF, KalmanFilter};
pub use matching::{AssignmentResult, CostParams, INFEASIBLE, cosine_distance, linear_assignment};
pub use rect::{Rect, iou_batch};
pub use track::{Track, TrackedObject};
pub use track_state::TrackState;
