//! Constant-velocity Kalman filter over (cx, cy, aspect, height) using ndarray,
//! with nalgebra for the 4x4 innovation inverse.

use ndarray::{Array1, Array2};

/// 0.95 quantile of the chi-square distribution with 4 degrees of freedom.
///
/// Squared Mahalanobis distances above this value are treated as implausible.
pub const CHI2INV95_4DOF: f64 = 9.4877;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    std_weight_position: f64,
    std_weight_velocity: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        // x' = x + v for each of the four measured quantities.
        let motion_mat = Array2::from_shape_fn((8, 8), |(i, j)| {
            if i == j || j == i + 4 { 1.0 } else { 0.0 }
        });
        let update_mat = Array2::from_shape_fn((4, 8), |(i, j)| if i == j { 1.0 } else { 0.0 });

        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
        }
    }

    /// Standard deviations of (cx, cy, a, h) scaled by box height.
    fn position_std(&self, height: f64, aspect_std: f64) -> [f64; 4] {
        let p = self.std_weight_position * height;
        [p, p, aspect_std, p]
    }

    fn velocity_std(&self, height: f64) -> [f64; 4] {
        let v = self.std_weight_velocity * height;
        [v, v, 1e-5, v]
    }

    /// Create a track state from an unassociated measurement.
    ///
    /// Velocities start at zero with a wide prior.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mean = Array1::from_iter(measurement.into_iter().chain([0.0; 4]));

        let h = measurement[3];
        let pos = self.position_std(h, 0.5e-2).map(|s| 2.0 * s);
        let mut vel = self.velocity_std(h).map(|s| 10.0 * s);
        vel[2] = 1e-5;
        let covariance = variance_diag(pos.into_iter().chain(vel));

        (mean, covariance)
    }

    /// Propagate the state one frame forward.
    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3];
        let motion_noise = variance_diag(
            self.position_std(h, 1e-2)
                .into_iter()
                .chain(self.velocity_std(h)),
        );

        let mean = self.motion_mat.dot(mean);
        let covariance = self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + motion_noise;
        (mean, covariance)
    }

    /// Project the state distribution into measurement space.
    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let measurement_noise = variance_diag(self.position_std(mean[3], 1e-1));
        let mean = self.update_mat.dot(mean);
        let covariance =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + measurement_noise;
        (mean, covariance)
    }

    /// Correct the state with a measurement.
    ///
    /// A singular innovation covariance leaves the state untouched.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> (Array1<f64>, Array2<f64>) {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let Some(s_inv) = invert_4x4(&projected_cov) else {
            return (mean.clone(), covariance.clone());
        };

        let innovation = Array1::from(measurement.to_vec()) - projected_mean;
        // K = P H^T S^-1
        let gain = covariance.dot(&self.update_mat.t()).dot(&s_inv);

        let mean = mean + gain.dot(&innovation);
        let covariance = covariance - gain.dot(&projected_cov).dot(&gain.t());
        (mean, covariance)
    }

    /// Squared Mahalanobis distance between the state distribution and a measurement.
    ///
    /// Returns `None` when the projected covariance cannot be inverted.
    pub fn gating_distance(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Option<f64> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let s_inv = invert_4x4(&projected_cov)?;
        let d = Array1::from(measurement.to_vec()) - projected_mean;
        Some(d.dot(&s_inv.dot(&d)))
    }
}

/// Diagonal covariance from standard deviations.
fn variance_diag(std: impl IntoIterator<Item = f64>) -> Array2<f64> {
    let variances = Array1::from_iter(std.into_iter().map(|s| s * s));
    Array2::from_diag(&variances)
}

fn invert_4x4(m: &Array2<f64>) -> Option<Array2<f64>> {
    let inv = nalgebra::Matrix4::from_fn(|i, j| m[[i, j]]).try_inverse()?;
    Some(Array2::from_shape_fn((4, 4), |(i, j)| inv[(i, j)]))
}
