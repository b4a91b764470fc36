// ================================
// src/wall.rs - wall line estimation from two beams
// ================================
use crate::config::{Config, MIN_WINDOW_SINE};

/// Where the wall is relative to the vehicle, in the frame of one scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallEstimate {
    /// Angle between the wall line and the vehicle heading, radians.
    pub wall_angle: f32,
    pub current_distance: f32,
    /// Distance expected after driving `prediction_distance` meters straight ahead.
    pub predicted_distance: f32,
}

impl WallEstimate {
    /// A wall parallel to the heading at exactly `distance`.
    pub fn parallel(distance: f32) -> Self {
        Self {
            wall_angle: 0.0,
            current_distance: distance,
            predicted_distance: distance,
        }
    }

    fn is_finite(&self) -> bool {
        self.wall_angle.is_finite()
            && self.current_distance.is_finite()
            && self.predicted_distance.is_finite()
    }
}

/// Fits a straight wall through two beams `sample_window_deg` apart.
///
/// `range1` is the beam further ahead, `range2` the one closer to perpendicular.
/// The math is the same on both sides; side selection only changes which beams
/// are sampled.
pub struct WallGeometryEstimator {
    window_cos: f32,
    window_sin: f32,
    prediction_distance: f32,
}

impl WallGeometryEstimator {
    pub fn new(config: &Config) -> Self {
        let window = config.sample_window_rad();
        Self {
            window_cos: window.cos(),
            window_sin: window.sin(),
            prediction_distance: config.prediction_distance,
        }
    }

    /// Returns `None` when the two beams do not define a usable wall line.
    pub fn estimate(&self, range1: f32, range2: f32) -> Option<WallEstimate> {
        let denominator = range1 * self.window_sin;
        if !denominator.is_finite() || denominator.abs() < MIN_WINDOW_SINE {
            return None;
        }

        let wall_angle = ((range1 * self.window_cos - range2) / denominator).atan();
        let current_distance = range2 * wall_angle.cos();
        let predicted_distance = current_distance + self.prediction_distance * wall_angle.sin();

        let estimate = WallEstimate {
            wall_angle,
            current_distance,
            predicted_distance,
        };
        estimate.is_finite().then_some(estimate)
    }
}
