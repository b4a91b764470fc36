// ================================
// src/follower.rs - per-scan wall following pipeline
// ================================
use crate::{
    config::Config,
    control::{PidController, SpeedController, SteeringController},
    lidar::{LaserScan, RangeSampler},
    wall::{WallEstimate, WallGeometryEstimator},
};
use tracing::{debug, info, warn};

/// Velocity and steering sent to the drive.
///
/// Positive steering turns right, the opposite of the scan angle convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    pub velocity: f32,
    pub steering_angle: f32,
}

impl DriveCommand {
    pub const STOP: Self = Self {
        velocity: 0.0,
        steering_angle: 0.0,
    };

    pub fn new(velocity: f32, steering_angle: f32) -> Self {
        Self {
            velocity,
            steering_angle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerState {
    Following,
    Stopped,
}

/// Keeps the vehicle at `target_wall_distance` from the configured wall.
///
/// Owns the only long-lived mutable state of the pipeline (PID history and
/// the last usable wall estimate). Starts in [`FollowerState::Following`].
pub struct WallFollower {
    config: Config,
    sampler: RangeSampler,
    estimator: WallGeometryEstimator,
    pid: PidController,
    steering: SteeringController,
    speed: SpeedController,
    state: FollowerState,
    last_estimate: Option<WallEstimate>,
}

impl WallFollower {
    pub fn new(config: Config) -> Self {
        Self {
            sampler: RangeSampler::new(config.clone()),
            estimator: WallGeometryEstimator::new(&config),
            pid: PidController::new(config.pid),
            steering: SteeringController::new(&config),
            speed: SpeedController::new(&config),
            state: FollowerState::Following,
            last_estimate: None,
            config,
        }
    }

    pub fn state(&self) -> FollowerState {
        self.state
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    /// Applies an emergency-stop update. Returns the stop command to send right
    /// away when this update is what stopped the vehicle.
    pub fn set_emergency_stop(&mut self, stopped: bool) -> Option<DriveCommand> {
        match (self.state, stopped) {
            (FollowerState::Following, true) => {
                info!("emergency stop engaged");
                self.state = FollowerState::Stopped;
                if self.config.reset_pid_on_stop {
                    self.pid.reset();
                }
                Some(DriveCommand::STOP)
            }
            (FollowerState::Stopped, false) => {
                info!("emergency stop released, following wall");
                self.state = FollowerState::Following;
                None
            }
            _ => None,
        }
    }

    /// Produces the drive command for one scan. Never fails.
    pub fn on_scan(&mut self, scan: &LaserScan) -> DriveCommand {
        match self.state {
            FollowerState::Stopped => DriveCommand::STOP,
            FollowerState::Following => self.follow_wall(scan),
        }
    }

    /// Samples both beams on the configured side and fits the wall.
    ///
    /// Degenerate beam pairs reuse the previous estimate, or assume the wall
    /// sits at the target distance if there never was one.
    pub fn estimate_wall(&mut self, scan: &LaserScan) -> WallEstimate {
        let sign = self.config.side.sign();
        let range1 = self.sampler.sample(scan, self.config.sample_angle_1_deg * sign);
        let range2 = self.sampler.sample(scan, self.config.sample_angle_2_deg * sign);

        match self.estimator.estimate(range1.value(), range2.value()) {
            Some(estimate) => {
                self.last_estimate = Some(estimate);
                estimate
            }
            None => {
                warn!(
                    range1 = range1.value(),
                    range2 = range2.value(),
                    "degenerate wall geometry, reusing previous estimate"
                );
                self.last_estimate
                    .unwrap_or_else(|| WallEstimate::parallel(self.config.target_wall_distance))
            }
        }
    }

    fn follow_wall(&mut self, scan: &LaserScan) -> DriveCommand {
        let wall = self.estimate_wall(scan);

        let error = self.config.target_wall_distance - wall.predicted_distance;
        let correction = self
            .pid
            .update_and_get_correction(error, self.config.time_between_scans);

        let steering_angle = self.steering.steering_angle(correction);
        let velocity = self.speed.velocity(steering_angle);

        debug!(
            wall_angle = wall.wall_angle,
            current = wall.current_distance,
            predicted = wall.predicted_distance,
            error,
            correction,
            steering_angle,
            velocity,
            "wall following"
        );

        DriveCommand::new(velocity, steering_angle)
    }
}
