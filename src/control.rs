// ================================
// src/control.rs - PID, steering and speed control
// ================================
use crate::config::{Config, PidGains, Side};

/// PID on the wall distance error.
///
/// The integral term only covers errors from earlier calls and the derivative
/// needs a previous error, so the first correction after construction or
/// [`reset`](Self::reset) is purely proportional. No output limits are applied here.
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    integral: f32,
    previous_error: Option<f32>,
}

impl PidController {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            previous_error: None,
        }
    }

    pub fn update_and_get_correction(&mut self, error: f32, dt: f32) -> f32 {
        let derivative = match self.previous_error {
            Some(previous) if dt > 0.0 => (error - previous) / dt,
            _ => 0.0,
        };

        let correction =
            self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative;

        if dt > 0.0 {
            self.integral += error * dt;
        }
        self.previous_error = Some(error);

        correction
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = None;
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn previous_error(&self) -> Option<f32> {
        self.previous_error
    }
}

/// Turns a PID correction into a steering angle for the configured side.
pub struct SteeringController {
    side: Side,
    max_steering_angle: f32,
}

impl SteeringController {
    pub fn new(config: &Config) -> Self {
        Self {
            side: config.side,
            max_steering_angle: config.max_steering_angle,
        }
    }

    /// `atan(sign * correction)` with the correction read as degrees, clamped to
    /// `±max_steering_angle`. Positive turns right. Non-finite input steers straight.
    pub fn steering_angle(&self, correction: f32) -> f32 {
        let angle = (self.side.sign() * correction.to_radians()).atan();
        if !angle.is_finite() {
            return 0.0;
        }
        angle.clamp(-self.max_steering_angle, self.max_steering_angle)
    }
}

// Speed control
pub struct SpeedController {
    min_speed: f32,
    max_speed: f32,
}

impl SpeedController {
    pub fn new(config: &Config) -> Self {
        Self {
            min_speed: config.min_speed,
            max_speed: config.max_speed,
        }
    }

    /// Slows down linearly with the steering angle, always within `[min_speed, max_speed]`.
    pub fn velocity(&self, steering_angle: f32) -> f32 {
        let velocity = self.max_speed * (1.0 - steering_angle.abs());
        if !velocity.is_finite() {
            return self.min_speed;
        }
        velocity.clamp(self.min_speed, self.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 0.025;

    fn gains() -> PidGains {
        PidGains {
            kp: 3.0,
            ki: 0.2,
            kd: 0.02,
        }
    }

    #[test]
    fn first_correction_is_proportional_only() {
        let mut pid = PidController::new(gains());
        assert_relative_eq!(pid.update_and_get_correction(0.5, DT), 1.5);
        assert_relative_eq!(pid.integral(), 0.5 * DT);
        assert_eq!(pid.previous_error(), Some(0.5));
    }

    #[test]
    fn later_corrections_add_integral_and_derivative() {
        let mut pid = PidController::new(gains());
        pid.update_and_get_correction(0.5, DT);

        let correction = pid.update_and_get_correction(0.3, DT);
        let expected = 3.0 * 0.3 + 0.2 * (0.5 * DT) + 0.02 * (0.3 - 0.5) / DT;
        assert_relative_eq!(correction, expected, epsilon = 1e-6);
    }

    #[test]
    fn identical_inputs_give_identical_outputs() {
        let errors = [0.4, -0.1, 0.25, 0.0, -0.6, 0.05];
        let mut a = PidController::new(gains());
        let mut b = PidController::new(gains());

        let out_a: Vec<f32> = errors
            .iter()
            .map(|&e| a.update_and_get_correction(e, DT))
            .collect();
        let out_b: Vec<f32> = errors
            .iter()
            .map(|&e| b.update_and_get_correction(e, DT))
            .collect();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn reset_forgets_history() {
        let mut pid = PidController::new(gains());
        pid.update_and_get_correction(1.0, DT);
        pid.update_and_get_correction(1.0, DT);
        pid.reset();

        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.previous_error(), None);
        assert_relative_eq!(pid.update_and_get_correction(0.2, DT), 0.6);
    }

    #[test]
    fn zero_dt_skips_integral_and_derivative() {
        let mut pid = PidController::new(gains());
        pid.update_and_get_correction(1.0, 0.0);
        let correction = pid.update_and_get_correction(2.0, 0.0);
        assert_relative_eq!(correction, 6.0);
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn steering_follows_side_sign() {
        let right = SteeringController::new(&Config::default());
        let left = SteeringController::new(&Config {
            side: Side::Left,
            ..Config::default()
        });

        assert!(right.steering_angle(10.0) < 0.0);
        assert!(left.steering_angle(10.0) > 0.0);
        assert_relative_eq!(left.steering_angle(10.0), -right.steering_angle(10.0));
        assert_relative_eq!(left.steering_angle(10.0), 10f32.to_radians().atan());
    }

    #[test]
    fn steering_is_clamped_and_finite() {
        let config = Config::default();
        let steering = SteeringController::new(&config);

        assert_eq!(steering.steering_angle(1e9), -config.max_steering_angle);
        assert_eq!(steering.steering_angle(-1e9), config.max_steering_angle);
        assert_eq!(steering.steering_angle(f32::NAN), 0.0);
    }

    #[test]
    fn speed_drops_with_steering() {
        let config = Config::default();
        let speed = SpeedController::new(&config);

        assert_relative_eq!(speed.velocity(0.0), config.max_speed);
        assert!(speed.velocity(0.1) < config.max_speed);
        assert_relative_eq!(speed.velocity(0.9), config.min_speed);
        assert_relative_eq!(speed.velocity(-0.9), config.min_speed);
        assert_relative_eq!(speed.velocity(f32::NAN), config.min_speed);
    }
}
