// ================================
// src/config.rs - all constants and settings
// ================================
use crate::error::ConfigError;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Config file used when `CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "./wall_following.toml";

/// Below this magnitude `sin(window)` is treated as zero.
pub const MIN_WINDOW_SINE: f32 = 1e-6;

/// Which wall the vehicle keeps beside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Scan angles grow counter-clockwise, so the right wall lives at negative angles.
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 3.0,
            ki: 0.2,
            kd: 0.02,
        }
    }
}

/// Keyboard teleoperation tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TeleopConfig {
    pub speed_step: f64,
    pub speed_decay: f64,
    pub angle_step: f64,
    pub angle_decay: f64,
    /// Speed and angle are both kept inside `[-limit, limit]`.
    pub limit: f64,
    pub poll_interval_ms: u64,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            speed_step: 0.2,
            speed_decay: 0.1,
            angle_step: 0.2,
            angle_decay: 0.1,
            limit: 1.0,
            poll_interval_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    // LiDAR
    pub min_range: f32,
    pub max_range: f32,
    pub fallback_range: f32,
    pub sample_count: usize,

    // Wall geometry
    pub side: Side,
    pub sample_angle_1_deg: f32,
    pub sample_angle_2_deg: f32,
    pub sample_window_deg: f32,
    pub prediction_distance: f32,
    pub target_wall_distance: f32,

    // Control
    pub min_speed: f32,
    pub max_speed: f32,
    pub max_steering_angle: f32,
    pub pid: PidGains,
    /// Nominal scan period in seconds, used as the PID time step.
    pub time_between_scans: f32,
    pub reset_pid_on_stop: bool,

    pub teleop: TeleopConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_range: 0.2,
            max_range: 30.0,
            fallback_range: 4.0,
            sample_count: 1080,
            side: Side::Right,
            sample_angle_1_deg: 60.0,
            sample_angle_2_deg: 90.0,
            sample_window_deg: 30.0,
            prediction_distance: 2.0,
            target_wall_distance: 0.6,
            min_speed: 0.2,
            max_speed: 0.25,
            max_steering_angle: 1.0,
            pid: PidGains::default(),
            time_between_scans: 0.025,
            reset_pid_on_stop: false,
            teleop: TeleopConfig::default(),
        }
    }
}

impl Config {
    /// Load from `CONFIG_PATH` (or [`DEFAULT_CONFIG_PATH`]), falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!(path = %path.display(), side = ?config.side, "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn sample_window_rad(&self) -> f32 {
        self.sample_window_deg.to_radians()
    }

    /// Rejects values that would make the controller emit nonsense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_range >= 0.0 && self.min_range < self.max_range) {
            return Err(ConfigError::invalid(
                "min_range",
                format!(
                    "expected 0 <= min_range < max_range, got {} / {}",
                    self.min_range, self.max_range
                ),
            ));
        }
        if !(self.min_range..=self.max_range).contains(&self.fallback_range) {
            return Err(ConfigError::invalid(
                "fallback_range",
                format!(
                    "{} is outside [{}, {}]",
                    self.fallback_range, self.min_range, self.max_range
                ),
            ));
        }
        if self.sample_count == 0 {
            return Err(ConfigError::invalid("sample_count", "must be non-zero"));
        }
        if !(self.time_between_scans > 0.0) {
            return Err(ConfigError::invalid(
                "time_between_scans",
                format!("must be positive, got {}", self.time_between_scans),
            ));
        }
        if !(self.min_speed >= 0.0 && self.min_speed <= self.max_speed) {
            return Err(ConfigError::invalid(
                "min_speed",
                format!(
                    "expected 0 <= min_speed <= max_speed, got {} / {}",
                    self.min_speed, self.max_speed
                ),
            ));
        }
        if !(self.max_steering_angle > 0.0) {
            return Err(ConfigError::invalid(
                "max_steering_angle",
                format!("must be positive, got {}", self.max_steering_angle),
            ));
        }
        if self.sample_window_rad().sin().abs() < MIN_WINDOW_SINE {
            return Err(ConfigError::invalid(
                "sample_window_deg",
                format!("{} degrees gives a zero-width window", self.sample_window_deg),
            ));
        }
        let separation = (self.sample_angle_2_deg - self.sample_angle_1_deg).abs();
        if (separation - self.sample_window_deg).abs() > 1e-3 {
            return Err(ConfigError::invalid(
                "sample_window_deg",
                format!(
                    "sample angles {} and {} are {} degrees apart, window is {}",
                    self.sample_angle_1_deg,
                    self.sample_angle_2_deg,
                    separation,
                    self.sample_window_deg
                ),
            ));
        }
        if !(self.teleop.limit > 0.0) {
            return Err(ConfigError::invalid("teleop.limit", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.side, Side::Right);
        assert_eq!(config.side.sign(), -1.0);
        assert_eq!(Side::Left.sign(), 1.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            side = "left"
            target_wall_distance = 0.8

            [pid]
            kp = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.side, Side::Left);
        assert_eq!(config.target_wall_distance, 0.8);
        assert_eq!(config.pid.kp, 5.0);
        assert_eq!(config.pid.ki, PidGains::default().ki);
        assert_eq!(config.sample_count, 1080);
    }

    #[test]
    fn rejects_mismatched_window() {
        let err = Config::from_toml_str("sample_window_deg = 20.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "sample_window_deg",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_window() {
        let config = Config {
            sample_angle_1_deg: 90.0,
            sample_angle_2_deg: 90.0,
            sample_window_deg: 0.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_speed_bounds() {
        let config = Config {
            min_speed: 1.0,
            max_speed: 0.5,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "min_speed",
                ..
            })
        ));
    }

    #[test]
    fn rejects_fallback_outside_valid_range() {
        let config = Config {
            fallback_range: 50.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("wall_following.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load_from(Path::new("/nonexistent/wall_following.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn unknown_side_is_a_parse_error() {
        let err = Config::from_toml_str(r#"side = "up""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
