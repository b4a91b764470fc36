// ================================
// src/teleop.rs - keyboard remote control
// ================================
use crate::config::TeleopConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleopKey {
    Faster,
    Slower,
    Left,
    Right,
    /// Dead man's switch heartbeat.
    Heartbeat,
    Quit,
}

impl TeleopKey {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Self::Faster),
            's' => Some(Self::Slower),
            'a' => Some(Self::Left),
            'd' => Some(Self::Right),
            ' ' => Some(Self::Heartbeat),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }
}

/// What one teleop tick publishes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeleopOutput {
    pub speed: f64,
    /// Servo position in `[0, 1]`, 0.5 is straight.
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_ms: Option<i64>,
}

/// Speed and steering that ramp up while a key is held and decay back to zero.
pub struct KeyboardTeleop {
    config: TeleopConfig,
    speed: f64,
    angle: f64,
}

impl KeyboardTeleop {
    pub fn new(config: TeleopConfig) -> Self {
        Self {
            config,
            speed: 0.0,
            angle: 0.0,
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Steering in `[-limit, limit]`, negative is left.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Advances one tick. `key` is `None` when nothing was pressed.
    pub fn tick(&mut self, key: Option<TeleopKey>, now_ms: i64) -> TeleopOutput {
        let limit = self.config.limit;

        match key {
            Some(TeleopKey::Faster) => self.speed += self.config.speed_step,
            Some(TeleopKey::Slower) => self.speed -= self.config.speed_step,
            _ => self.speed = decay(self.speed, self.config.speed_decay),
        }
        self.speed = self.speed.clamp(-limit, limit);

        match key {
            Some(TeleopKey::Left) => self.angle -= self.config.angle_step,
            Some(TeleopKey::Right) => self.angle += self.config.angle_step,
            _ => self.angle = decay(self.angle, self.config.angle_decay),
        }
        self.angle = self.angle.clamp(-limit, limit);

        TeleopOutput {
            speed: self.speed,
            position: (self.angle / limit + 1.0) / 2.0,
            heartbeat_ms: (key == Some(TeleopKey::Heartbeat)).then_some(now_ms),
        }
    }
}

fn decay(value: f64, step: f64) -> f64 {
    if value.abs() > step {
        value - step.copysign(value)
    } else {
        0.0
    }
}
