// ================================
// src/lib.rs
// ================================
pub mod config;
pub mod control;
pub mod error;
pub mod follower;
pub mod lidar;
pub mod node;
pub mod teleop;
pub mod transport;
pub mod wall;

pub use config::{Config, Side};
pub use error::ConfigError;
pub use follower::{DriveCommand, FollowerState, WallFollower};
pub use lidar::LaserScan;
pub use node::WallFollowingNode;
