// ================================
// src/lidar.rs - LiDAR scan and range sampling
// ================================
use crate::config::Config;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One sweep of a planar range sensor.
///
/// `ranges[0]` is measured at `angle_min`, the last sample at `angle_max`.
/// Angles are in radians, counter-clockwise positive, zero straight ahead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    pub angle_min: f32,
    pub angle_max: f32,
    pub ranges: Vec<f32>,
}

impl LaserScan {
    pub fn new(angle_min: f32, angle_max: f32, ranges: Vec<f32>) -> Self {
        Self {
            angle_min,
            angle_max,
            ranges,
        }
    }

    /// A scan where every beam reads the same distance.
    pub fn uniform(angle_min: f32, angle_max: f32, count: usize, range: f32) -> Self {
        Self::new(angle_min, angle_max, vec![range; count])
    }
}

/// A distance read from a scan, or the configured stand-in when the beam was unusable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampledRange {
    Measured(f32),
    Fallback(f32),
}

impl SampledRange {
    pub fn value(self) -> f32 {
        match self {
            SampledRange::Measured(range) | SampledRange::Fallback(range) => range,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, SampledRange::Fallback(_))
    }
}

/// Picks single beams out of a scan by angle.
pub struct RangeSampler {
    config: Config,
}

impl RangeSampler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the range at `angle_deg` (degrees, left positive), or the fallback
    /// range when the beam is outside the scan or its reading is not plausible.
    pub fn sample(&self, scan: &LaserScan, angle_deg: f32) -> SampledRange {
        let fallback = SampledRange::Fallback(self.config.fallback_range);

        let Some(index) = self.index_for_angle(scan, angle_deg) else {
            warn!(angle_deg, "could not sample lidar, using fallback value");
            return fallback;
        };

        match scan.ranges.get(index) {
            Some(&range) if self.is_valid_range(range) => SampledRange::Measured(range),
            _ => {
                warn!(angle_deg, index, "could not sample lidar, using fallback value");
                fallback
            }
        }
    }

    /// Maps an angle linearly from `[angle_min, angle_max]` onto `[0, sample_count)`.
    fn index_for_angle(&self, scan: &LaserScan, angle_deg: f32) -> Option<usize> {
        let span = scan.angle_max - scan.angle_min;
        if !(span.is_finite() && span > 0.0) {
            return None;
        }

        let sample_count = self.config.sample_count as f32;
        let position = sample_count * (angle_deg.to_radians() - scan.angle_min) / span;
        if !position.is_finite() {
            return None;
        }

        // Truncate toward zero, so anything in (-1, 0) still lands on beam 0.
        let index = position.trunc();
        if index < 0.0 || index >= sample_count {
            return None;
        }
        Some(index as usize)
    }

    fn is_valid_range(&self, range: f32) -> bool {
        range.is_finite() && range >= self.config.min_range && range <= self.config.max_range
    }
}
