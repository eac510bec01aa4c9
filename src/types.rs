use serde::{Deserialize, Serialize};

use crate::error::{FrameSide, FusionError, FusionResult};

/// Image-plane keypoint position in pixels.
pub type Keypoint = glam::Vec2;

/// A single lidar return in the vehicle frame (x forward, y left, z up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// reflectivity, normalized to [0, 1] by the sensor driver
    pub r: f64,
}

impl RangePoint {
    pub fn new(x: f64, y: f64, z: f64, r: f64) -> RangePoint {
        RangePoint { x, y, z, r }
    }

    pub fn distance_to(&self, other: &RangePoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Correspondence between a keypoint of the previous frame and one of the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureMatch {
    pub prev_idx: usize,
    pub curr_idx: usize,
}

impl FeatureMatch {
    pub fn new(prev_idx: usize, curr_idx: usize) -> FeatureMatch {
        FeatureMatch { prev_idx, curr_idx }
    }

    /// Looks up both endpoints, failing on an out-of-range index.
    pub fn resolve(
        &self,
        kpts_prev: &[Keypoint],
        kpts_curr: &[Keypoint],
    ) -> FusionResult<(Keypoint, Keypoint)> {
        let prev = kpts_prev.get(self.prev_idx).copied().ok_or(
            FusionError::KeypointIndexOutOfRange {
                side: FrameSide::Previous,
                index: self.prev_idx,
                len: kpts_prev.len(),
            },
        )?;
        let curr = kpts_curr.get(self.curr_idx).copied().ok_or(
            FusionError::KeypointIndexOutOfRange {
                side: FrameSide::Current,
                index: self.curr_idx,
                len: kpts_curr.len(),
            },
        )?;
        Ok((prev, curr))
    }
}

/// Pixel-space rectangle. Containment is half-open: `x <= px < x + width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Roi {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Roi {
        Roi {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Keypoint) -> bool {
        self.x <= p.x && p.x < self.x + self.width && self.y <= p.y && p.y < self.y + self.height
    }

    /// Shrinks the rectangle concentrically, moving each side inward by
    /// `shrink_factor / 2` of its own dimension.
    pub fn shrink(&self, shrink_factor: f32) -> Roi {
        Roi {
            x: self.x + shrink_factor * self.width / 2.0,
            y: self.y + shrink_factor * self.height / 2.0,
            width: self.width * (1.0 - shrink_factor),
            height: self.height * (1.0 - shrink_factor),
        }
    }
}
