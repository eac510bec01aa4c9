use serde::{Deserialize, Serialize};

use crate::error::{FusionError, FusionResult};

/// Parameters of the range cluster filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LidarConfig {
    pub cluster_tolerance: f64,
    pub min_cluster_size: usize,
    pub min_reflectivity: f64,
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            cluster_tolerance: 0.2,
            min_cluster_size: 5,
            min_reflectivity: 0.1,
        }
    }
}

/// Region of interest applied to the raw lidar scan before it is
/// associated with any bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub min_x: f64,
    pub max_x: f64,
    pub max_abs_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub min_reflectivity: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        // ego lane, road surface removed
        Self {
            min_x: 0.0,
            max_x: 20.0,
            max_abs_y: 2.0,
            min_z: -1.5,
            max_z: -0.9,
            min_reflectivity: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub shrink_factor: f32,
    pub frame_rate: f64,
    /// minimum pixel distance between two keypoints for their ratio to count
    pub min_pair_distance: f64,
    pub ttc_ceiling: f64,
    pub closing_epsilon: f64,
    pub lidar: LidarConfig,
    pub crop: Option<CropConfig>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            shrink_factor: 0.10,
            frame_rate: 10.0,
            min_pair_distance: 100.0,
            ttc_ceiling: 99.99,
            closing_epsilon: 1e-4,
            lidar: LidarConfig::default(),
            crop: None,
        }
    }
}

impl FusionConfig {
    pub fn dt(&self) -> f64 {
        1.0 / self.frame_rate
    }

    pub fn validate(&self) -> FusionResult<()> {
        if !(0.0..1.0).contains(&self.shrink_factor) {
            return Err(FusionError::InvalidConfig(format!(
                "shrink_factor must be in [0, 1), got {}",
                self.shrink_factor
            )));
        }
        if !(self.frame_rate > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if !(self.ttc_ceiling > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "ttc_ceiling must be positive, got {}",
                self.ttc_ceiling
            )));
        }
        if !(self.lidar.cluster_tolerance > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "cluster_tolerance must be positive, got {}",
                self.lidar.cluster_tolerance
            )));
        }
        if self.lidar.min_cluster_size < 1 {
            return Err(FusionError::InvalidConfig(
                "min_cluster_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
