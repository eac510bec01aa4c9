use glam::Vec2;
use nalgebra as na;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::RangePoint;

/// Maps a 3D point in the lidar frame to a pixel.
pub trait PointProjector
where
    Self: Sync,
{
    /// Returns `None` when the point does not land in front of the camera.
    fn project_one(&self, pt: &na::Vector3<f64>) -> Option<Vec2>;

    fn project(&self, points: &[RangePoint]) -> Vec<Option<Vec2>> {
        points
            .par_iter()
            .map(|p| self.project_one(&na::Vector3::new(p.x, p.y, p.z)))
            .collect()
    }

    /// Projects every point, or `None` if any of them fails. Output indices
    /// match input indices.
    fn project_all(&self, points: &[RangePoint]) -> Option<Vec<Vec2>> {
        self.project(points).into_iter().collect()
    }
}

/// Composed lidar-to-pixel transform `P_rect * R_rect * RT`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionTransform {
    composed: na::Matrix3x4<f64>,
}

impl ProjectionTransform {
    pub fn new(
        p_rect: &na::Matrix3x4<f64>,
        r_rect: &na::Matrix4<f64>,
        rt: &na::Matrix4<f64>,
    ) -> ProjectionTransform {
        ProjectionTransform {
            composed: p_rect * r_rect * rt,
        }
    }

    pub fn from_matrix(composed: na::Matrix3x4<f64>) -> ProjectionTransform {
        ProjectionTransform { composed }
    }
}

impl PointProjector for ProjectionTransform {
    fn project_one(&self, pt: &na::Vector3<f64>) -> Option<Vec2> {
        let y = self.composed * pt.push(1.0);
        let w = y[2];
        if w <= f64::EPSILON {
            return None;
        }
        Some(Vec2::new((y[0] / w) as f32, (y[1] / w) as f32))
    }
}

/// Row-major calibration matrices as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calibration {
    pub p_rect: [[f64; 4]; 3],
    pub r_rect: [[f64; 4]; 4],
    pub rt: [[f64; 4]; 4],
}

impl Calibration {
    pub fn to_transform(&self) -> ProjectionTransform {
        let p_rect = na::Matrix3x4::from_fn(|r, c| self.p_rect[r][c]);
        let r_rect = na::Matrix4::from_fn(|r, c| self.r_rect[r][c]);
        let rt = na::Matrix4::from_fn(|r, c| self.rt[r][c]);
        ProjectionTransform::new(&p_rect, &r_rect, &rt)
    }

    /// Identity rectification with a lidar mounted `height` above the camera
    /// axis, looking along x. Used by the synthetic scene generator.
    pub fn forward_pinhole(fx: f64, fy: f64, cx: f64, cy: f64, height: f64) -> Calibration {
        Calibration {
            p_rect: [[fx, 0.0, cx, 0.0], [0.0, fy, cy, 0.0], [0.0, 0.0, 1.0, 0.0]],
            r_rect: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            // lidar (x fwd, y left, z up) -> camera (x right, y down, z fwd)
            rt: [
                [0.0, -1.0, 0.0, 0.0],
                [0.0, 0.0, -1.0, -height],
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}
