#![allow(dead_code)]

use camera_lidar_ttc::projection::PointProjector;
use glam::Vec2;
use nalgebra as na;

/// Maps lateral/height offsets straight to pixels, 100 px per meter around (500, 300).
pub struct LateralProjector;

impl PointProjector for LateralProjector {
    fn project_one(&self, pt: &na::Vector3<f64>) -> Option<Vec2> {
        if pt.x <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            (500.0 - 100.0 * pt.y) as f32,
            (300.0 - 100.0 * pt.z) as f32,
        ))
    }
}

/// Square of keypoints `spacing` pixels apart, scaled by `scale` around `center`.
pub fn keypoint_grid(center: Vec2, spacing: f32, n: usize, scale: f32) -> Vec<Vec2> {
    let half = (n as f32 - 1.0) / 2.0;
    let mut kpts = Vec::new();
    for r in 0..n {
        for c in 0..n {
            let offset = Vec2::new(c as f32 - half, r as f32 - half) * spacing;
            kpts.push(center + offset * scale);
        }
    }
    kpts
}
