use log::trace;

use crate::config::CropConfig;
use crate::error::FusionResult;
use crate::frame::BoundingBox;
use crate::projection::PointProjector;
use crate::types::{FeatureMatch, Keypoint, RangePoint};

/// Drops lidar returns outside the crop volume or below its reflectivity floor.
pub fn crop_range_points(points: &[RangePoint], crop: &CropConfig) -> Vec<RangePoint> {
    points
        .iter()
        .filter(|p| {
            p.x >= crop.min_x
                && p.x <= crop.max_x
                && p.y.abs() <= crop.max_abs_y
                && p.z >= crop.min_z
                && p.z <= crop.max_z
                && p.r >= crop.min_reflectivity
        })
        .copied()
        .collect()
}

/// Appends every range point to the one box whose shrunk ROI encloses its
/// projection. Points enclosed by zero or several boxes are dropped.
///
/// Returns the number of points assigned.
pub fn cluster_range_points_with_roi<P: PointProjector + ?Sized>(
    bounding_boxes: &mut [BoundingBox],
    range_points: &[RangePoint],
    shrink_factor: f32,
    projector: &P,
) -> usize {
    let shrunk: Vec<_> = bounding_boxes
        .iter()
        .map(|b| b.roi.shrink(shrink_factor))
        .collect();
    let projected = projector.project(range_points);

    let mut assigned = 0;
    for (pt, px) in range_points.iter().zip(projected) {
        let Some(px) = px else {
            continue;
        };
        let mut enclosing = shrunk
            .iter()
            .enumerate()
            .filter(|(_, roi)| roi.contains(px))
            .map(|(i, _)| i);
        if let (Some(i), None) = (enclosing.next(), enclosing.next()) {
            bounding_boxes[i].range_points.push(*pt);
            assigned += 1;
        }
    }
    trace!(
        "assigned {} of {} range points to {} boxes",
        assigned,
        range_points.len(),
        bounding_boxes.len()
    );
    assigned
}

/// Matches whose previous keypoint lies in `prev_box` and whose current
/// keypoint lies in `curr_box`.
pub fn cluster_matches_with_roi(
    prev_box: &BoundingBox,
    curr_box: &BoundingBox,
    kpts_prev: &[Keypoint],
    kpts_curr: &[Keypoint],
    kpt_matches: &[FeatureMatch],
) -> FusionResult<Vec<FeatureMatch>> {
    let mut inside = Vec::new();
    for m in kpt_matches {
        let (prev_kpt, curr_kpt) = m.resolve(kpts_prev, kpts_curr)?;
        if curr_box.roi.contains(curr_kpt) && prev_box.roi.contains(prev_kpt) {
            inside.push(*m);
        }
    }
    trace!(
        "box {} -> {}: {} of {} matches inside",
        prev_box.id,
        curr_box.id,
        inside.len(),
        kpt_matches.len()
    );
    Ok(inside)
}
