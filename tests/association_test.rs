mod common;

use camera_lidar_ttc::association::{
    cluster_matches_with_roi, cluster_range_points_with_roi, crop_range_points,
};
use camera_lidar_ttc::config::CropConfig;
use camera_lidar_ttc::error::{FrameSide, FusionError};
use camera_lidar_ttc::frame::BoundingBox;
use camera_lidar_ttc::types::{FeatureMatch, RangePoint, Roi};
use common::LateralProjector;
use glam::Vec2;

// pixel (500 - 100 y, 300 - 100 z)
fn point_at_pixel(u: f64, v: f64) -> RangePoint {
    RangePoint::new(10.0, (500.0 - u) / 100.0, (300.0 - v) / 100.0, 1.0)
}

#[test]
fn test_point_in_single_box_is_assigned() {
    let mut boxes = vec![
        BoundingBox::new(1, Roi::new(400.0, 200.0, 200.0, 200.0)),
        BoundingBox::new(2, Roi::new(700.0, 200.0, 200.0, 200.0)),
    ];
    let points = vec![point_at_pixel(500.0, 300.0), point_at_pixel(800.0, 300.0)];
    let assigned = cluster_range_points_with_roi(&mut boxes, &points, 0.1, &LateralProjector);

    assert_eq!(assigned, 2);
    assert_eq!(boxes[0].range_points, vec![points[0]]);
    assert_eq!(boxes[1].range_points, vec![points[1]]);
}

#[test]
fn test_point_in_overlap_is_dropped() {
    let mut boxes = vec![
        BoundingBox::new(1, Roi::new(400.0, 200.0, 200.0, 200.0)),
        BoundingBox::new(2, Roi::new(500.0, 200.0, 200.0, 200.0)),
    ];
    // both shrunk boxes contain u = 550
    let points = vec![point_at_pixel(550.0, 300.0), point_at_pixel(450.0, 300.0)];
    let assigned = cluster_range_points_with_roi(&mut boxes, &points, 0.1, &LateralProjector);

    assert_eq!(assigned, 1);
    assert_eq!(boxes[0].range_points, vec![points[1]]);
    assert!(boxes[1].range_points.is_empty());
}

#[test]
fn test_shrink_drops_edge_points() {
    let roi = Roi::new(400.0, 200.0, 200.0, 200.0);
    // 5 px inside the left edge, outside the 10 % shrunk box (starts at 410)
    let points = vec![point_at_pixel(405.0, 300.0)];

    let mut unshrunk = vec![BoundingBox::new(1, roi)];
    cluster_range_points_with_roi(&mut unshrunk, &points, 0.0, &LateralProjector);
    assert_eq!(unshrunk[0].range_points.len(), 1);

    let mut shrunk = vec![BoundingBox::new(1, roi)];
    cluster_range_points_with_roi(&mut shrunk, &points, 0.1, &LateralProjector);
    assert!(shrunk[0].range_points.is_empty());
}

#[test]
fn test_points_outside_or_behind_are_dropped() {
    let mut boxes = vec![BoundingBox::new(1, Roi::new(400.0, 200.0, 200.0, 200.0))];
    let behind = RangePoint::new(-5.0, 0.0, 0.0, 1.0);
    let outside = point_at_pixel(100.0, 100.0);
    let points = [behind, outside];
    let assigned = cluster_range_points_with_roi(&mut boxes, &points, 0.1, &LateralProjector);

    assert_eq!(assigned, 0);
    assert!(boxes[0].range_points.is_empty());
}

#[test]
fn test_roi_shrink_geometry() {
    let roi = Roi::new(100.0, 50.0, 200.0, 100.0).shrink(0.2);
    assert!((roi.x - 120.0).abs() < 1e-4);
    assert!((roi.y - 60.0).abs() < 1e-4);
    assert!((roi.width - 160.0).abs() < 1e-4);
    assert!((roi.height - 80.0).abs() < 1e-4);
}

#[test]
fn test_crop_range_points() {
    let crop = CropConfig::default();
    let points = vec![
        RangePoint::new(8.0, 0.5, -1.0, 0.5),
        RangePoint::new(25.0, 0.0, -1.0, 0.5),
        RangePoint::new(8.0, 3.0, -1.0, 0.5),
        RangePoint::new(8.0, 0.0, -1.6, 0.5),
    ];
    assert_eq!(crop_range_points(&points, &crop), vec![points[0]]);
}

#[test]
fn test_match_requires_both_endpoints() {
    let prev_box = BoundingBox::new(1, Roi::new(0.0, 0.0, 100.0, 100.0));
    let curr_box = BoundingBox::new(1, Roi::new(200.0, 0.0, 100.0, 100.0));
    let kpts_prev = vec![Vec2::new(50.0, 50.0), Vec2::new(150.0, 50.0), Vec2::new(60.0, 60.0)];
    let kpts_curr = vec![Vec2::new(250.0, 50.0), Vec2::new(250.0, 60.0), Vec2::new(50.0, 50.0)];
    let matches = vec![
        FeatureMatch::new(0, 0),
        FeatureMatch::new(1, 1),
        FeatureMatch::new(2, 2),
    ];

    let inside =
        cluster_matches_with_roi(&prev_box, &curr_box, &kpts_prev, &kpts_curr, &matches).unwrap();
    assert_eq!(inside, vec![FeatureMatch::new(0, 0)]);
}

#[test]
fn test_match_index_out_of_range_is_an_error() {
    let roi_box = BoundingBox::new(1, Roi::new(0.0, 0.0, 100.0, 100.0));
    let kpts = vec![Vec2::new(50.0, 50.0)];
    let matches = vec![FeatureMatch::new(0, 3)];

    let err = cluster_matches_with_roi(&roi_box, &roi_box, &kpts, &kpts, &matches).unwrap_err();
    match err {
        FusionError::KeypointIndexOutOfRange { side, index, len } => {
            assert_eq!(side, FrameSide::Current);
            assert_eq!(index, 3);
            assert_eq!(len, 1);
        }
        other => panic!("unexpected error {}", other),
    }
}
