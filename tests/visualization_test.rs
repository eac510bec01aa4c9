use camera_lidar_ttc::error::FusionError;
use camera_lidar_ttc::frame::BoundingBox;
use camera_lidar_ttc::types::{RangePoint, Roi};
use camera_lidar_ttc::visualization::{
    box_label, id_to_color, render_top_view, save_top_view,
};
use image::Rgb;
use tempfile::TempDir;

#[test]
fn test_id_to_color_is_stable() {
    assert_eq!(id_to_color(7), id_to_color(7));
    let Rgb([r, g, b]) = id_to_color(3);
    assert!(r < 150 && g < 150 && b < 150);
}

#[test]
fn test_top_view_draws_points() {
    let mut bbox = BoundingBox::new(2, Roi::new(0.0, 0.0, 10.0, 10.0));
    bbox.range_points.push(RangePoint::new(10.0, 0.0, -1.0, 0.5));
    let img = render_top_view(&[bbox], (20.0, 20.0), (200, 200));

    assert_eq!(img.dimensions(), (200, 200));
    // x = 10 m lands halfway up, y = 0 in the middle column
    assert_eq!(*img.get_pixel(103, 100), id_to_color(2));
    assert_eq!(*img.get_pixel(100, 100), Rgb([0, 0, 0]));
    assert_eq!(*img.get_pixel(5, 195), Rgb([255, 255, 255]));
}

#[test]
fn test_empty_boxes_leave_markers_only() {
    let bbox = BoundingBox::new(1, Roi::new(0.0, 0.0, 10.0, 10.0));
    let img = render_top_view(&[bbox], (20.0, 20.0), (100, 100));
    assert!(img.pixels().all(|p| *p == Rgb([255, 255, 255]) || *p == Rgb([0, 0, 255])));
}

#[test]
fn test_box_label() {
    let mut bbox = BoundingBox::new(5, Roi::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(box_label(&bbox), None);
    bbox.range_points.push(RangePoint::new(8.5, 0.5, -1.0, 0.5));
    bbox.range_points.push(RangePoint::new(8.25, -0.25, -1.0, 0.5));
    assert_eq!(
        box_label(&bbox).unwrap(),
        "id=5, #pts=2, xmin=8.25 m, yw=0.75 m"
    );
}

#[test]
fn test_save_top_view() {
    let temp_dir = TempDir::new().unwrap();
    let mut bbox = BoundingBox::new(2, Roi::new(0.0, 0.0, 10.0, 10.0));
    bbox.range_points.push(RangePoint::new(10.0, 0.0, -1.0, 0.5));

    let path = temp_dir.path().join("000001.png");
    save_top_view(&path, &[bbox.clone()], (20.0, 20.0), (200, 200)).unwrap();
    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(*img.get_pixel(103, 100), id_to_color(2));

    let bad_path = temp_dir.path().join("view.unknown");
    let result = save_top_view(bad_path, &[bbox], (20.0, 20.0), (200, 200));
    assert!(matches!(result, Err(FusionError::Image(_))));
}
