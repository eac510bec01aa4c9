use std::path::Path;

use image::{Rgb, RgbImage};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::error::FusionResult;
use crate::frame::BoundingBox;

const POINT_RADIUS: i64 = 4;
const MARKER_SPACING_M: f64 = 2.0;

/// Stable per-object colour, darker than the white background.
pub fn id_to_color(id: i32) -> Rgb<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
    Rgb([
        rng.random_range(0..150u8),
        rng.random_range(0..150u8),
        rng.random_range(0..150u8),
    ])
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_circle(img: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    for y in -radius..=radius {
        for x in -radius..=radius {
            if x * x + y * y <= radius * radius {
                put(img, cx + x, cy + y, color);
            }
        }
    }
}

fn draw_rect(img: &mut RgbImage, left: i64, top: i64, right: i64, bottom: i64, color: Rgb<u8>) {
    for t in 0..2 {
        for x in left..=right {
            put(img, x, top - t, color);
            put(img, x, bottom + t, color);
        }
        for y in top..=bottom {
            put(img, left - t, y, color);
            put(img, right + t, y, color);
        }
    }
}

/// Bird's-eye view of the boxes' lidar points: x forward points up the
/// image, y left points to the left.
///
/// `world_size` is (lateral, forward) extent in meters.
pub fn render_top_view(
    bounding_boxes: &[BoundingBox],
    world_size: (f64, f64),
    image_size: (u32, u32),
) -> RgbImage {
    let (img_w, img_h) = (image_size.0 as f64, image_size.1 as f64);
    let mut img = RgbImage::from_pixel(image_size.0, image_size.1, Rgb([255, 255, 255]));

    let num_markers = (world_size.1 / MARKER_SPACING_M).floor() as usize;
    for i in 0..num_markers {
        let y = (-(i as f64 * MARKER_SPACING_M) * img_h / world_size.1 + img_h) as i64;
        for x in 0..image_size.0 as i64 {
            put(&mut img, x, y, Rgb([0, 0, 255]));
        }
    }

    for b in bounding_boxes {
        if b.range_points.is_empty() {
            continue;
        }
        let color = id_to_color(b.id);
        let (mut top, mut left, mut bottom, mut right) = (i64::MAX, i64::MAX, i64::MIN, i64::MIN);
        for p in &b.range_points {
            let y = (-p.x * img_h / world_size.1 + img_h) as i64;
            let x = (-p.y * img_w / world_size.0 + img_w / 2.0) as i64;
            top = top.min(y);
            left = left.min(x);
            bottom = bottom.max(y);
            right = right.max(x);
            fill_circle(&mut img, x, y, POINT_RADIUS, color);
        }
        draw_rect(&mut img, left, top, right, bottom, Rgb([0, 0, 0]));
    }
    img
}

/// Caption for a box in the top view: id, point count, closest forward
/// distance and lateral width. `None` for boxes without points.
pub fn box_label(bbox: &BoundingBox) -> Option<String> {
    let first = bbox.range_points.first()?;
    let (mut x_min, mut y_min, mut y_max) = (first.x, first.y, first.y);
    for p in &bbox.range_points {
        x_min = x_min.min(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }
    Some(format!(
        "id={}, #pts={}, xmin={:.2} m, yw={:.2} m",
        bbox.id,
        bbox.range_points.len(),
        x_min,
        y_max - y_min
    ))
}

/// Renders the top view and writes it; the format follows the extension.
pub fn save_top_view<P: AsRef<Path>>(
    output_path: P,
    bounding_boxes: &[BoundingBox],
    world_size: (f64, f64),
    image_size: (u32, u32),
) -> FusionResult<()> {
    let img = render_top_view(bounding_boxes, world_size, image_size);
    img.save(output_path)?;
    Ok(())
}
