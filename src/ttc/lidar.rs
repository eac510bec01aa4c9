use std::collections::{HashMap, VecDeque};

use log::debug;

use super::Ttc;
use crate::config::{FusionConfig, LidarConfig};
use crate::types::RangePoint;

type Cell = (i64, i64, i64);

// float-to-int casts saturate, so far points share the edge cells
fn cell_of(p: &RangePoint, cell_size: f64) -> Cell {
    (
        (p.x / cell_size).floor() as i64,
        (p.y / cell_size).floor() as i64,
        (p.z / cell_size).floor() as i64,
    )
}

/// Euclidean clustering: points closer than `tolerance` are linked and
/// clusters are the connected components. Components with fewer than
/// `min_size` members are dropped.
///
/// Points with a non-finite coordinate belong to no cluster.
///
/// Returns clusters as indices into `points`.
pub fn euclidean_clusters(
    points: &[RangePoint],
    tolerance: f64,
    min_size: usize,
) -> Vec<Vec<usize>> {
    // with cells of edge `tolerance`, every neighbour lies in the 27 surrounding cells
    let mut grid: HashMap<Cell, Vec<usize>> = HashMap::new();
    let mut visited = vec![false; points.len()];
    for (i, p) in points.iter().enumerate() {
        if p.is_finite() {
            grid.entry(cell_of(p, tolerance)).or_default().push(i);
        } else {
            visited[i] = true;
        }
    }

    let mut clusters = Vec::new();
    let mut queue = VecDeque::new();
    for seed in 0..points.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);
        let mut members = Vec::new();
        while let Some(i) = queue.pop_front() {
            members.push(i);
            let (cx, cy, cz) = cell_of(&points[i], tolerance);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let key = (
                            cx.saturating_add(dx),
                            cy.saturating_add(dy),
                            cz.saturating_add(dz),
                        );
                        let Some(cell) = grid.get(&key) else {
                            continue;
                        };
                        for &j in cell {
                            if !visited[j] && points[i].distance_to(&points[j]) <= tolerance {
                                visited[j] = true;
                                queue.push_back(j);
                            }
                        }
                    }
                }
            }
        }
        if members.len() >= min_size {
            members.sort_unstable();
            clusters.push(members);
        }
    }
    clusters
}

/// Smallest forward distance among reflective points that belong to a
/// sufficiently large cluster. `None` if no cluster qualifies.
pub fn min_distance_lidar(range_points: &[RangePoint], config: &LidarConfig) -> Option<f64> {
    let reflective: Vec<RangePoint> = range_points
        .iter()
        .filter(|p| p.r >= config.min_reflectivity)
        .copied()
        .collect();
    let clusters = euclidean_clusters(
        &reflective,
        config.cluster_tolerance,
        config.min_cluster_size,
    );
    let min_x = clusters
        .iter()
        .flatten()
        .map(|&i| reflective[i].x)
        .min_by(|a, b| a.total_cmp(b));
    debug!(
        "{} of {} points reflective, {} clusters, min x {:?}",
        reflective.len(),
        range_points.len(),
        clusters.len(),
        min_x
    );
    min_x
}

/// Constant-velocity TTC from two forward distances taken `dt` apart.
pub fn ttc_from_distances(prev_dist: f64, curr_dist: f64, dt: f64, config: &FusionConfig) -> Ttc {
    let closing = prev_dist - curr_dist;
    if closing >= config.closing_epsilon {
        Ttc::clamped(curr_dist / closing * dt, config.ttc_ceiling)
    } else {
        Ttc::NotClosing
    }
}

/// Time-to-collision from the closest clustered lidar points of one object
/// in two consecutive frames.
pub fn compute_ttc_lidar(
    range_points_prev: &[RangePoint],
    range_points_curr: &[RangePoint],
    config: &FusionConfig,
) -> Ttc {
    let (prev_dist, curr_dist) = rayon::join(
        || min_distance_lidar(range_points_prev, &config.lidar),
        || min_distance_lidar(range_points_curr, &config.lidar),
    );
    match (prev_dist, curr_dist) {
        (Some(prev_dist), Some(curr_dist)) => {
            ttc_from_distances(prev_dist, curr_dist, config.dt(), config)
        }
        _ => Ttc::InsufficientData,
    }
}
