use log::debug;

use super::Ttc;
use crate::config::FusionConfig;
use crate::error::FusionResult;
use crate::types::{FeatureMatch, Keypoint};

/// Ratios `curr_dist / prev_dist` over every unordered pair of matches whose
/// keypoints are at least `min_pair_distance` apart in both frames.
pub fn distance_ratios(
    kpts_prev: &[Keypoint],
    kpts_curr: &[Keypoint],
    kpt_matches: &[FeatureMatch],
    min_pair_distance: f64,
) -> FusionResult<Vec<f64>> {
    let pairs = kpt_matches
        .iter()
        .map(|m| m.resolve(kpts_prev, kpts_curr))
        .collect::<FusionResult<Vec<_>>>()?;

    let mut ratios = Vec::new();
    for (i, (prev_1, curr_1)) in pairs.iter().enumerate() {
        for (prev_2, curr_2) in &pairs[i + 1..] {
            let prev_dist = prev_1.as_dvec2().distance(prev_2.as_dvec2());
            let curr_dist = curr_1.as_dvec2().distance(curr_2.as_dvec2());
            if prev_dist >= min_pair_distance && curr_dist >= min_pair_distance {
                ratios.push(curr_dist / prev_dist);
            }
        }
    }
    Ok(ratios)
}

/// Element at `len / 2` after sorting, i.e. the upper median for even counts.
pub fn median_ratio(mut ratios: Vec<f64>) -> Option<f64> {
    if ratios.is_empty() {
        return None;
    }
    ratios.sort_by(|a, b| a.total_cmp(b));
    Some(ratios[ratios.len() / 2])
}

/// Time-to-collision from the scale change of keypoints matched inside one box.
pub fn compute_ttc_camera(
    kpts_prev: &[Keypoint],
    kpts_curr: &[Keypoint],
    kpt_matches: &[FeatureMatch],
    config: &FusionConfig,
) -> FusionResult<Ttc> {
    let ratios = distance_ratios(kpts_prev, kpts_curr, kpt_matches, config.min_pair_distance)?;
    let num_ratios = ratios.len();
    let Some(ratio) = median_ratio(ratios) else {
        debug!(
            "no stable keypoint pairs among {} matches",
            kpt_matches.len()
        );
        return Ok(Ttc::InsufficientData);
    };
    debug!("median distance ratio {:.5} of {} pairs", ratio, num_ratios);
    Ok(ttc_from_ratio(ratio, config.dt(), config))
}

pub fn ttc_from_ratio(ratio: f64, dt: f64, config: &FusionConfig) -> Ttc {
    if ratio - 1.0 >= config.closing_epsilon {
        Ttc::clamped(-dt / (1.0 - ratio), config.ttc_ceiling)
    } else {
        Ttc::NotClosing
    }
}
