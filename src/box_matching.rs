use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::error::FusionResult;
use crate::frame::Frame;
use crate::types::FeatureMatch;

/// Counts, for every (previous id, current id) box pair, the matches whose
/// endpoints fall in both ROIs. A match votes once for every qualifying pair.
pub fn count_box_votes(
    kpt_matches: &[FeatureMatch],
    prev_frame: &Frame,
    curr_frame: &Frame,
) -> FusionResult<BTreeMap<(i32, i32), usize>> {
    let mut votes = BTreeMap::new();
    for m in kpt_matches {
        let (prev_kpt, curr_kpt) = m.resolve(&prev_frame.keypoints, &curr_frame.keypoints)?;
        for prev_box in &prev_frame.bounding_boxes {
            if !prev_box.roi.contains(prev_kpt) {
                continue;
            }
            for curr_box in &curr_frame.bounding_boxes {
                if !curr_box.roi.contains(curr_kpt) {
                    continue;
                }
                *votes.entry((prev_box.id, curr_box.id)).or_insert(0) += 1;
            }
        }
    }
    Ok(votes)
}

/// Greedy first-seen-wins assignment of previous boxes to current boxes.
///
/// Pairs are visited by descending vote count; equal counts keep ascending
/// `(prev_id, curr_id)` order. A current id may be chosen by several
/// previous boxes.
pub fn assign_best_matches(votes: &BTreeMap<(i32, i32), usize>) -> BTreeMap<i32, i32> {
    let mut ranked: Vec<_> = votes.iter().map(|(&pair, &count)| (pair, count)).collect();
    // stable sort keeps the map's key order among ties
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut visited = BTreeSet::new();
    let mut best = BTreeMap::new();
    for ((prev_id, curr_id), count) in ranked {
        if !visited.insert(prev_id) {
            continue;
        }
        debug!("box {} -> {} with {} votes", prev_id, curr_id, count);
        best.insert(prev_id, curr_id);
    }
    best
}

/// Previous-box id to current-box id correspondence voted by feature matches.
pub fn match_bounding_boxes(
    kpt_matches: &[FeatureMatch],
    prev_frame: &Frame,
    curr_frame: &Frame,
) -> FusionResult<BTreeMap<i32, i32>> {
    let votes = count_box_votes(kpt_matches, prev_frame, curr_frame)?;
    Ok(assign_best_matches(&votes))
}
