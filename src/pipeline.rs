use std::collections::BTreeMap;

use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::association::{
    cluster_matches_with_roi, cluster_range_points_with_roi, crop_range_points,
};
use crate::box_matching::match_bounding_boxes;
use crate::config::FusionConfig;
use crate::error::{FusionError, FusionResult};
use crate::frame::{BoundingBox, Frame};
use crate::projection::PointProjector;
use crate::ttc::{Ttc, compute_ttc_camera, compute_ttc_lidar};
use crate::types::{FeatureMatch, Keypoint, RangePoint, Roi};

/// Detector output for one box, before any association.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxInput {
    pub id: i32,
    pub roi: Roi,
}

/// Everything the upstream collaborators deliver for one time step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    #[serde(default)]
    pub time_ns: i64,
    pub keypoints: Vec<Keypoint>,
    pub boxes: Vec<BoxInput>,
    pub range_points: Vec<RangePoint>,
    /// matches from the previous frame's keypoints into this frame's
    #[serde(default)]
    pub matches: Vec<FeatureMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTtc {
    pub prev_box_id: i32,
    pub curr_box_id: i32,
    pub camera: Ttc,
    pub lidar: Ttc,
    pub match_count: usize,
    pub prev_point_count: usize,
    pub curr_point_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub time_ns: i64,
    pub box_matches: BTreeMap<i32, i32>,
    pub objects: Vec<ObjectTtc>,
}

/// Turns detector boxes and the lidar scan of one time step into a [`Frame`]
/// whose boxes carry their range points.
pub fn build_frame<P: PointProjector + ?Sized>(
    input: &FrameInput,
    projector: &P,
    config: &FusionConfig,
) -> Frame {
    let mut bounding_boxes: Vec<_> = input
        .boxes
        .iter()
        .map(|b| BoundingBox::new(b.id, b.roi))
        .collect();
    let cropped;
    let range_points = match &config.crop {
        Some(crop) => {
            cropped = crop_range_points(&input.range_points, crop);
            &cropped
        }
        None => &input.range_points,
    };
    cluster_range_points_with_roi(
        &mut bounding_boxes,
        range_points,
        config.shrink_factor,
        projector,
    );
    Frame::new(input.keypoints.clone(), bounding_boxes)
}

/// Correspondence and both TTC estimates for one frame transition.
///
/// Box-scoped matches are appended to `curr`'s boxes in correspondence
/// order after all pairs are evaluated.
pub fn process_frame_pair(
    prev: &Frame,
    curr: &mut Frame,
    kpt_matches: &[FeatureMatch],
    config: &FusionConfig,
) -> FusionResult<FrameReport> {
    let box_matches = match_bounding_boxes(kpt_matches, prev, curr)?;
    trace!("{} box correspondences", box_matches.len());

    let pairs: Vec<(i32, i32)> = box_matches.iter().map(|(&p, &c)| (p, c)).collect();
    let frame: &Frame = curr;
    let evaluated = pairs
        .par_iter()
        .filter_map(|&(prev_id, curr_id)| {
            let prev_box = prev.box_by_id(prev_id)?;
            let curr_box = frame.box_by_id(curr_id)?;
            Some(evaluate_pair(prev, frame, prev_box, curr_box, kpt_matches, config))
        })
        .collect::<FusionResult<Vec<_>>>()?;

    let mut objects = Vec::with_capacity(evaluated.len());
    for (object, box_kpt_matches) in evaluated {
        if let Some(curr_box) = curr.box_by_id_mut(object.curr_box_id) {
            curr_box.kpt_matches.extend(box_kpt_matches);
        }
        objects.push(object);
    }
    Ok(FrameReport {
        time_ns: 0,
        box_matches,
        objects,
    })
}

fn evaluate_pair(
    prev: &Frame,
    curr: &Frame,
    prev_box: &BoundingBox,
    curr_box: &BoundingBox,
    kpt_matches: &[FeatureMatch],
    config: &FusionConfig,
) -> FusionResult<(ObjectTtc, Vec<FeatureMatch>)> {
    let box_kpt_matches = cluster_matches_with_roi(
        prev_box,
        curr_box,
        &prev.keypoints,
        &curr.keypoints,
        kpt_matches,
    )?;
    let camera = compute_ttc_camera(&prev.keypoints, &curr.keypoints, &box_kpt_matches, config)?;
    let lidar = compute_ttc_lidar(&prev_box.range_points, &curr_box.range_points, config);
    debug!(
        "box {} -> {}: camera {}, lidar {}",
        prev_box.id, curr_box.id, camera, lidar
    );
    let object = ObjectTtc {
        prev_box_id: prev_box.id,
        curr_box_id: curr_box.id,
        camera,
        lidar,
        match_count: box_kpt_matches.len(),
        prev_point_count: prev_box.range_points.len(),
        curr_point_count: curr_box.range_points.len(),
    };
    Ok((object, box_kpt_matches))
}

/// Runs the per-frame pipeline over a stream of inputs, keeping the last
/// frame for the next transition.
pub struct FusionPipeline<P: PointProjector> {
    projector: P,
    config: FusionConfig,
    prev_frame: Option<Frame>,
}

impl<P: PointProjector> FusionPipeline<P> {
    pub fn new(projector: P, config: FusionConfig) -> FusionResult<FusionPipeline<P>> {
        config.validate()?;
        Ok(FusionPipeline {
            projector,
            config,
            prev_frame: None,
        })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn prev_frame(&self) -> Option<&Frame> {
        self.prev_frame.as_ref()
    }

    /// Consumes one time step. Returns `None` for the first frame.
    pub fn push(&mut self, input: &FrameInput) -> FusionResult<Option<FrameReport>> {
        let mut curr = build_frame(input, &self.projector, &self.config);
        let report = match &self.prev_frame {
            Some(prev) => {
                let mut report = process_frame_pair(prev, &mut curr, &input.matches, &self.config)?;
                report.time_ns = input.time_ns;
                Some(report)
            }
            None => None,
        };
        self.prev_frame = Some(curr);
        Ok(report)
    }

    /// Feeds a whole sequence in order. `on_frame` is called after every
    /// frame with its index, the buffered frame and the transition report.
    /// The first failure aborts the run and names the frame it came from.
    pub fn run<F>(
        &mut self,
        inputs: &[FrameInput],
        mut on_frame: F,
    ) -> FusionResult<Vec<FrameReport>>
    where
        F: FnMut(usize, &Frame, Option<&FrameReport>) -> FusionResult<()>,
    {
        let mut reports = Vec::new();
        for (index, input) in inputs.iter().enumerate() {
            let wrap = |source: FusionError| FusionError::Frame {
                index,
                source: Box::new(source),
            };
            let report = self.push(input).map_err(wrap)?;
            if let Some(frame) = &self.prev_frame {
                on_frame(index, frame, report.as_ref()).map_err(wrap)?;
            }
            reports.extend(report);
        }
        Ok(reports)
    }
}
