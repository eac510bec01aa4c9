use serde::{Deserialize, Serialize};

use crate::types::{FeatureMatch, Keypoint, RangePoint, Roi};

/// Detected object for one frame. The detector carries `id` across frames;
/// the point and match collections are filled by the association step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub id: i32,
    pub roi: Roi,
    #[serde(default)]
    pub range_points: Vec<RangePoint>,
    #[serde(default)]
    pub kpt_matches: Vec<FeatureMatch>,
}

impl BoundingBox {
    pub fn new(id: i32, roi: Roi) -> BoundingBox {
        BoundingBox {
            id,
            roi,
            range_points: Vec::new(),
            kpt_matches: Vec::new(),
        }
    }
}

/// Keypoints and bounding boxes of a single time step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub keypoints: Vec<Keypoint>,
    pub bounding_boxes: Vec<BoundingBox>,
}

impl Frame {
    pub fn new(keypoints: Vec<Keypoint>, bounding_boxes: Vec<BoundingBox>) -> Frame {
        Frame {
            keypoints,
            bounding_boxes,
        }
    }

    pub fn box_by_id(&self, id: i32) -> Option<&BoundingBox> {
        self.bounding_boxes.iter().find(|b| b.id == id)
    }

    pub fn box_by_id_mut(&mut self, id: i32) -> Option<&mut BoundingBox> {
        self.bounding_boxes.iter_mut().find(|b| b.id == id)
    }
}
