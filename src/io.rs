use std::io::Write;
use std::path::{Path, PathBuf};

use glob::glob;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::FusionResult;
use crate::pipeline::{FrameInput, FrameReport};
use crate::ttc::Ttc;

/// Serializes an object to a JSON file.
pub fn object_to_json<T, Q>(output_path: Q, object: &T) -> FusionResult<()>
where
    T: Serialize,
    Q: AsRef<Path>,
{
    let j = serde_json::to_string_pretty(object)?;
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(j.as_bytes())?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned, Q: AsRef<Path>>(file_path: Q) -> FusionResult<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Paths of all `*.json` frame files in `folder`, sorted by name.
pub fn frame_paths(folder: &str) -> FusionResult<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = glob(&format!("{}/*.json", folder))?
        .filter_map(Result::ok)
        .collect();
    paths.sort();
    Ok(paths)
}

/// Loads every frame file of a sequence folder in parallel, in name order.
pub fn load_frame_inputs(folder: &str) -> FusionResult<Vec<FrameInput>> {
    let paths = frame_paths(folder)?;
    log::trace!("loading {} frames from {}", paths.len(), folder);
    paths
        .par_iter()
        .progress_count(paths.len() as u64)
        .map(|p| object_from_json::<FrameInput, _>(p))
        .collect()
}

#[derive(Serialize)]
struct TtcReport {
    time: String,
    frame_rate: f64,
    transitions: Vec<TransitionReport>,
}

#[derive(Serialize)]
struct TransitionReport {
    time_ns: i64,
    objects: Vec<ObjectReport>,
}

#[derive(Serialize)]
struct ObjectReport {
    prev_box_id: i32,
    curr_box_id: i32,
    ttc_camera: Option<f64>,
    camera_status: String,
    ttc_lidar: Option<f64>,
    lidar_status: String,
    match_count: usize,
    point_count: usize,
}

fn status(ttc: &Ttc) -> String {
    match ttc {
        Ttc::Measured { clamped: false, .. } => "measured",
        Ttc::Measured { clamped: true, .. } => "clamped",
        Ttc::NotClosing => "not_closing",
        Ttc::InsufficientData => "insufficient_data",
    }
    .to_string()
}

fn now_string() -> String {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    now.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

/// Writes the per-transition TTC estimates of a sequence as JSON.
pub fn write_report<Q: AsRef<Path>>(
    output_path: Q,
    frame_rate: f64,
    reports: &[FrameReport],
) -> FusionResult<()> {
    let transitions = reports
        .iter()
        .map(|r| TransitionReport {
            time_ns: r.time_ns,
            objects: r
                .objects
                .iter()
                .map(|o| ObjectReport {
                    prev_box_id: o.prev_box_id,
                    curr_box_id: o.curr_box_id,
                    ttc_camera: o.camera.seconds(),
                    camera_status: status(&o.camera),
                    ttc_lidar: o.lidar.seconds(),
                    lidar_status: status(&o.lidar),
                    match_count: o.match_count,
                    point_count: o.curr_point_count,
                })
                .collect(),
        })
        .collect();
    let report = TtcReport {
        time: now_string(),
        frame_rate,
        transitions,
    };
    object_to_json(output_path, &report)
}
