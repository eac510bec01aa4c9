use camera_lidar_ttc::config::FusionConfig;
use camera_lidar_ttc::io::{load_frame_inputs, object_from_json, object_to_json, write_report};
use camera_lidar_ttc::pipeline::{BoxInput, FrameInput, FrameReport, ObjectTtc};
use camera_lidar_ttc::ttc::Ttc;
use camera_lidar_ttc::types::{FeatureMatch, RangePoint, Roi};
use glam::Vec2;
use std::collections::BTreeMap;
use tempfile::TempDir;

#[test]
fn test_config_missing_fields_take_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, r#"{"frame_rate": 20.0, "lidar": {"min_cluster_size": 3}}"#).unwrap();

    let config: FusionConfig = object_from_json(&path).unwrap();
    assert_eq!(config.frame_rate, 20.0);
    assert_eq!(config.lidar.min_cluster_size, 3);
    assert_eq!(config.lidar.cluster_tolerance, 0.2);
    assert_eq!(config.shrink_factor, 0.10);
    assert!(config.crop.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_is_an_error() {
    let result: Result<FusionConfig, _> = object_from_json("non_existent_path.json");
    assert!(result.is_err());
}

#[test]
fn test_load_frame_inputs_sorted() {
    let temp_dir = TempDir::new().unwrap();
    for idx in [2, 0, 1] {
        let input = FrameInput {
            time_ns: idx,
            keypoints: vec![Vec2::new(1.0, 2.0)],
            boxes: vec![BoxInput {
                id: 1,
                roi: Roi::new(0.0, 0.0, 10.0, 10.0),
            }],
            range_points: vec![RangePoint::new(10.0, 0.0, -1.0, 0.5)],
            matches: vec![FeatureMatch::new(0, 0)],
        };
        object_to_json(temp_dir.path().join(format!("{:06}.json", idx)), &input).unwrap();
    }

    let inputs = load_frame_inputs(temp_dir.path().to_str().unwrap()).unwrap();
    let times: Vec<_> = inputs.iter().map(|f| f.time_ns).collect();
    assert_eq!(times, vec![0, 1, 2]);
    assert_eq!(inputs[0].keypoints, vec![Vec2::new(1.0, 2.0)]);
}

#[test]
fn test_frame_input_without_matches() {
    let json = r#"{
        "keypoints": [[10.0, 20.0]],
        "boxes": [{"id": 4, "roi": {"x": 0.0, "y": 0.0, "width": 50.0, "height": 50.0}}],
        "range_points": [{"x": 7.9, "y": 0.1, "z": -1.0, "r": 0.4}]
    }"#;
    let input: FrameInput = serde_json::from_str(json).unwrap();
    assert!(input.matches.is_empty());
    assert_eq!(input.time_ns, 0);
    assert_eq!(input.boxes[0].id, 4);
}

#[test]
fn test_write_report() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("report.json");
    let reports = vec![FrameReport {
        time_ns: 100,
        box_matches: BTreeMap::from([(1, 2)]),
        objects: vec![ObjectTtc {
            prev_box_id: 1,
            curr_box_id: 2,
            camera: Ttc::InsufficientData,
            lidar: Ttc::Measured {
                seconds: 0.93,
                clamped: false,
            },
            match_count: 0,
            prev_point_count: 3,
            curr_point_count: 3,
        }],
    }];

    write_report(&output_path, 10.0, &reports).unwrap();

    let content = std::fs::read_to_string(&output_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    let object = &json["transitions"][0]["objects"][0];
    assert!(json["time"].is_string());
    assert!(object["ttc_camera"].is_null());
    assert_eq!(object["camera_status"], "insufficient_data");
    assert_eq!(object["ttc_lidar"].as_f64(), Some(0.93));
    assert_eq!(object["lidar_status"], "measured");
}
