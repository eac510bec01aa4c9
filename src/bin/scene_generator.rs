use camera_lidar_ttc::config::FusionConfig;
use camera_lidar_ttc::io::object_to_json;
use camera_lidar_ttc::pipeline::{BoxInput, FrameInput};
use camera_lidar_ttc::projection::{Calibration, PointProjector};
use camera_lidar_ttc::types::{FeatureMatch, RangePoint, Roi};
use clap::{Parser, Subcommand};
use rand::Rng;
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic sequence of a vehicle closing in on the ego car
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Number of frames to generate
        #[arg(short, long, default_value = "20")]
        num_frames: usize,

        /// Initial distance to the lead vehicle in meters
        #[arg(long, default_value = "12.0")]
        distance: f64,

        /// Closing speed in m/s
        #[arg(long, default_value = "2.0")]
        speed: f64,

        #[arg(long, default_value = "10.0")]
        frame_rate: f64,

        /// Image width
        #[arg(long, default_value = "1242")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "375")]
        height: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            output,
            num_frames,
            distance,
            speed,
            frame_rate,
            width,
            height,
        } => {
            generate_sequence(&output, num_frames, distance, speed, frame_rate, width, height)?;
        }
    }

    Ok(())
}

// rear face of the lead vehicle in the lidar frame
const REAR_HALF_WIDTH: f64 = 0.8;
const REAR_TOP: f64 = -0.6;
const REAR_BOTTOM: f64 = -1.4;
const LIDAR_ABOVE_CAMERA: f64 = 0.1;

fn generate_sequence(
    output_dir: &str,
    num_frames: usize,
    distance: f64,
    speed: f64,
    frame_rate: f64,
    width: u32,
    height: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::fs;

    let calibration = Calibration::forward_pinhole(
        700.0,
        700.0,
        width as f64 / 2.0,
        height as f64 / 2.0,
        LIDAR_ABOVE_CAMERA,
    );
    let projector = calibration.to_transform();
    let frames_dir = Path::new(output_dir).join("frames");
    fs::create_dir_all(&frames_dir)?;

    let mut rng = rand::rng();
    let features: Vec<(f64, f64)> = (0..60)
        .map(|_| {
            (
                rng.random_range(-REAR_HALF_WIDTH..REAR_HALF_WIDTH),
                rng.random_range(REAR_BOTTOM..REAR_TOP),
            )
        })
        .collect();

    let dt = 1.0 / frame_rate;
    let mut generated = 0;
    for frame_idx in 0..num_frames {
        let x = distance - speed * dt * frame_idx as f64;
        if x <= 1.0 {
            log::warn!("lead vehicle reached the ego car at frame {}", frame_idx);
            break;
        }

        // keypoint indices double as match indices, so every feature must project
        let on_rear = |&(y, z): &(f64, f64)| RangePoint::new(x, y, z, 1.0);
        let feature_points: Vec<_> = features.iter().map(on_rear).collect();
        let Some(keypoints) = projector.project_all(&feature_points) else {
            log::warn!("features left the camera view at frame {}", frame_idx);
            break;
        };

        let corners = [
            (REAR_HALF_WIDTH, REAR_TOP),
            (-REAR_HALF_WIDTH, REAR_TOP),
            (REAR_HALF_WIDTH, REAR_BOTTOM),
            (-REAR_HALF_WIDTH, REAR_BOTTOM),
        ];
        let corner_points: Vec<_> = corners.iter().map(on_rear).collect();
        let Some(corner_px) = projector.project_all(&corner_points) else {
            log::warn!("vehicle outline left the camera view at frame {}", frame_idx);
            break;
        };
        let (min, max) = corner_px.iter().fold(
            (glam::Vec2::splat(f32::MAX), glam::Vec2::splat(f32::MIN)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        let pad = (max - min) * 0.05;
        let roi = Roi::new(
            min.x - pad.x,
            min.y - pad.y,
            max.x - min.x + 2.0 * pad.x,
            max.y - min.y + 2.0 * pad.y,
        );

        let mut range_points = Vec::new();
        let mut y = -REAR_HALF_WIDTH;
        while y <= REAR_HALF_WIDTH {
            let mut z = REAR_BOTTOM;
            while z <= REAR_TOP {
                let noise = rng.random_range(-0.01..0.01);
                range_points.push(RangePoint::new(x + noise, y, z, rng.random_range(0.2..1.0)));
                z += 0.05;
            }
            y += 0.05;
        }
        // isolated returns in front of the vehicle, e.g. exhaust or dust
        for _ in 0..3 {
            range_points.push(RangePoint::new(
                x - rng.random_range(0.5..1.5),
                rng.random_range(-REAR_HALF_WIDTH..REAR_HALF_WIDTH),
                rng.random_range(REAR_BOTTOM..REAR_TOP),
                rng.random_range(0.0..1.0),
            ));
        }

        let matches = if frame_idx == 0 {
            Vec::new()
        } else {
            (0..keypoints.len()).map(|i| FeatureMatch::new(i, i)).collect()
        };
        let input = FrameInput {
            time_ns: (frame_idx as f64 * dt * 1e9) as i64,
            keypoints,
            boxes: vec![BoxInput { id: 0, roi }],
            range_points,
            matches,
        };
        object_to_json(frames_dir.join(format!("{:06}.json", frame_idx)), &input)?;
        generated += 1;
    }

    object_to_json(Path::new(output_dir).join("calibration.json"), &calibration)?;
    let config = FusionConfig {
        frame_rate,
        ..Default::default()
    };
    object_to_json(Path::new(output_dir).join("config.json"), &config)?;

    println!("Generated {} frames in {}", generated, frames_dir.display());
    Ok(())
}
