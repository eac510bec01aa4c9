use camera_lidar_ttc::config::FusionConfig;
use camera_lidar_ttc::io::{load_frame_inputs, object_from_json, write_report};
use camera_lidar_ttc::pipeline::FusionPipeline;
use camera_lidar_ttc::projection::Calibration;
use camera_lidar_ttc::visualization::{box_label, save_top_view};
use clap::Parser;
use log::{debug, error, info};
use std::path::Path;
use std::time::Instant;

#[derive(Parser)]
#[command(version, about, author)]
struct TtcCli {
    /// path to a folder of frame json files
    path: String,

    /// calibration json with p_rect, r_rect and rt
    #[arg(short, long)]
    calibration: String,

    /// fusion config json, defaults are used when omitted
    #[arg(long)]
    config: Option<String>,

    /// overrides the config frame rate
    #[arg(long)]
    frame_rate: Option<f64>,

    #[arg(short, long, default_value = "ttc_report.json")]
    output: String,

    /// folder for top-view images of every frame
    #[arg(long)]
    top_view: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = TtcCli::parse();

    let mut config: FusionConfig = match &cli.config {
        Some(path) => object_from_json(path)?,
        None => FusionConfig::default(),
    };
    if let Some(frame_rate) = cli.frame_rate {
        config.frame_rate = frame_rate;
    }
    let calibration: Calibration = object_from_json(&cli.calibration)?;
    let mut pipeline = FusionPipeline::new(calibration.to_transform(), config)?;

    let now = Instant::now();
    let inputs = load_frame_inputs(&cli.path)?;
    info!(
        "loaded {} frames in {:.3} sec",
        inputs.len(),
        now.elapsed().as_secs_f64()
    );
    if let Some(dir) = &cli.top_view {
        std::fs::create_dir_all(dir)?;
    }

    let now = Instant::now();
    let result = pipeline.run(&inputs, |idx, frame, report| {
        if let Some(dir) = &cli.top_view {
            let path = Path::new(dir).join(format!("{:06}.png", idx));
            save_top_view(path, &frame.bounding_boxes, (20.0, 20.0), (1000, 2000))?;
            for label in frame.bounding_boxes.iter().filter_map(box_label) {
                debug!("frame {} {}", idx, label);
            }
        }
        for o in report.into_iter().flat_map(|r| &r.objects) {
            info!(
                "frame {} box {} -> {}: camera {}, lidar {}",
                idx, o.prev_box_id, o.curr_box_id, o.camera, o.lidar
            );
        }
        Ok(())
    });
    let reports = match result {
        Ok(reports) => reports,
        Err(e) => {
            error!("aborting: {}", e);
            return Err(e.into());
        }
    };
    let duration_sec = now.elapsed().as_secs_f64();
    info!("processing took {:.6} sec", duration_sec);
    if !inputs.is_empty() {
        info!("avg: {} sec", duration_sec / inputs.len() as f64);
    }

    write_report(&cli.output, pipeline.config().frame_rate, &reports)?;
    println!("wrote {} transitions to {}", reports.len(), cli.output);
    Ok(())
}
