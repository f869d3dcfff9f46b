use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use stereo_features::io::{FrameReport, object_from_json, object_to_json, write_extraction_report};
use stereo_features::synthetic::{SceneParams, SyntheticDetector, generate_sequence};
use stereo_features::visualization::log_stereo_frame;
use stereo_features::{BruteForceHamming, PinholeStereoCamera, StereoCamera, StereoConfig, StereoFrame};

#[derive(Parser)]
#[command(version, about, author)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract stereo features from a synthetic sequence
    Synthetic {
        /// Number of stereo pairs
        #[arg(short, long, default_value = "20")]
        frames: usize,

        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Pipeline configuration JSON
        #[arg(short, long)]
        config: Option<String>,

        /// Stereo camera JSON
        #[arg(long)]
        camera: Option<String>,

        /// Scene parameters JSON
        #[arg(long)]
        scene: Option<String>,

        #[arg(short, long, default_value = "report.json")]
        report: String,

        /// Save a rerun recording
        #[arg(long)]
        rrd: Option<String>,

        /// Disable left/right concurrency
        #[arg(long)]
        sequential: bool,
    },
    /// Write the default configuration
    DefaultConfig { output: String },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Synthetic {
            frames,
            seed,
            config,
            camera,
            scene,
            report,
            rrd,
            sequential,
        } => {
            let mut config: StereoConfig = match config {
                Some(path) => object_from_json(&path)?,
                None => StereoConfig::default(),
            };
            if sequential {
                config.lr_in_parallel = false;
            }
            config.validate()?;
            let camera: PinholeStereoCamera = match camera {
                Some(path) => object_from_json(&path)?,
                None => PinholeStereoCamera::default(),
            };
            let scene: SceneParams = match scene {
                Some(path) => object_from_json(&path)?,
                None => SceneParams::default(),
            };
            camera.validate()?;
            scene.validate()?;
            run_synthetic(&config, camera, &scene, frames, seed, &report, rrd.as_deref())?;
        }
        Commands::DefaultConfig { output } => {
            object_to_json(&output, &StereoConfig::default())?;
            println!("default configuration written to {}", output);
        }
    }
    Ok(())
}

fn run_synthetic(
    config: &StereoConfig,
    camera: PinholeStereoCamera,
    scene: &SceneParams,
    num_frames: usize,
    seed: u64,
    report_path: &str,
    rrd_path: Option<&str>,
) -> anyhow::Result<()> {
    let pairs = generate_sequence(&camera, scene, num_frames, seed);
    let shared_camera: Arc<dyn StereoCamera> = Arc::new(camera);
    let detector = SyntheticDetector;
    let matcher = BruteForceHamming;

    let now = Instant::now();
    let frames: Vec<_> = pairs
        .into_par_iter()
        .enumerate()
        .progress_count(num_frames as u64)
        .map(|(idx, pair)| {
            let mut frame = StereoFrame::new(idx, pair.left, pair.right, shared_camera.clone());
            frame.extract_stereo_features(&detector, &matcher, config);
            frame
        })
        .collect();
    let duration_sec = now.elapsed().as_secs_f64();
    println!("extracting features took {:.6} sec", duration_sec);
    if !frames.is_empty() {
        println!("avg: {} sec", duration_sec / frames.len() as f64);
    }

    if let Some(path) = rrd_path {
        let recording = rerun::RecordingStreamBuilder::new("stereo_features").save(path)?;
        for frame in &frames {
            log_stereo_frame(&recording, "/cam0", frame, scene.max_depth)?;
        }
    }

    let reports: Vec<_> = frames.iter().map(FrameReport::from_frame).collect();
    write_extraction_report(report_path, &reports)?;
    log::info!("report written to {}", report_path);
    Ok(())
}
