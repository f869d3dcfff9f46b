use std::io::Write;

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};

use crate::stereo_frame::{StageTimings, StereoFrame};

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: &str, object: &T) -> anyhow::Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    let mut file = std::fs::File::create(output_path)
        .with_context(|| format!("cannot create {}", output_path))?;
    file.write_all(j.as_bytes())?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: &str) -> anyhow::Result<T> {
    let contents = std::fs::read_to_string(file_path)
        .with_context(|| format!("cannot read {}", file_path))?;
    serde_json::from_str(&contents).with_context(|| format!("cannot parse {}", file_path))
}

#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub frame_idx: usize,
    pub num_points: usize,
    pub num_lines: usize,
    pub mean_point_disparity: Option<f64>,
    pub mean_line_disparity: Option<f64>,
    pub timings: StageTimings,
}

impl FrameReport {
    pub fn from_frame<I: Sync>(frame: &StereoFrame<I>) -> FrameReport {
        let points = frame.points();
        let lines = frame.lines();
        let mean = |sum: f64, n: usize| (n > 0).then(|| sum / n as f64);
        FrameReport {
            frame_idx: frame.frame_idx(),
            num_points: points.len(),
            num_lines: lines.len(),
            mean_point_disparity: mean(points.iter().map(|p| p.disparity()).sum(), points.len()),
            mean_line_disparity: mean(
                lines.iter().map(|l| 0.5 * (l.sdisp() + l.edisp())).sum(),
                lines.len(),
            ),
            timings: *frame.timings(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ExtractionReport<'a> {
    timestamp: i64,
    num_frames: usize,
    total_points: usize,
    total_lines: usize,
    mean_total_ms: f64,
    frames: &'a [FrameReport],
}

/// Writes per-frame feature counts and stage timings as JSON.
pub fn write_extraction_report(output_path: &str, frames: &[FrameReport]) -> anyhow::Result<()> {
    let mean_total_ms = if frames.is_empty() {
        0.0
    } else {
        frames.iter().map(|f| f.timings.total_ms()).sum::<f64>() / frames.len() as f64
    };
    let report = ExtractionReport {
        timestamp: time::OffsetDateTime::now_utc().unix_timestamp(),
        num_frames: frames.len(),
        total_points: frames.iter().map(|f| f.num_points).sum(),
        total_lines: frames.iter().map(|f| f.num_lines).sum(),
        mean_total_ms,
        frames,
    };
    object_to_json(output_path, &report)
}
