use rerun::RecordingStream;

use crate::stereo_frame::StereoFrame;

/// rerun use top left corner as (0, 0)
pub fn rerun_shift(p2ds: &[(f32, f32)]) -> Vec<(f32, f32)> {
    p2ds.iter().map(|(x, y)| (*x + 0.5, *y + 0.5)).collect()
}

/// Turbo colormap over inverse depth, near is red.
pub fn depth_to_color(depth: f64, max_depth: f64) -> rerun::Color {
    let t = if depth > 0.0 && max_depth > 0.0 {
        (1.0 - depth / max_depth).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let c = colorous::TURBO.eval_continuous(t);
    rerun::Color::from_rgb(c.r, c.g, c.b)
}

/// Logs the stereo points, the stereo segments and their 3D reconstruction
/// of one frame under `topic`, on the `frame` timeline.
pub fn log_stereo_frame<I: Sync>(
    recording: &RecordingStream,
    topic: &str,
    frame: &StereoFrame<I>,
    max_depth: f64,
) -> anyhow::Result<()> {
    recording.set_time("frame", rerun::TimeCell::from_sequence(frame.frame_idx() as i64));

    let (pts, colors): (Vec<_>, Vec<_>) = frame
        .points()
        .iter()
        .map(|p| {
            (
                (p.pl().x as f32, p.pl().y as f32),
                depth_to_color(p.p3d().z, max_depth),
            )
        })
        .unzip();
    recording.log(
        format!("{}/left/pts", topic),
        &rerun::Points2D::new(rerun_shift(&pts))
            .with_colors(colors.clone())
            .with_radii([rerun::Radius::new_ui_points(3.0)]),
    )?;

    let strips: Vec<Vec<[f32; 2]>> = frame
        .lines()
        .iter()
        .map(|l| {
            vec![
                [l.spl().x as f32 + 0.5, l.spl().y as f32 + 0.5],
                [l.epl().x as f32 + 0.5, l.epl().y as f32 + 0.5],
            ]
        })
        .collect();
    recording.log(format!("{}/left/lines", topic), &rerun::LineStrips2D::new(strips))?;

    let p3ds: Vec<[f32; 3]> = frame
        .points()
        .iter()
        .map(|p| [p.p3d().x as f32, p.p3d().y as f32, p.p3d().z as f32])
        .collect();
    recording.log(
        format!("{}/world/pts", topic),
        &rerun::Points3D::new(p3ds).with_colors(colors),
    )?;

    let strips3d: Vec<Vec<[f32; 3]>> = frame
        .lines()
        .iter()
        .map(|l| {
            vec![
                [l.sp3d().x as f32, l.sp3d().y as f32, l.sp3d().z as f32],
                [l.ep3d().x as f32, l.ep3d().y as f32, l.ep3d().z as f32],
            ]
        })
        .collect();
    recording.log(
        format!("{}/world/lines", topic),
        &rerun::LineStrips3D::new(strips3d),
    )?;
    Ok(())
}
