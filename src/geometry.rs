use std::f64::consts::PI;

use glam::Vec2;
use nalgebra as na;

use crate::camera::StereoCamera;
use crate::config::StereoConfig;
use crate::descriptor::DescriptorMatrix;
use crate::features::{LineFeature, LineSegment, PointFeature};

/// Signed difference `alpha - beta` wrapped into [-π, π].
pub fn angle_diff(alpha: f64, beta: f64) -> f64 {
    let mut theta = alpha - beta;
    if theta > PI {
        theta -= 2.0 * PI;
    }
    if theta < -PI {
        theta += 2.0 * PI;
    }
    theta
}

/// Homogeneous line `(a, b, c)` through two pixels, `a x + b y + c = 0`.
pub fn line_equation(start: Vec2, end: Vec2) -> na::Vector3<f64> {
    let sp = na::Vector3::new(start.x as f64, start.y as f64, 1.0);
    let ep = na::Vector3::new(end.x as f64, end.y as f64, 1.0);
    sp.cross(&ep)
}

/// Line equation scaled to `a² + b² = 1`. `None` for a degenerate segment.
pub fn normalized_line_equation(start: Vec2, end: Vec2) -> Option<na::Vector3<f64>> {
    let le = line_equation(start, end);
    let norm = (le.x * le.x + le.y * le.y).sqrt();
    if norm <= f64::EPSILON {
        return None;
    }
    Some(le / norm)
}

/// Checks mutually matched point pairs against the epipolar and disparity
/// constraints and back-projects the survivors.
///
/// Returns the features together with the left descriptor rows that produced
/// them, in the same order.
pub fn verify_point_matches(
    pairs: &[(usize, usize)],
    points_l: &[Vec2],
    points_r: &[Vec2],
    pdesc_l: &DescriptorMatrix,
    camera: &dyn StereoCamera,
    config: &StereoConfig,
) -> (Vec<PointFeature>, DescriptorMatrix) {
    let mut kept = Vec::with_capacity(pairs.len());
    let mut stereo_pt = Vec::with_capacity(pairs.len());
    for &(lr_qdx, lr_tdx) in pairs {
        let pl = points_l[lr_qdx];
        let pr = points_r[lr_tdx];
        if ((pl.y - pr.y) as f64).abs() > config.max_dist_epip {
            continue;
        }
        let disp = pl.x as f64 - pr.x as f64;
        if disp < config.min_disp {
            continue;
        }
        let pl = na::Vector2::new(pl.x as f64, pl.y as f64);
        let p3d = camera.back_project(pl.x, pl.y, disp);
        stereo_pt.push(PointFeature::new(pl, disp, p3d));
        kept.push(lr_qdx);
    }
    (stereo_pt, pdesc_l.select_rows(&kept))
}

/// Checks mutually matched line pairs and back-projects both endpoints.
///
/// The right segment only contributes its supporting line: the left
/// endpoints' rows are intersected with it, so endpoint disparities do not
/// depend on where the right detector cut the segment.
pub fn verify_line_matches(
    pairs: &[(usize, usize)],
    lines_l: &[LineSegment],
    lines_r: &[LineSegment],
    ldesc_l: &DescriptorMatrix,
    camera: &dyn StereoCamera,
    config: &StereoConfig,
) -> (Vec<LineFeature>, DescriptorMatrix) {
    let min_line_length_th =
        config.min_line_length * camera.width().min(camera.height()) as f64;

    let mut kept = Vec::with_capacity(pairs.len());
    let mut stereo_ls = Vec::with_capacity(pairs.len());
    for &(lr_qdx, lr_tdx) in pairs {
        let line_l = &lines_l[lr_qdx];
        let line_r = &lines_r[lr_tdx];

        if line_r.length as f64 <= min_line_length_th {
            continue;
        }

        let angle_l = line_l.angle as f64;
        let angle_r = line_r.angle as f64;
        if angle_l.abs() < config.min_horiz_angle
            || angle_r.abs() < config.min_horiz_angle
            || angle_diff(angle_l, angle_r).abs() >= config.max_angle_diff
        {
            continue;
        }

        let le_r = line_equation(line_r.start, line_r.end);
        // le_r.x is the divisor below
        if le_r.x.abs() <= config.line_horiz_th {
            continue;
        }
        let row_to_x = |y: f64| -(le_r.z + le_r.y * y) / le_r.x;

        let sp_l = na::Vector2::new(line_l.start.x as f64, line_l.start.y as f64);
        let ep_l = na::Vector2::new(line_l.end.x as f64, line_l.end.y as f64);
        let disp_s = sp_l.x - row_to_x(sp_l.y);
        let disp_e = ep_l.x - row_to_x(ep_l.y);
        if disp_s < config.min_disp || disp_e < config.min_disp {
            continue;
        }

        let Some(le_l) = normalized_line_equation(line_l.start, line_l.end) else {
            continue;
        };

        let sp3d = camera.back_project(sp_l.x, sp_l.y, disp_s);
        let ep3d = camera.back_project(ep_l.x, ep_l.y, disp_e);
        stereo_ls.push(LineFeature::new(sp_l, disp_s, sp3d, ep_l, disp_e, ep3d, le_l));
        kept.push(lr_qdx);
    }
    (stereo_ls, ldesc_l.select_rows(&kept))
}
