use glam::Vec2;
use nalgebra as na;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::camera::{PinholeStereoCamera, StereoCamera};
use crate::config::StereoConfig;
use crate::descriptor::DescriptorMatrix;
use crate::detection::{Detections, FeatureDetector};
use crate::features::LineSegment;

const MAX_ATTEMPTS_PER_FEATURE: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    pub num_points: usize,
    pub num_lines: usize,
    /// Unmatched features added to each view.
    pub num_outliers: usize,
    pub descriptor_bytes: usize,
    /// Max bits flipped in the right-view copy of each descriptor.
    pub noise_bits: u32,
    /// Uniform pixel noise amplitude on point coordinates.
    pub pixel_noise: f32,
    pub min_depth: f64,
    pub max_depth: f64,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            num_points: 200,
            num_lines: 40,
            num_outliers: 20,
            descriptor_bytes: 32,
            noise_bits: 8,
            pixel_noise: 0.3,
            min_depth: 1.5,
            max_depth: 20.0,
        }
    }
}

impl SceneParams {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.min_depth.is_finite() && self.max_depth.is_finite(),
            "depth range must be finite, got [{}, {}]",
            self.min_depth,
            self.max_depth
        );
        anyhow::ensure!(
            self.min_depth > 0.0 && self.min_depth < self.max_depth,
            "need 0 < min_depth < max_depth, got [{}, {}]",
            self.min_depth,
            self.max_depth
        );
        anyhow::ensure!(
            self.pixel_noise.is_finite() && self.pixel_noise >= 0.0,
            "pixel_noise must be finite and non-negative, got {}",
            self.pixel_noise
        );
        anyhow::ensure!(self.descriptor_bytes > 0, "descriptor_bytes must be positive");
        Ok(())
    }
}

/// Stand-in for an image: whatever a detector would report on it.
#[derive(Debug, Clone, Default)]
pub struct SyntheticView {
    pub detections: Detections,
}

/// A rendered stereo pair. Left feature `i` below `points_3d.len()` (resp.
/// `lines_3d.len()`) observes landmark `i`; the right view is shuffled.
#[derive(Debug, Clone)]
pub struct SyntheticStereoPair {
    pub left: SyntheticView,
    pub right: SyntheticView,
    pub points_3d: Vec<na::Vector3<f64>>,
    pub lines_3d: Vec<(na::Vector3<f64>, na::Vector3<f64>)>,
}

/// Replays the features stored in a [`SyntheticView`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticDetector;

impl FeatureDetector for SyntheticDetector {
    type Image = SyntheticView;

    fn detect(&self, image: &SyntheticView, config: &StereoConfig) -> Detections {
        let d = &image.detections;
        let mut out = Detections {
            point_descriptors: DescriptorMatrix::new(d.point_descriptors.row_bytes()),
            line_descriptors: DescriptorMatrix::new(d.line_descriptors.row_bytes()),
            ..Default::default()
        };
        if config.has_points {
            let n = d.points.len().min(config.detector.orb_n_features);
            out.points = d.points[..n].to_vec();
            out.point_descriptors = d.point_descriptors.select_rows(&(0..n).collect::<Vec<_>>());
        }
        if config.has_lines {
            let n = d.lines.len().min(config.detector.lsd_n_features);
            out.lines = d.lines[..n].to_vec();
            out.line_descriptors = d.line_descriptors.select_rows(&(0..n).collect::<Vec<_>>());
        }
        out
    }
}

fn random_descriptor(rng: &mut ChaCha8Rng, bytes: usize) -> Vec<u8> {
    let mut desc = vec![0u8; bytes];
    rng.fill_bytes(&mut desc);
    desc
}

fn flip_bits(rng: &mut ChaCha8Rng, desc: &[u8], noise_bits: u32) -> Vec<u8> {
    let mut out = desc.to_vec();
    if out.is_empty() {
        return out;
    }
    for _ in 0..rng.random_range(0..=noise_bits) {
        let bit = rng.random_range(0..out.len() * 8);
        out[bit / 8] ^= 1 << (bit % 8);
    }
    out
}

fn to_descriptor_matrix(bytes: usize, rows: &[Vec<u8>]) -> DescriptorMatrix {
    let mut m = DescriptorMatrix::with_capacity(bytes, rows.len());
    for r in rows {
        m.push_row(r);
    }
    m
}

/// Samples a left pixel and a depth, returning the 3D point and its stereo
/// projection when both views see it.
fn sample_landmark(
    rng: &mut ChaCha8Rng,
    camera: &PinholeStereoCamera,
    params: &SceneParams,
) -> Option<(na::Vector3<f64>, na::Vector2<f64>, f64)> {
    let u = rng.random_range(0.0..camera.width as f64);
    let v = rng.random_range(0.0..camera.height as f64);
    let z = rng.random_range(params.min_depth..params.max_depth);
    let disparity = camera.fx * camera.baseline / z;
    let p3d = camera.back_project(u, v, disparity);
    let (pl, ur) = camera.project(&p3d)?;
    if camera.in_image(pl.x, pl.y) && camera.in_image(ur, pl.y) {
        Some((p3d, pl, ur))
    } else {
        None
    }
}

/// Renders `params.num_points` points and `params.num_lines` segments seen by
/// a rectified rig, plus unmatched outliers on both sides.
///
/// Panics on a camera or scene rejected by their `validate`.
pub fn generate_stereo_pair(
    camera: &PinholeStereoCamera,
    params: &SceneParams,
    seed: u64,
) -> SyntheticStereoPair {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let bytes = params.descriptor_bytes;
    let noise = params.pixel_noise;

    let mut points_3d = Vec::with_capacity(params.num_points);
    let mut left_pts = Vec::new();
    let mut right_pts = Vec::new();
    for _ in 0..params.num_points * MAX_ATTEMPTS_PER_FEATURE {
        if points_3d.len() == params.num_points {
            break;
        }
        let Some((p3d, pl, ur)) = sample_landmark(&mut rng, camera, params) else {
            continue;
        };
        let mut jitter = || {
            if noise > 0.0 {
                rng.random_range(-noise..noise)
            } else {
                0.0
            }
        };
        let l = Vec2::new(pl.x as f32 + jitter(), pl.y as f32 + jitter());
        let r = Vec2::new(ur as f32 + jitter(), pl.y as f32 + jitter());
        let desc = random_descriptor(&mut rng, bytes);
        let desc_r = flip_bits(&mut rng, &desc, params.noise_bits);
        points_3d.push(p3d);
        left_pts.push((l, desc));
        right_pts.push((r, desc_r));
    }

    let mut lines_3d = Vec::with_capacity(params.num_lines);
    let mut left_lines = Vec::new();
    let mut right_lines = Vec::new();
    for _ in 0..params.num_lines * MAX_ATTEMPTS_PER_FEATURE {
        if lines_3d.len() == params.num_lines {
            break;
        }
        let (Some(s), Some(e)) = (
            sample_landmark(&mut rng, camera, params),
            sample_landmark(&mut rng, camera, params),
        ) else {
            continue;
        };
        let (sp3d, spl, sur) = s;
        let (ep3d, epl, eur) = e;
        let seg_l = LineSegment::new(
            Vec2::new(spl.x as f32, spl.y as f32),
            Vec2::new(epl.x as f32, epl.y as f32),
        );
        if seg_l.length < 0.05 * camera.width.min(camera.height) as f32 {
            continue;
        }
        // the right detector cuts the segment at slightly different places
        let rs = na::Vector2::new(sur, spl.y);
        let re = na::Vector2::new(eur, epl.y);
        let ts: f64 = rng.random_range(-0.05..0.05);
        let te: f64 = rng.random_range(-0.05..0.05);
        let rs_cut = rs + (re - rs) * ts;
        let re_cut = re + (rs - re) * te;
        let seg_r = LineSegment::new(
            Vec2::new(rs_cut.x as f32, rs_cut.y as f32),
            Vec2::new(re_cut.x as f32, re_cut.y as f32),
        );
        let desc = random_descriptor(&mut rng, bytes);
        let desc_r = flip_bits(&mut rng, &desc, params.noise_bits);
        lines_3d.push((sp3d, ep3d));
        left_lines.push((seg_l, desc));
        right_lines.push((seg_r, desc_r));
    }

    for _ in 0..params.num_outliers {
        for pts in [&mut left_pts, &mut right_pts] {
            let p = Vec2::new(
                rng.random_range(0.0..camera.width as f32),
                rng.random_range(0.0..camera.height as f32),
            );
            let desc = random_descriptor(&mut rng, bytes);
            pts.push((p, desc));
        }
    }

    right_pts.shuffle(&mut rng);
    right_lines.shuffle(&mut rng);

    let view = |pts: Vec<(Vec2, Vec<u8>)>, lines: Vec<(LineSegment, Vec<u8>)>| {
        let (points, pdesc): (Vec<_>, Vec<_>) = pts.into_iter().unzip();
        let (lines, ldesc): (Vec<_>, Vec<_>) = lines.into_iter().unzip();
        SyntheticView {
            detections: Detections {
                points,
                point_descriptors: to_descriptor_matrix(bytes, &pdesc),
                lines,
                line_descriptors: to_descriptor_matrix(bytes, &ldesc),
            },
        }
    };

    SyntheticStereoPair {
        left: view(left_pts, left_lines),
        right: view(right_pts, right_lines),
        points_3d,
        lines_3d,
    }
}

/// One stereo pair per frame, frame `i` seeded with `seed + i`.
pub fn generate_sequence(
    camera: &PinholeStereoCamera,
    params: &SceneParams,
    num_frames: usize,
    seed: u64,
) -> Vec<SyntheticStereoPair> {
    (0..num_frames)
        .map(|i| generate_stereo_pair(camera, params, seed + i as u64))
        .collect()
}
