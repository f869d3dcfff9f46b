#![allow(dead_code)]

use glam::Vec2;
use stereo_features::config::StereoConfig;
use stereo_features::descriptor::DescriptorMatrix;
use stereo_features::detection::{Detections, FeatureDetector};

/// Detector whose "image" is the detection result itself.
pub struct FixedDetector;

impl FeatureDetector for FixedDetector {
    type Image = Detections;

    fn detect(&self, image: &Detections, config: &StereoConfig) -> Detections {
        let mut out = image.clone();
        if !config.has_points {
            out.points.clear();
            out.point_descriptors = DescriptorMatrix::new(image.point_descriptors.row_bytes());
        }
        if !config.has_lines {
            out.lines.clear();
            out.line_descriptors = DescriptorMatrix::new(image.line_descriptors.row_bytes());
        }
        out
    }
}

pub fn matrix(rows: &[[u8; 4]]) -> DescriptorMatrix {
    let mut m = DescriptorMatrix::new(4);
    for r in rows {
        m.push_row(r);
    }
    m
}

/// Three left and three right 32-bit descriptors where only left 0 and
/// right 0 survive the adaptive thresholds (distance 0, gap 16), while
/// left 1 and 2 sit exactly on the distance median.
pub fn descriptor_fixture() -> (DescriptorMatrix, DescriptorMatrix) {
    let a = [0x00, 0x00, 0x00, 0x00];
    let b = [0xff, 0xff, 0x0f, 0x00];
    let c = [0xff, 0xff, 0xff, 0x0f];
    let x = [0xff, 0xff, 0xff, 0xff];
    let y = [0xff, 0xff, 0x00, 0x00];
    (matrix(&[a, b, c]), matrix(&[a, x, y]))
}

pub fn v(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}
