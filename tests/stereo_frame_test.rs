mod common;

use std::sync::Arc;

use nalgebra as na;
use stereo_features::camera::{PinholeStereoCamera, StereoCamera};
use stereo_features::config::StereoConfig;
use stereo_features::descriptor::DescriptorMatrix;
use stereo_features::detection::Detections;
use stereo_features::features::LineSegment;
use stereo_features::matching::BruteForceHamming;
use stereo_features::stereo_frame::StereoFrame;
use stereo_features::synthetic::{SceneParams, SyntheticDetector, generate_stereo_pair};

use common::{FixedDetector, descriptor_fixture, matrix, v};

fn shared_camera() -> Arc<dyn StereoCamera> {
    Arc::new(PinholeStereoCamera::default())
}

fn corner_pair() -> (Detections, Detections) {
    let (pdesc_l, pdesc_r) = descriptor_fixture();
    let left = Detections {
        points: vec![v(100.0, 50.0), v(300.0, 200.0), v(400.0, 300.0)],
        point_descriptors: pdesc_l,
        lines: Vec::new(),
        line_descriptors: DescriptorMatrix::new(4),
    };
    let right = Detections {
        points: vec![v(92.0, 50.0), v(50.0, 400.0), v(200.0, 100.0)],
        point_descriptors: pdesc_r,
        lines: Vec::new(),
        line_descriptors: DescriptorMatrix::new(4),
    };
    (left, right)
}

fn line_pair(length: f32) -> (Detections, Detections) {
    let (ldesc_l, ldesc_r) = descriptor_fixture();
    let dx = length / 20.0;
    let left = Detections {
        points: Vec::new(),
        point_descriptors: DescriptorMatrix::new(4),
        lines: vec![
            LineSegment::new(v(200.0, 100.0), v(200.0 + dx, 100.0 + length)),
            LineSegment::new(v(400.0, 50.0), v(420.0, 250.0)),
            LineSegment::new(v(500.0, 300.0), v(520.0, 450.0)),
        ],
        line_descriptors: ldesc_l,
    };
    let right = Detections {
        points: Vec::new(),
        point_descriptors: DescriptorMatrix::new(4),
        lines: vec![
            LineSegment::new(v(190.0, 100.0), v(190.0 + dx, 100.0 + length)),
            LineSegment::new(v(30.0, 20.0), v(60.0, 200.0)),
            LineSegment::new(v(600.0, 100.0), v(610.0, 400.0)),
        ],
        line_descriptors: ldesc_r,
    };
    (left, right)
}

#[test]
fn test_single_corner_pair() {
    let camera = PinholeStereoCamera::default();
    let (left, right) = corner_pair();
    let mut frame = StereoFrame::new(0, left, right, Arc::new(camera));
    frame.extract_stereo_features(&FixedDetector, &BruteForceHamming, &StereoConfig::default());

    assert!(frame.is_extracted());
    assert_eq!(frame.points().len(), 1);
    assert!(frame.lines().is_empty());

    let p = &frame.points()[0];
    assert_eq!(p.disparity(), 8.0);
    assert_eq!(*p.pl(), na::Vector2::new(100.0, 50.0));
    assert_eq!(*p.p3d(), camera.back_project(100.0, 50.0, 8.0));
    assert!((p.p3d().z - camera.fx * camera.baseline / 8.0).abs() < 1e-9);

    // left descriptors pruned to the surviving row, right ones kept
    assert_eq!(frame.point_descriptors().rows(), 1);
    assert_eq!(frame.point_descriptors().row(0), &[0, 0, 0, 0]);
    assert_eq!(frame.right_point_descriptors().rows(), 3);
}

#[test]
fn test_single_right_feature() {
    let (left, _) = corner_pair();
    let right = Detections {
        points: vec![v(92.0, 50.0)],
        point_descriptors: matrix(&[[0x00, 0x00, 0x00, 0x00]]),
        lines: Vec::new(),
        line_descriptors: DescriptorMatrix::new(4),
    };
    let mut frame = StereoFrame::new(0, left, right, shared_camera());
    frame.extract_stereo_features(&FixedDetector, &BruteForceHamming, &StereoConfig::default());

    // no left candidate has a second-best, only the exact match is below nn
    assert_eq!(frame.points().len(), 1);
    assert_eq!(frame.points()[0].disparity(), 8.0);
    assert_eq!(*frame.points()[0].pl(), na::Vector2::new(100.0, 50.0));
    assert_eq!(frame.point_descriptors().rows(), 1);
    assert_eq!(frame.point_descriptors().row(0), &[0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn test_single_line_pair() {
    let (left, right) = line_pair(200.0);
    let mut frame = StereoFrame::new(3, left, right, shared_camera());
    frame.extract_stereo_features(&FixedDetector, &BruteForceHamming, &StereoConfig::default());

    assert!(frame.points().is_empty());
    assert_eq!(frame.lines().len(), 1);
    let line = &frame.lines()[0];
    assert!((line.sdisp() - 10.0).abs() < 1e-9);
    assert!((line.edisp() - 10.0).abs() < 1e-9);
    assert_eq!(frame.line_descriptors().rows(), 1);
}

#[test]
fn test_short_line_pair_excluded() {
    let (left, right) = line_pair(10.0);
    let mut frame = StereoFrame::new(3, left, right, shared_camera());
    frame.extract_stereo_features(&FixedDetector, &BruteForceHamming, &StereoConfig::default());
    assert!(frame.lines().is_empty());
    assert_eq!(frame.line_descriptors().rows(), 0);
}

#[test]
fn test_empty_side_skips_pipeline() {
    let (left, mut right) = corner_pair();
    right.points.clear();
    right.point_descriptors = DescriptorMatrix::new(4);
    let mut frame = StereoFrame::new(0, left, right, shared_camera());
    frame.extract_stereo_features(&FixedDetector, &BruteForceHamming, &StereoConfig::default());
    assert!(frame.points().is_empty());
    assert!(frame.lines().is_empty());
    // nothing was filtered, detector output is kept as is
    assert_eq!(frame.point_descriptors().rows(), 3);
}

#[test]
fn test_disabled_category() {
    let (left, right) = corner_pair();
    let config = StereoConfig {
        has_points: false,
        ..Default::default()
    };
    let mut frame = StereoFrame::new(0, left, right, shared_camera());
    frame.extract_stereo_features(&FixedDetector, &BruteForceHamming, &config);
    assert!(frame.points().is_empty());
}

#[test]
fn test_extract_runs_once() {
    let (left, right) = corner_pair();
    let mut frame = StereoFrame::new(0, left, right, shared_camera());
    let config = StereoConfig::default();
    frame.extract_stereo_features(&FixedDetector, &BruteForceHamming, &config);
    let points = frame.points().to_vec();
    let timings = *frame.timings();
    frame.extract_stereo_features(&FixedDetector, &BruteForceHamming, &config);
    assert_eq!(frame.points(), points.as_slice());
    assert_eq!(*frame.timings(), timings);
}

#[test]
fn test_initial_pose() {
    let (left, right) = corner_pair();
    let dt = na::Matrix4::new_translation(&na::Vector3::new(0.1, 0.0, 0.5));
    let frame = StereoFrame::with_initial_pose(7, left, right, shared_camera(), dt);
    assert_eq!(frame.frame_idx(), 7);
    assert_eq!(frame.initial_pose(), Some(&dt));
    assert!(!frame.is_extracted());

    let (left, right) = corner_pair();
    let frame = StereoFrame::new(7, left, right, shared_camera());
    assert!(frame.initial_pose().is_none());
}

#[test]
fn test_sequential_matches_parallel() {
    let camera = PinholeStereoCamera::default();
    let pair = generate_stereo_pair(&camera, &SceneParams::default(), 42);
    let shared: Arc<dyn StereoCamera> = Arc::new(camera);

    let extract = |lr_in_parallel: bool| {
        let config = StereoConfig {
            lr_in_parallel,
            ..Default::default()
        };
        let mut frame = StereoFrame::new(0, pair.left.clone(), pair.right.clone(), shared.clone());
        frame.extract_stereo_features(&SyntheticDetector, &BruteForceHamming, &config);
        frame
    };
    let sequential = extract(false);
    let parallel = extract(true);

    assert!(!sequential.points().is_empty());
    assert_eq!(sequential.points(), parallel.points());
    assert_eq!(sequential.lines(), parallel.lines());
    assert_eq!(sequential.point_descriptors(), parallel.point_descriptors());
    assert_eq!(sequential.line_descriptors(), parallel.line_descriptors());
}

#[test]
fn test_synthetic_invariants() {
    let camera = PinholeStereoCamera::default();
    let params = SceneParams {
        pixel_noise: 0.0,
        ..Default::default()
    };
    let pair = generate_stereo_pair(&camera, &params, 7);
    let left_points = pair.left.detections.points.clone();
    let config = StereoConfig::default();

    let mut frame = StereoFrame::new(0, pair.left, pair.right, Arc::new(camera));
    frame.extract_stereo_features(&SyntheticDetector, &BruteForceHamming, &config);

    assert!(!frame.points().is_empty());
    assert_eq!(frame.point_descriptors().rows(), frame.points().len());
    assert_eq!(frame.line_descriptors().rows(), frame.lines().len());

    for p in frame.points() {
        assert!(p.disparity() >= config.min_disp);
        let idx = left_points
            .iter()
            .position(|q| q.x as f64 == p.pl().x && q.y as f64 == p.pl().y)
            .unwrap();
        assert!(idx < pair.points_3d.len(), "outlier accepted");
        let gt = pair.points_3d[idx];
        assert!(((p.p3d().z - gt.z) / gt.z).abs() < 1e-3);
    }

    for l in frame.lines() {
        assert!(l.sdisp() >= config.min_disp);
        assert!(l.edisp() >= config.min_disp);
        let le = l.le();
        assert!((le.x * le.x + le.y * le.y - 1.0).abs() < 1e-9);
    }
}
