use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use stereo_features::synthetic::{SceneParams, SyntheticDetector, generate_stereo_pair};
use stereo_features::{
    BruteForceHamming, DescriptorMatcher, DescriptorThresholds, PinholeStereoCamera, StereoCamera,
    StereoConfig, StereoFrame,
};

fn bench_threshold_estimate(c: &mut Criterion) {
    let camera = PinholeStereoCamera::default();
    let pair = generate_stereo_pair(&camera, &SceneParams::default(), 0);
    let matches = BruteForceHamming.knn_match(
        &pair.left.detections.point_descriptors,
        &pair.right.detections.point_descriptors,
    );

    c.bench_function("descriptor_thresholds", |b| {
        b.iter(|| DescriptorThresholds::estimate(black_box(&matches)))
    });
}

fn bench_extract_stereo_features(c: &mut Criterion) {
    let camera = PinholeStereoCamera::default();
    let pair = generate_stereo_pair(&camera, &SceneParams::default(), 0);
    let shared_camera: Arc<dyn StereoCamera> = Arc::new(camera);

    for (name, lr_in_parallel) in [("extract_sequential", false), ("extract_parallel", true)] {
        let config = StereoConfig {
            lr_in_parallel,
            ..Default::default()
        };
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut frame = StereoFrame::new(
                    0,
                    pair.left.clone(),
                    pair.right.clone(),
                    shared_camera.clone(),
                );
                frame.extract_stereo_features(&SyntheticDetector, &BruteForceHamming, &config);
                black_box(frame.points().len())
            })
        });
    }
}

criterion_group!(benches, bench_threshold_estimate, bench_extract_stereo_features);
criterion_main!(benches);
