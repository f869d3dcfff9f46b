use std::sync::Arc;
use std::time::Instant;

use nalgebra as na;
use serde::Serialize;

use crate::camera::StereoCamera;
use crate::config::StereoConfig;
use crate::descriptor::DescriptorMatrix;
use crate::detection::{Detections, FeatureDetector};
use crate::features::{LineFeature, PointFeature};
use crate::geometry::{verify_line_matches, verify_point_matches};
use crate::matching::DescriptorMatcher;
use crate::mutual::{mutual_best_matches, sort_by_query_idx};
use crate::threshold::DescriptorThresholds;

/// Wall-clock time per pipeline stage, summed over the point and line pipelines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub detection_ms: f64,
    pub matching_ms: f64,
    pub thresholds_ms: f64,
    pub sorting_ms: f64,
    pub filtering_ms: f64,
}

impl StageTimings {
    pub fn total_ms(&self) -> f64 {
        self.detection_ms + self.matching_ms + self.thresholds_ms + self.sorting_ms + self.filtering_ms
    }
}

fn elapsed_ms(clk: &Instant) -> f64 {
    clk.elapsed().as_secs_f64() * 1000.0
}

/// Runs `a` and `b` as two rayon tasks when `parallel` is set, one after the
/// other otherwise. Each closure owns its output, so both forms agree.
fn fork_join<A, B, RA, RB>(parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if parallel {
        rayon::join(a, b)
    } else {
        (a(), b())
    }
}

/// One synchronized stereo pair and the stereo features extracted from it.
pub struct StereoFrame<I> {
    frame_idx: usize,
    img_l: I,
    img_r: I,
    camera: Arc<dyn StereoCamera>,
    dt_ini: Option<na::Matrix4<f64>>,
    stereo_pt: Vec<PointFeature>,
    stereo_ls: Vec<LineFeature>,
    pdesc_l: DescriptorMatrix,
    pdesc_r: DescriptorMatrix,
    ldesc_l: DescriptorMatrix,
    ldesc_r: DescriptorMatrix,
    timings: StageTimings,
    extracted: bool,
}

impl<I: Sync> StereoFrame<I> {
    pub fn new(frame_idx: usize, img_l: I, img_r: I, camera: Arc<dyn StereoCamera>) -> Self {
        StereoFrame {
            frame_idx,
            img_l,
            img_r,
            camera,
            dt_ini: None,
            stereo_pt: Vec::new(),
            stereo_ls: Vec::new(),
            pdesc_l: DescriptorMatrix::default(),
            pdesc_r: DescriptorMatrix::default(),
            ldesc_l: DescriptorMatrix::default(),
            ldesc_r: DescriptorMatrix::default(),
            timings: StageTimings::default(),
            extracted: false,
        }
    }

    /// Same as [`StereoFrame::new`] with an initial relative pose estimate.
    pub fn with_initial_pose(
        frame_idx: usize,
        img_l: I,
        img_r: I,
        camera: Arc<dyn StereoCamera>,
        dt_ini: na::Matrix4<f64>,
    ) -> Self {
        let mut frame = Self::new(frame_idx, img_l, img_r, camera);
        frame.dt_ini = Some(dt_ini);
        frame
    }

    /// Detects, matches and verifies point and line features. Populates the
    /// frame once; later calls leave it untouched.
    pub fn extract_stereo_features<D, M>(&mut self, detector: &D, matcher: &M, config: &StereoConfig)
    where
        D: FeatureDetector<Image = I>,
        M: DescriptorMatcher,
    {
        if self.extracted {
            log::warn!("frame {} already extracted, skipping", self.frame_idx);
            return;
        }
        self.extracted = true;

        let clk = Instant::now();
        let (img_l, img_r) = (&self.img_l, &self.img_r);
        let (det_l, det_r) = fork_join(
            config.lr_in_parallel,
            || detector.detect(img_l, config),
            || detector.detect(img_r, config),
        );
        self.timings.detection_ms = elapsed_ms(&clk);
        log::trace!(
            "frame {} detected points {}/{} lines {}/{}",
            self.frame_idx,
            det_l.points.len(),
            det_r.points.len(),
            det_l.lines.len(),
            det_r.lines.len()
        );

        let Detections {
            points: points_l,
            point_descriptors: pdesc_l,
            lines: lines_l,
            line_descriptors: ldesc_l,
        } = det_l;
        let Detections {
            points: points_r,
            point_descriptors: pdesc_r,
            lines: lines_r,
            line_descriptors: ldesc_r,
        } = det_r;

        self.pdesc_l = pdesc_l;
        self.pdesc_r = pdesc_r;
        self.ldesc_l = ldesc_l;
        self.ldesc_r = ldesc_r;

        if config.has_points && !points_l.is_empty() && !points_r.is_empty() {
            let pairs = stereo_match(
                &self.pdesc_l,
                &self.pdesc_r,
                matcher,
                config.desc_th_p,
                config.lr_in_parallel,
                &mut self.timings,
            );
            let clk = Instant::now();
            let (stereo_pt, pdesc_l) = verify_point_matches(
                &pairs,
                &points_l,
                &points_r,
                &self.pdesc_l,
                self.camera.as_ref(),
                config,
            );
            self.timings.filtering_ms += elapsed_ms(&clk);
            self.stereo_pt = stereo_pt;
            self.pdesc_l = pdesc_l;
        }

        if config.has_lines && !lines_l.is_empty() && !lines_r.is_empty() {
            let pairs = stereo_match(
                &self.ldesc_l,
                &self.ldesc_r,
                matcher,
                config.desc_th_l,
                config.lr_in_parallel,
                &mut self.timings,
            );
            let clk = Instant::now();
            let (stereo_ls, ldesc_l) = verify_line_matches(
                &pairs,
                &lines_l,
                &lines_r,
                &self.ldesc_l,
                self.camera.as_ref(),
                config,
            );
            self.timings.filtering_ms += elapsed_ms(&clk);
            self.stereo_ls = stereo_ls;
            self.ldesc_l = ldesc_l;
        }

        log::debug!(
            "frame {}: {} points, {} lines | detection {:.3} ms, descriptors {:.3} ms, thresholds {:.3} ms, re-sorting {:.3} ms, loop {:.3} ms, total {:.3} ms",
            self.frame_idx,
            self.stereo_pt.len(),
            self.stereo_ls.len(),
            self.timings.detection_ms,
            self.timings.matching_ms,
            self.timings.thresholds_ms,
            self.timings.sorting_ms,
            self.timings.filtering_ms,
            self.timings.total_ms()
        );
    }

    pub fn frame_idx(&self) -> usize {
        self.frame_idx
    }
    pub fn left_image(&self) -> &I {
        &self.img_l
    }
    pub fn right_image(&self) -> &I {
        &self.img_r
    }
    pub fn camera(&self) -> &Arc<dyn StereoCamera> {
        &self.camera
    }
    pub fn initial_pose(&self) -> Option<&na::Matrix4<f64>> {
        self.dt_ini.as_ref()
    }
    pub fn is_extracted(&self) -> bool {
        self.extracted
    }
    pub fn points(&self) -> &[PointFeature] {
        &self.stereo_pt
    }
    pub fn lines(&self) -> &[LineFeature] {
        &self.stereo_ls
    }
    /// Left point descriptors. Row `i` describes `points()[i]` after the point
    /// pipeline ran; raw detector rows when it was skipped.
    pub fn point_descriptors(&self) -> &DescriptorMatrix {
        &self.pdesc_l
    }
    /// Left line descriptors, pruned like [`StereoFrame::point_descriptors`].
    pub fn line_descriptors(&self) -> &DescriptorMatrix {
        &self.ldesc_l
    }
    pub fn right_point_descriptors(&self) -> &DescriptorMatrix {
        &self.pdesc_r
    }
    pub fn right_line_descriptors(&self) -> &DescriptorMatrix {
        &self.ldesc_r
    }
    pub fn timings(&self) -> &StageTimings {
        &self.timings
    }
}

/// Bidirectional k = 2 matching, adaptive thresholds and the mutual
/// consistency check. Returns `(left, right)` index pairs.
fn stereo_match<M: DescriptorMatcher>(
    desc_l: &DescriptorMatrix,
    desc_r: &DescriptorMatrix,
    matcher: &M,
    multiplier: f64,
    parallel: bool,
    timings: &mut StageTimings,
) -> Vec<(usize, usize)> {
    let clk = Instant::now();
    let (mut matches_lr, mut matches_rl) = fork_join(
        parallel,
        || matcher.knn_match(desc_l, desc_r),
        || matcher.knn_match(desc_r, desc_l),
    );
    timings.matching_ms += elapsed_ms(&clk);

    let clk = Instant::now();
    let Some(thresholds) = DescriptorThresholds::estimate(&matches_lr) else {
        return Vec::new();
    };
    let thresholds = thresholds.scaled(multiplier);
    timings.thresholds_ms += elapsed_ms(&clk);

    let clk = Instant::now();
    sort_by_query_idx(&mut matches_lr);
    sort_by_query_idx(&mut matches_rl);
    timings.sorting_ms += elapsed_ms(&clk);

    let clk = Instant::now();
    let pairs = mutual_best_matches(&matches_lr, &matches_rl, &thresholds);
    timings.filtering_ms += elapsed_ms(&clk);
    log::trace!(
        "{} of {} candidates mutually consistent",
        pairs.len(),
        matches_lr.len()
    );
    pairs
}
