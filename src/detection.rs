use glam::Vec2;

use crate::config::StereoConfig;
use crate::descriptor::DescriptorMatrix;
use crate::features::LineSegment;

/// Output of one detector run on one image. Descriptor row `i` belongs to
/// feature `i` of the matching sequence.
#[derive(Debug, Clone, Default)]
pub struct Detections {
    pub points: Vec<Vec2>,
    pub point_descriptors: DescriptorMatrix,
    pub lines: Vec<LineSegment>,
    pub line_descriptors: DescriptorMatrix,
}

impl Detections {
    pub fn has_points(&self) -> bool {
        !self.points.is_empty()
    }
    pub fn has_lines(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// Point and line detection plus description.
///
/// Implementations skip categories disabled in `config` and read their own
/// tuning from `config.detector`. Called from two threads at once when
/// `config.lr_in_parallel` is set.
pub trait FeatureDetector: Sync {
    type Image: Sync;

    fn detect(&self, image: &Self::Image, config: &StereoConfig) -> Detections;
}
