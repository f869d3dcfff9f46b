pub mod camera;
pub mod config;
pub mod descriptor;
pub mod detection;
pub mod features;
pub mod geometry;
pub mod io;
pub mod matching;
pub mod mutual;
pub mod stereo_frame;
pub mod synthetic;
pub mod threshold;
pub mod visualization;

pub use camera::{PinholeStereoCamera, StereoCamera};
pub use config::{DetectorParams, StereoConfig};
pub use descriptor::DescriptorMatrix;
pub use detection::{Detections, FeatureDetector};
pub use features::{LineFeature, LineSegment, PointFeature};
pub use matching::{BruteForceHamming, DescriptorMatcher, KnnMatch, Match};
pub use stereo_frame::{StageTimings, StereoFrame};
pub use threshold::DescriptorThresholds;
