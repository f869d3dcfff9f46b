use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Rectified stereo camera as seen by the feature pipeline.
pub trait StereoCamera
where
    Self: Send + Sync,
{
    fn back_project(&self, x: f64, y: f64, disparity: f64) -> na::Vector3<f64>;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Pinhole model of a rectified stereo rig, left camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinholeStereoCamera {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub baseline: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for PinholeStereoCamera {
    fn default() -> Self {
        // EuRoC cam0 after rectification
        Self {
            fx: 435.2,
            fy: 435.2,
            cx: 367.4,
            cy: 252.2,
            baseline: 0.11,
            width: 752,
            height: 480,
        }
    }
}

impl PinholeStereoCamera {
    pub fn new(
        fx: f64,
        fy: f64,
        cx: f64,
        cy: f64,
        baseline: f64,
        width: u32,
        height: u32,
    ) -> PinholeStereoCamera {
        PinholeStereoCamera {
            fx,
            fy,
            cx,
            cy,
            baseline,
            width,
            height,
        }
    }

    /// Projects a point in the left camera frame to the left pixel and the
    /// x coordinate on the right image. `None` behind the rig.
    pub fn project(&self, p3d: &na::Vector3<f64>) -> Option<(na::Vector2<f64>, f64)> {
        if p3d.z <= 0.0 {
            return None;
        }
        let u = self.fx * p3d.x / p3d.z + self.cx;
        let v = self.fy * p3d.y / p3d.z + self.cy;
        let disparity = self.fx * self.baseline / p3d.z;
        Some((na::Vector2::new(u, v), u - disparity))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.width > 0 && self.height > 0,
            "image size must be positive, got {}x{}",
            self.width,
            self.height
        );
        let positive = [("fx", self.fx), ("fy", self.fy), ("baseline", self.baseline)];
        for (name, value) in positive {
            anyhow::ensure!(
                value.is_finite() && value > 0.0,
                "{} must be finite and positive, got {}",
                name,
                value
            );
        }
        anyhow::ensure!(
            self.cx.is_finite() && self.cy.is_finite(),
            "principal point must be finite"
        );
        Ok(())
    }

    pub fn in_image(&self, u: f64, v: f64) -> bool {
        u >= 0.0 && u < self.width as f64 && v >= 0.0 && v < self.height as f64
    }
}

impl StereoCamera for PinholeStereoCamera {
    fn back_project(&self, x: f64, y: f64, disparity: f64) -> na::Vector3<f64> {
        let z = self.fx * self.baseline / disparity;
        na::Vector3::new(
            (x - self.cx) * z / self.fx,
            (y - self.cy) * z / self.fy,
            z,
        )
    }
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
}
