use glam::Vec2;
use nalgebra as na;

/// Line segment as returned by a line detector, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Vec2,
    pub end: Vec2,
    /// Orientation `atan2(end.y - start.y, end.x - start.x)` in radians.
    pub angle: f32,
    pub length: f32,
}

impl LineSegment {
    pub fn new(start: Vec2, end: Vec2) -> LineSegment {
        let d = end - start;
        LineSegment {
            start,
            end,
            angle: d.y.atan2(d.x),
            length: d.length(),
        }
    }
}

/// Stereo point: left-image pixel, disparity and back-projected 3D point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature {
    pl: na::Vector2<f64>,
    disparity: f64,
    p3d: na::Vector3<f64>,
}

impl PointFeature {
    pub fn new(pl: na::Vector2<f64>, disparity: f64, p3d: na::Vector3<f64>) -> PointFeature {
        PointFeature { pl, disparity, p3d }
    }
    pub fn pl(&self) -> &na::Vector2<f64> {
        &self.pl
    }
    pub fn disparity(&self) -> f64 {
        self.disparity
    }
    pub fn p3d(&self) -> &na::Vector3<f64> {
        &self.p3d
    }
}

/// Stereo line segment. Endpoints are left-image pixels, each with its own
/// disparity and 3D point. `le` is the left-image line equation scaled so that
/// `le.x² + le.y² = 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeature {
    spl: na::Vector2<f64>,
    sdisp: f64,
    sp3d: na::Vector3<f64>,
    epl: na::Vector2<f64>,
    edisp: f64,
    ep3d: na::Vector3<f64>,
    le: na::Vector3<f64>,
}

impl LineFeature {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spl: na::Vector2<f64>,
        sdisp: f64,
        sp3d: na::Vector3<f64>,
        epl: na::Vector2<f64>,
        edisp: f64,
        ep3d: na::Vector3<f64>,
        le: na::Vector3<f64>,
    ) -> LineFeature {
        LineFeature {
            spl,
            sdisp,
            sp3d,
            epl,
            edisp,
            ep3d,
            le,
        }
    }
    pub fn spl(&self) -> &na::Vector2<f64> {
        &self.spl
    }
    pub fn epl(&self) -> &na::Vector2<f64> {
        &self.epl
    }
    pub fn sdisp(&self) -> f64 {
        self.sdisp
    }
    pub fn edisp(&self) -> f64 {
        self.edisp
    }
    pub fn sp3d(&self) -> &na::Vector3<f64> {
        &self.sp3d
    }
    pub fn ep3d(&self) -> &na::Vector3<f64> {
        &self.ep3d
    }
    pub fn le(&self) -> &na::Vector3<f64> {
        &self.le
    }
}
