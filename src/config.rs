use serde::{Deserialize, Serialize};

/// Detector tuning. The pipeline hands these to the detector untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub orb_n_features: usize,
    pub orb_scale_factor: f32,
    pub orb_n_levels: u32,
    pub lsd_n_features: usize,
    pub lsd_refine: i32,
    pub lsd_scale: f64,
    pub lsd_sigma_scale: f64,
    pub lsd_quant: f64,
    pub lsd_ang_th: f64,
    pub lsd_log_eps: f64,
    pub lsd_density_th: f64,
    pub lsd_n_bins: i32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            orb_n_features: 800,
            orb_scale_factor: 1.2,
            orb_n_levels: 4,
            lsd_n_features: 300,
            lsd_refine: 0,
            lsd_scale: 1.2,
            lsd_sigma_scale: 0.6,
            lsd_quant: 2.0,
            lsd_ang_th: 22.5,
            lsd_log_eps: 1.0,
            lsd_density_th: 0.6,
            lsd_n_bins: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoConfig {
    pub has_points: bool,
    pub has_lines: bool,
    /// Run left/right detection and both matching directions as two tasks.
    pub lr_in_parallel: bool,
    pub detector: DetectorParams,
    /// Multiplier on the point descriptor thresholds.
    pub desc_th_p: f64,
    /// Multiplier on the line descriptor thresholds.
    pub desc_th_l: f64,
    /// Max vertical offset between stereo points, pixels.
    pub max_dist_epip: f64,
    pub min_disp: f64,
    /// Fraction of min(width, height).
    pub min_line_length: f64,
    /// Radians.
    pub min_horiz_angle: f64,
    /// Radians.
    pub max_angle_diff: f64,
    /// Min |a| of the right line equation (a, b, c).
    pub line_horiz_th: f64,
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self {
            has_points: true,
            has_lines: true,
            lr_in_parallel: true,
            detector: DetectorParams::default(),
            desc_th_p: 1.0,
            desc_th_l: 1.0,
            max_dist_epip: 1.0,
            min_disp: 1.0,
            min_line_length: 0.025,
            min_horiz_angle: 0.1,
            max_angle_diff: 0.2,
            line_horiz_th: 0.1,
        }
    }
}

impl StereoConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let non_negative = [
            ("desc_th_p", self.desc_th_p),
            ("desc_th_l", self.desc_th_l),
            ("max_dist_epip", self.max_dist_epip),
            ("min_line_length", self.min_line_length),
            ("min_horiz_angle", self.min_horiz_angle),
            ("max_angle_diff", self.max_angle_diff),
            ("line_horiz_th", self.line_horiz_th),
        ];
        for (name, value) in non_negative {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "{} must be finite and non-negative, got {}",
                name,
                value
            );
        }
        anyhow::ensure!(
            self.min_disp.is_finite() && self.min_disp > 0.0,
            "min_disp must be positive, got {}",
            self.min_disp
        );
        Ok(())
    }
}
