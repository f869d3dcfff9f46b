use crate::matching::KnnMatch;

/// Adaptive acceptance thresholds derived from one direction's match set.
///
/// Historically called a "MAD" estimate, but both values are plain medians:
/// `nn` of best-match distances and `nn12` of distance gaps. A deviation-based
/// statistic would change which matches survive, so the median is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorThresholds {
    pub nn: f64,
    pub nn12: f64,
}

impl DescriptorThresholds {
    /// Returns `None` for an empty match set.
    ///
    /// `nn` is element `n / 2` of the best distances sorted ascending and `nn12`
    /// is element `n / 2` of the gaps sorted descending, so odd counts yield the
    /// exact median of both. Gaps are taken over candidates that have a
    /// second-best match; `nn12` is 0 when none does.
    pub fn estimate(matches: &[KnnMatch]) -> Option<DescriptorThresholds> {
        if matches.is_empty() {
            return None;
        }

        let mut nn_dists: Vec<f32> = matches.iter().map(|m| m.best.distance).collect();
        nn_dists.sort_by(|a, b| a.total_cmp(b));
        let nn = nn_dists[nn_dists.len() / 2] as f64;

        let mut gaps: Vec<f32> = matches
            .iter()
            .filter(|m| m.second.is_some())
            .map(|m| m.distance_gap())
            .collect();
        gaps.sort_by(|a, b| b.total_cmp(a));
        let nn12 = gaps.get(gaps.len() / 2).map_or(0.0, |g| *g as f64);

        log::trace!("descriptor thresholds nn: {:.3} nn12: {:.3}", nn, nn12);
        Some(DescriptorThresholds { nn, nn12 })
    }

    pub fn scaled(&self, multiplier: f64) -> DescriptorThresholds {
        DescriptorThresholds {
            nn: self.nn * multiplier,
            nn12: self.nn12 * multiplier,
        }
    }
}
