use crate::matching::KnnMatch;
use crate::threshold::DescriptorThresholds;

pub fn sort_by_query_idx(matches: &mut [KnnMatch]) {
    matches.sort_by_key(|m| m.query_idx());
}

/// Cross-checks left→right against right→left candidates.
///
/// Both slices must be sorted by query index (see [`sort_by_query_idx`]).
/// A left→right match `(lq, rt)` survives when the right→left best match of
/// `rt` points back to `lq`, its best distance is below `thresholds.nn` and
/// its distance gap is above `thresholds.nn12`. Output is `(lq, rt)` pairs in
/// ascending `lq` order.
pub fn mutual_best_matches(
    matches_lr: &[KnnMatch],
    matches_rl: &[KnnMatch],
    thresholds: &DescriptorThresholds,
) -> Vec<(usize, usize)> {
    debug_assert!(matches_rl.is_sorted_by_key(|m| m.query_idx()));

    matches_lr
        .iter()
        .filter_map(|m| {
            let lr_qdx = m.best.query_idx;
            let lr_tdx = m.best.train_idx;
            let back = matches_rl
                .binary_search_by_key(&lr_tdx, |r| r.query_idx())
                .ok()
                .map(|i| &matches_rl[i])?;
            let dist_nn = m.best.distance as f64;
            let dist_12 = m.distance_gap() as f64;
            (back.best.train_idx == lr_qdx
                && dist_nn < thresholds.nn
                && dist_12 > thresholds.nn12)
                .then_some((lr_qdx, lr_tdx))
        })
        .collect()
}
