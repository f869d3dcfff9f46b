use crate::descriptor::{DescriptorMatrix, hamming_distance};

/// One candidate correspondence between a query row and a train row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}

/// Best and second-best candidates for one query descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnnMatch {
    pub best: Match,
    pub second: Option<Match>,
}

impl KnnMatch {
    pub fn query_idx(&self) -> usize {
        self.best.query_idx
    }

    /// Second-best minus best distance. Unbounded when there is no
    /// second candidate, since the match cannot be ambiguous.
    pub fn distance_gap(&self) -> f32 {
        match self.second {
            Some(second) => second.distance - self.best.distance,
            None => f32::INFINITY,
        }
    }
}

/// k = 2 nearest-neighbour search. Implementations return one entry per query
/// row that has at least one candidate, with `best.distance <= second.distance`.
/// Matrices of different row widths have no candidates.
pub trait DescriptorMatcher: Sync {
    fn knn_match(&self, query: &DescriptorMatrix, train: &DescriptorMatrix) -> Vec<KnnMatch>;
}

/// Exhaustive Hamming-distance matcher for binary descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceHamming;

impl DescriptorMatcher for BruteForceHamming {
    fn knn_match(&self, query: &DescriptorMatrix, train: &DescriptorMatrix) -> Vec<KnnMatch> {
        if train.is_empty() {
            return Vec::new();
        }
        if query.row_bytes() != train.row_bytes() {
            log::warn!(
                "descriptor width mismatch: {} vs {} bytes",
                query.row_bytes(),
                train.row_bytes()
            );
            return Vec::new();
        }
        query
            .iter_rows()
            .enumerate()
            .filter_map(|(query_idx, q)| {
                let mut best: Option<Match> = None;
                let mut second: Option<Match> = None;
                for (train_idx, t) in train.iter_rows().enumerate() {
                    let candidate = Match {
                        query_idx,
                        train_idx,
                        distance: hamming_distance(q, t) as f32,
                    };
                    // strict comparisons keep the lowest train index on ties
                    match best {
                        Some(b) if candidate.distance >= b.distance => {
                            if second.is_none_or(|s| candidate.distance < s.distance) {
                                second = Some(candidate);
                            }
                        }
                        _ => {
                            second = best;
                            best = Some(candidate);
                        }
                    }
                }
                best.map(|best| KnnMatch { best, second })
            })
            .collect()
    }
}
