/// Row-major matrix of binary descriptors, one row per detected feature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorMatrix {
    row_bytes: usize,
    data: Vec<u8>,
}

impl DescriptorMatrix {
    pub fn new(row_bytes: usize) -> DescriptorMatrix {
        DescriptorMatrix {
            row_bytes,
            data: Vec::new(),
        }
    }

    pub fn with_capacity(row_bytes: usize, rows: usize) -> DescriptorMatrix {
        DescriptorMatrix {
            row_bytes,
            data: Vec::with_capacity(row_bytes * rows),
        }
    }

    /// Builds a matrix from a flat buffer. Returns `None` if the buffer is not
    /// a whole number of rows.
    pub fn from_vec(row_bytes: usize, data: Vec<u8>) -> Option<DescriptorMatrix> {
        if row_bytes == 0 || data.len() % row_bytes != 0 {
            return None;
        }
        Some(DescriptorMatrix { row_bytes, data })
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    pub fn rows(&self) -> usize {
        if self.row_bytes == 0 {
            0
        } else {
            self.data.len() / self.row_bytes
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }

    pub fn row(&self, idx: usize) -> &[u8] {
        let start = idx * self.row_bytes;
        &self.data[start..start + self.row_bytes]
    }

    pub fn push_row(&mut self, row: &[u8]) {
        assert_eq!(
            row.len(),
            self.row_bytes,
            "descriptor row has {} bytes, matrix expects {}",
            row.len(),
            self.row_bytes
        );
        self.data.extend_from_slice(row);
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.row_bytes.max(1))
    }

    /// Copies the given rows, in the given order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> DescriptorMatrix {
        let mut out = DescriptorMatrix::with_capacity(self.row_bytes, indices.len());
        for &idx in indices {
            out.push_row(self.row(idx));
        }
        out
    }
}

/// Number of differing bits between two binary descriptors.
pub fn hamming_distance(desc1: &[u8], desc2: &[u8]) -> u32 {
    desc1
        .iter()
        .zip(desc2)
        .map(|(a, b)| (a ^ b).count_ones())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_rows_keeps_requested_order() {
        let m = DescriptorMatrix::from_vec(2, vec![0, 0, 1, 1, 2, 2, 3, 3]).unwrap();
        let pruned = m.select_rows(&[1, 3]);
        assert_eq!(pruned.rows(), 2);
        assert_eq!(pruned.row(0), &[1, 1]);
        assert_eq!(pruned.row(1), &[3, 3]);
    }

    #[test]
    fn hamming_counts_bits() {
        assert_eq!(hamming_distance(&[0b1010_1010], &[0b0101_0101]), 8);
        assert_eq!(hamming_distance(&[0xff, 0x00], &[0xff, 0x01]), 1);
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        assert!(DescriptorMatrix::from_vec(32, vec![0; 33]).is_none());
    }
}
