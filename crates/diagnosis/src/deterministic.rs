//! Deterministic helpers for reproducible training
//!
//! Seeded row hashing for shuffling and the tie-breaking key used when
//! two candidate splits have identical gain.

/// xxhash64-style mix over a symptom row, its label and its position.
///
/// The position is folded in so duplicate rows (common in symptom tables)
/// still land at independent places after sorting.
pub fn row_hash(row: &[u8], label: usize, position: usize, seed: i64) -> u64 {
    const PRIME1: u64 = 0x9E3779B185EBCA87;
    const PRIME2: u64 = 0xC2B2AE3D27D4EB4F;
    const PRIME3: u64 = 0x165667B19E3779F9;
    const PRIME5: u64 = 0x85EBCA77C2B2AE63;

    let mut h = (seed as u64).wrapping_add(PRIME5);

    for &val in row {
        h = h.wrapping_add((val as u64).wrapping_mul(PRIME3));
        h = h.rotate_left(17).wrapping_mul(PRIME2);
    }

    for extra in [label as u64, position as u64] {
        h ^= extra.wrapping_mul(PRIME1);
        h = h.rotate_left(27).wrapping_mul(PRIME2);
    }

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;

    h
}

/// Ordering key for equal-gain split candidates at one node: lowest
/// feature wins, then lowest threshold rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub threshold_rank: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, threshold_rank: usize) -> Self {
        Self {
            feature_idx,
            threshold_rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_hash_determinism() {
        let row = vec![1, 0, 0, 1];
        assert_eq!(row_hash(&row, 2, 7, 42), row_hash(&row, 2, 7, 42));
    }

    #[test]
    fn test_row_hash_depends_on_seed_and_position() {
        let row = vec![1, 0, 0, 1];
        assert_ne!(row_hash(&row, 2, 7, 42), row_hash(&row, 2, 7, 43));
        assert_ne!(row_hash(&row, 2, 7, 42), row_hash(&row, 2, 8, 42));
    }

    #[test]
    fn test_tie_breaker_ordering() {
        let t1 = SplitTieBreaker::new(0, 0);
        let t2 = SplitTieBreaker::new(0, 1);
        let t3 = SplitTieBreaker::new(1, 0);

        assert!(t1 < t2);
        assert!(t1 < t3);
    }
}
