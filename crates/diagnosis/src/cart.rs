//! CART (Classification and Regression Tree) builder
//!
//! Exact-greedy classification tree induction over 0/1 symptom features.
//! Split quality is the Gini impurity decrease, computed in fixed-point
//! integers so identical data always yields an identical tree.

use std::collections::BTreeSet;

use crate::deterministic::SplitTieBreaker;
use crate::tree::Node;

/// Fixed-point scale for purity scores
const SCALE: i128 = 1_000_000;

/// Training parameters for a single tree
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
    /// `None` grows until leaves are pure or cannot be split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Split candidate with gain and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: i128,
    tie_breaker: SplitTieBreaker,
}

/// Build a classification tree using the exact-greedy CART algorithm
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<u8>],
    targets: &'a [usize],
    n_classes: usize,
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [Vec<u8>],
        targets: &'a [usize],
        n_classes: usize,
        config: TreeConfig,
    ) -> Self {
        assert_eq!(features.len(), targets.len());
        assert!(targets.iter().all(|&t| t < n_classes));

        let feature_count = features.first().map_or(0, Vec::len);

        Self {
            config,
            features,
            targets,
            n_classes,
            feature_count,
        }
    }

    /// Build tree and return its nodes, root first
    pub fn build(&self) -> Vec<Node> {
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..self.targets.len()).collect();

        self.build_node(&indices, 0, &mut nodes);

        nodes
    }

    /// Recursively build tree nodes
    fn build_node(&self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>) -> usize {
        let current_idx = nodes.len();
        let counts = self.class_counts(indices);

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);

        if is_pure
            || depth_reached
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
        {
            nodes.push(Node::leaf(counts));
            return current_idx;
        }

        let split = match self.find_best_split(indices, &counts) {
            Some(s) => s,
            None => {
                // No split improves purity
                nodes.push(Node::leaf(counts));
                return current_idx;
            }
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.threshold);

        // Reserve space for current node
        nodes.push(Node::split(split.feature_idx, split.threshold, 0, 0));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes);

        if let Node::Split { left, right, .. } = &mut nodes[current_idx] {
            *left = left_idx;
            *right = right_idx;
        }

        current_idx
    }

    /// Find best split using exact-greedy algorithm
    fn find_best_split(
        &self,
        indices: &[usize],
        parent_counts: &[u32],
    ) -> Option<SplitCandidate> {
        let parent_score = purity(parent_counts);
        let mut best_split: Option<SplitCandidate> = None;

        for feature_idx in 0..self.feature_count {
            let thresholds = self.candidate_thresholds(indices, feature_idx);

            for (rank, threshold) in thresholds.into_iter().enumerate() {
                let (left_counts, right_counts) =
                    self.partition_counts(indices, feature_idx, threshold);

                let n_left: u32 = left_counts.iter().sum();
                let n_right: u32 = right_counts.iter().sum();
                if (n_left as usize) < self.config.min_samples_leaf
                    || (n_right as usize) < self.config.min_samples_leaf
                {
                    continue;
                }

                let gain = purity(&left_counts) + purity(&right_counts) - parent_score;
                if gain <= 0 {
                    continue;
                }

                let candidate = SplitCandidate {
                    feature_idx,
                    threshold,
                    gain,
                    tie_breaker: SplitTieBreaker::new(feature_idx, rank),
                };

                best_split = match best_split {
                    None => Some(candidate),
                    Some(current) => {
                        // Deterministic tie-breaking
                        if gain > current.gain
                            || (gain == current.gain && candidate.tie_breaker < current.tie_breaker)
                        {
                            Some(candidate)
                        } else {
                            Some(current)
                        }
                    }
                };
            }
        }

        best_split
    }

    /// Midpoints between consecutive distinct values of a feature
    fn candidate_thresholds(&self, indices: &[usize], feature_idx: usize) -> Vec<f64> {
        let values: BTreeSet<u8> = indices
            .iter()
            .map(|&idx| self.features[idx][feature_idx])
            .collect();
        let values: Vec<u8> = values.into_iter().collect();

        values
            .windows(2)
            .map(|pair| (f64::from(pair[0]) + f64::from(pair[1])) / 2.0)
            .collect()
    }

    fn partition_counts(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<u32>, Vec<u32>) {
        let mut left = vec![0u32; self.n_classes];
        let mut right = vec![0u32; self.n_classes];

        for &idx in indices {
            if f64::from(self.features[idx][feature_idx]) <= threshold {
                left[self.targets[idx]] += 1;
            } else {
                right[self.targets[idx]] += 1;
            }
        }

        (left, right)
    }

    /// Split samples based on threshold
    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .copied()
            .partition(|&idx| f64::from(self.features[idx][feature_idx]) <= threshold)
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<u32> {
        let mut counts = vec![0u32; self.n_classes];
        for &idx in indices {
            counts[self.targets[idx]] += 1;
        }
        counts
    }
}

/// `sum(c_k^2) / n` in fixed point. The Gini decrease of a split, scaled by
/// the parent size, is `purity(left) + purity(right) - purity(parent)`.
fn purity(counts: &[u32]) -> i128 {
    let n: i128 = counts.iter().map(|&c| c as i128).sum();
    if n == 0 {
        return 0;
    }
    let sum_sq: i128 = counts.iter().map(|&c| (c as i128) * (c as i128)).sum();
    sum_sq * SCALE / n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separating_feature_chosen() {
        // feature 1 separates the classes, feature 0 is noise
        let features = vec![vec![1, 0], vec![0, 0], vec![1, 1], vec![0, 1]];
        let targets = vec![0, 0, 1, 1];

        let builder = CartBuilder::new(&features, &targets, 2, TreeConfig::default());
        let nodes = builder.build();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], Node::split(1, 0.5, 1, 2));
        assert_eq!(nodes[1], Node::leaf(vec![2, 0]));
        assert_eq!(nodes[2], Node::leaf(vec![0, 2]));
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let features = vec![vec![1], vec![0]];
        let targets = vec![0, 0];

        let nodes = CartBuilder::new(&features, &targets, 1, TreeConfig::default()).build();

        assert_eq!(nodes, vec![Node::leaf(vec![2])]);
    }

    #[test]
    fn test_max_depth_zero_gives_single_leaf() {
        let features = vec![vec![1], vec![0]];
        let targets = vec![0, 1];
        let config = TreeConfig {
            max_depth: Some(0),
            ..TreeConfig::default()
        };

        let nodes = CartBuilder::new(&features, &targets, 2, config).build();

        assert_eq!(nodes, vec![Node::leaf(vec![1, 1])]);
    }

    #[test]
    fn test_min_samples_leaf_blocks_split() {
        let features = vec![vec![1], vec![0], vec![0]];
        let targets = vec![1, 0, 0];
        let config = TreeConfig {
            min_samples_leaf: 2,
            ..TreeConfig::default()
        };

        let nodes = CartBuilder::new(&features, &targets, 2, config).build();

        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_leaf());
    }

    #[test]
    fn test_children_follow_parents() {
        let features = vec![
            vec![1, 0, 0],
            vec![0, 1, 0],
            vec![0, 0, 1],
            vec![1, 1, 0],
        ];
        let targets = vec![0, 1, 2, 3];

        let nodes = CartBuilder::new(&features, &targets, 4, TreeConfig::default()).build();

        for (i, node) in nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                assert!(*left > i && *right > i);
            }
        }
        assert_eq!(nodes.iter().filter(|n| n.is_leaf()).count(), 4);
    }

    #[test]
    fn test_deep_chain_builds_without_overflow() {
        // row i has only symptom i set, so every split peels off one class
        let n = 70;
        let features: Vec<Vec<u8>> = (0..n)
            .map(|i| (0..n).map(|j| u8::from(i == j)).collect())
            .collect();
        let targets: Vec<usize> = (0..n).collect();

        let nodes = CartBuilder::new(&features, &targets, n, TreeConfig::default()).build();

        assert_eq!(nodes.iter().filter(|node| node.is_leaf()).count(), n);
        assert_eq!(nodes.len(), 2 * n - 1);
        for (i, node) in nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                assert!(*left > i && *right > i);
            }
        }
    }

    #[test]
    fn test_purity_scores() {
        assert_eq!(purity(&[]), 0);
        assert_eq!(purity(&[4, 0]), 4 * SCALE);
        assert_eq!(purity(&[2, 2]), 2 * SCALE);
    }
}
