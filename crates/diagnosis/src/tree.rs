//! Frozen symptom decision tree
//!
//! Nodes live in a flat arena; node 0 is the root and every child sits at a
//! strictly greater index than its parent, so a validated tree has no
//! cycles and no shared subtrees.

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A decision tree node (internal split or leaf)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Go left when `feature <= threshold`, right otherwise.
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class training sample counts that reached this leaf.
    Leaf { value: Vec<u32> },
}

impl Node {
    /// Create a new internal (split) node
    pub fn split(feature_idx: usize, threshold: f64, left: usize, right: usize) -> Self {
        Node::Split {
            feature_idx,
            threshold,
            left,
            right,
        }
    }

    /// Create a new leaf node
    pub fn leaf(value: Vec<u32>) -> Self {
        Node::Leaf { value }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Class with the highest count, lowest index on ties.
    /// `None` for split nodes and for leaves with no samples.
    pub fn predicted_class(&self) -> Option<usize> {
        match self {
            Node::Leaf { value } => {
                let mut best: Option<(usize, u32)> = None;
                for (class, &count) in value.iter().enumerate() {
                    if count > 0 && best.map_or(true, |(_, c)| count > c) {
                        best = Some((class, count));
                    }
                }
                best.map(|(class, _)| class)
            }
            Node::Split { .. } => None,
        }
    }
}

/// Decision tree over named symptom features with named classes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomTree {
    /// Symptom name for each feature index
    pub feature_names: Vec<String>,

    /// Disease label for each class index (sorted)
    pub classes: Vec<String>,

    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl SymptomTree {
    pub fn new(feature_names: Vec<String>, classes: Vec<String>, nodes: Vec<Node>) -> Self {
        Self {
            feature_names,
            classes,
            nodes,
        }
    }

    /// Get the root node
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    pub fn feature_name(&self, idx: usize) -> Option<&str> {
        self.feature_names.get(idx).map(String::as_str)
    }

    /// Label predicted by the leaf at `idx`.
    pub fn leaf_label(&self, idx: usize) -> Option<&str> {
        self.node(idx)
            .and_then(Node::predicted_class)
            .and_then(|class| self.classes.get(class))
            .map(String::as_str)
    }

    /// Walk from the root to a leaf for a full 0/1 feature row and return
    /// the leaf index.
    pub fn leaf_for(&self, features: &[u8]) -> Result<usize, ModelError> {
        let mut idx = 0usize;

        loop {
            match self.node(idx) {
                None => return Err(ModelError::InvalidTree(format!("missing node {idx}"))),
                Some(Node::Leaf { .. }) => return Ok(idx),
                Some(Node::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature_idx).ok_or_else(|| {
                        ModelError::InvalidTree(format!(
                            "feature {feature_idx} out of range for row of {}",
                            features.len()
                        ))
                    })?;
                    idx = if f64::from(*value) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Predicted class index for a full 0/1 feature row.
    pub fn predict_class(&self, features: &[u8]) -> Result<usize, ModelError> {
        let leaf = self.leaf_for(features)?;
        self.nodes[leaf]
            .predicted_class()
            .ok_or_else(|| ModelError::InvalidTree(format!("leaf {leaf} has no samples")))
    }

    /// Predicted disease label for a full 0/1 feature row.
    pub fn predict(&self, features: &[u8]) -> Result<&str, ModelError> {
        let class = self.predict_class(features)?;
        Ok(self.classes[class].as_str())
    }

    /// Leaf indices reachable from the root, in depth-first order.
    pub fn reachable_leaves(&self) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = vec![0usize];

        while let Some(idx) = stack.pop() {
            match self.node(idx) {
                Some(Node::Leaf { .. }) => leaves.push(idx),
                Some(Node::Split { left, right, .. }) => {
                    stack.push(*right);
                    stack.push(*left);
                }
                None => {}
            }
        }

        leaves
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];

        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(Node::Split { left, right, .. }) = self.node(idx) {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }

        max_depth
    }

    /// Validate tree structure
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidTree("tree has no nodes".to_string()));
        }
        if self.classes.is_empty() {
            return Err(ModelError::InvalidTree("tree has no classes".to_string()));
        }

        let mut parent_of: Vec<Option<usize>> = vec![None; self.nodes.len()];

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature_idx >= self.feature_names.len() {
                        return Err(ModelError::InvalidTree(format!(
                            "node {i} splits on unknown feature {feature_idx}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::InvalidTree(format!(
                            "node {i} has non-finite threshold"
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(ModelError::InvalidTree(format!(
                                "node {i} has invalid child {child}"
                            )));
                        }
                        if let Some(other) = parent_of[child].replace(i) {
                            return Err(ModelError::InvalidTree(format!(
                                "node {child} is shared by nodes {other} and {i}"
                            )));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if value.len() != self.classes.len() {
                        return Err(ModelError::InvalidTree(format!(
                            "leaf {i} has {} class counts, expected {}",
                            value.len(),
                            self.classes.len()
                        )));
                    }
                    if node.predicted_class().is_none() {
                        return Err(ModelError::InvalidTree(format!("leaf {i} has no samples")));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // fever? no -> Allergy; yes -> cough? no -> Malaria; yes -> Flu
    fn sample_tree() -> SymptomTree {
        SymptomTree::new(
            names(&["fever", "cough"]),
            names(&["Allergy", "Flu", "Malaria"]),
            vec![
                Node::split(0, 0.5, 1, 2),
                Node::leaf(vec![3, 0, 0]),
                Node::split(1, 0.5, 3, 4),
                Node::leaf(vec![0, 0, 2]),
                Node::leaf(vec![0, 4, 1]),
            ],
        )
    }

    #[test]
    fn test_node_creation() {
        let split = Node::split(3, 0.5, 1, 2);
        assert!(!split.is_leaf());
        assert_eq!(split.predicted_class(), None);

        let leaf = Node::leaf(vec![0, 2, 2]);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.predicted_class(), Some(1));

        assert_eq!(Node::leaf(vec![0, 0]).predicted_class(), None);
    }

    #[test]
    fn test_tree_prediction() {
        let tree = sample_tree();

        assert_eq!(tree.predict(&[0, 1]).unwrap(), "Allergy");
        assert_eq!(tree.predict(&[1, 0]).unwrap(), "Malaria");
        assert_eq!(tree.predict(&[1, 1]).unwrap(), "Flu");
        assert!(tree.predict(&[1]).is_err());
    }

    #[test]
    fn test_reachable_leaves_and_depth() {
        let tree = sample_tree();
        assert_eq!(tree.reachable_leaves(), vec![1, 3, 4]);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaf_label(4), Some("Flu"));
    }

    #[test]
    fn test_tree_validation() {
        assert!(sample_tree().validate().is_ok());

        let mut backwards = sample_tree();
        backwards.nodes[2] = Node::split(1, 0.5, 1, 4);
        assert!(backwards.validate().is_err());

        let mut bad_feature = sample_tree();
        bad_feature.nodes[0] = Node::split(9, 0.5, 1, 2);
        assert!(bad_feature.validate().is_err());

        let mut short_leaf = sample_tree();
        short_leaf.nodes[1] = Node::leaf(vec![1]);
        assert!(short_leaf.validate().is_err());

        let empty = SymptomTree::new(vec![], names(&["A"]), vec![]);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_canonical_json_roundtrip() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let restored: SymptomTree = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, restored);
    }
}
