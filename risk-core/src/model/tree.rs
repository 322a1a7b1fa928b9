//! Node-array decision trees
//!
//! Same flat layout scikit-learn exposes on `tree_`: node `i` splits on
//! `feature[i]` at `threshold[i]`, rows with `x <= threshold` go to
//! `children_left[i]`, and leaves have `children_left[i] == -1`.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Child index marking a leaf
pub const TREE_LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
}

impl NodeTree {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    pub fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == TREE_LEAF
    }

    pub fn left(&self, node: usize) -> usize {
        self.children_left[node] as usize
    }

    pub fn right(&self, node: usize) -> usize {
        self.children_right[node] as usize
    }

    /// Split column of an internal node
    pub fn split_feature(&self, node: usize) -> usize {
        self.feature[node] as usize
    }

    /// Child a row follows, then the sibling it skips
    pub fn route(&self, node: usize, row: &ArrayView1<'_, f64>) -> (usize, usize) {
        let value = row[self.split_feature(node)];
        if value <= self.threshold[node] {
            (self.left(node), self.right(node))
        } else {
            (self.right(node), self.left(node))
        }
    }

    /// Leaf reached by `row` and its depth in edges
    pub fn apply(&self, row: &ArrayView1<'_, f64>) -> (usize, usize) {
        let mut node = 0;
        let mut depth = 0;
        while !self.is_leaf(node) {
            node = self.route(node, row).0;
            depth += 1;
        }
        (node, depth)
    }

    /// Structural checks. Children must come after their parent, which rules
    /// out cycles and guarantees `apply` terminates.
    pub fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        let n = self.node_count();
        if n == 0 {
            return Err(ModelError::InvalidArtifact("tree has no nodes".to_string()));
        }
        if self.children_right.len() != n || self.feature.len() != n || self.threshold.len() != n
        {
            return Err(ModelError::InvalidArtifact(format!(
                "node arrays differ in length (children_left={}, children_right={}, feature={}, threshold={})",
                n,
                self.children_right.len(),
                self.feature.len(),
                self.threshold.len()
            )));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == TREE_LEAF || right == TREE_LEAF {
                if left != right {
                    return Err(ModelError::InvalidArtifact(format!(
                        "node {} has only one child",
                        node
                    )));
                }
                continue;
            }
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ModelError::InvalidArtifact(format!(
                        "node {} has invalid child {}",
                        node, child
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(ModelError::InvalidArtifact(format!(
                    "node {} splits on unknown feature {}",
                    node, feature
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Root splits feature 0 at 10; left child splits feature 1 at 0.5
    fn two_level() -> NodeTree {
        NodeTree {
            children_left: vec![1, 3, -1, -1, -1],
            children_right: vec![2, 4, -1, -1, -1],
            feature: vec![0, 1, -2, -2, -2],
            threshold: vec![10.0, 0.5, -2.0, -2.0, -2.0],
        }
    }

    #[test]
    fn test_apply_routes_rows() {
        let tree = two_level();
        let a = array![5.0, 0.1, 0.0, 0.0, 0.0];
        let b = array![5.0, 0.9, 0.0, 0.0, 0.0];
        let c = array![50.0, 0.1, 0.0, 0.0, 0.0];
        assert_eq!(tree.apply(&a.view()), (3, 2));
        assert_eq!(tree.apply(&b.view()), (4, 2));
        assert_eq!(tree.apply(&c.view()), (2, 1));
    }

    #[test]
    fn test_threshold_is_inclusive_left() {
        let tree = two_level();
        let row = array![10.0, 0.5, 0.0, 0.0, 0.0];
        assert_eq!(tree.apply(&row.view()).0, 3);
    }

    #[test]
    fn test_validate_ok() {
        assert!(two_level().validate(5).is_ok());
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let mut tree = two_level();
        tree.children_left[1] = 0;
        assert!(tree.validate(5).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let mut tree = two_level();
        tree.feature[0] = 7;
        assert!(tree.validate(5).is_err());
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let mut tree = two_level();
        tree.threshold.pop();
        assert!(tree.validate(5).is_err());
    }
}
