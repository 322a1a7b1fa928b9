//! Tree SHAP explainer
//!
//! Exact SHAP values for a tree ensemble using the polynomial-time path
//! algorithm of Lundberg et al. ("Consistent Individualized Feature
//! Attribution for Tree Ensembles", Algorithm 2). The ensemble output is the
//! mean of its trees, so the attributions are the mean of per-tree values.
//!
//! For every row and output the values satisfy
//! `sum(phi) + expected_value == prediction`.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::tree::NodeTree;
use super::{check_width, Artifact, Explainer};
use crate::error::ModelError;
use crate::features::{feature_names, validate_feature_names, FeatureFrame, FEATURE_COUNT};

// ============================================================================
// OUTPUT
// ============================================================================

/// Raw explainer output, in the two shapes tree explainers return
#[derive(Debug, Clone, PartialEq)]
pub enum ShapOutput {
    /// Single-output model: one (rows, features) matrix
    Single(Array2<f64>),
    /// Multi-output model (one entry per class): a (rows, features) matrix
    /// per output
    PerClass(Vec<Array2<f64>>),
}

// ============================================================================
// ARTIFACT
// ============================================================================

/// Tree with an output vector and a cover (training weight) per node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapTree {
    #[serde(flatten)]
    pub nodes: NodeTree,
    /// Model output at each node, `n_outputs` values each
    pub value: Vec<Vec<f64>>,
    /// Training weight reaching each node
    pub cover: Vec<f64>,
}

impl ShapTree {
    fn validate(&self, n_outputs: usize) -> Result<(), ModelError> {
        self.nodes.validate(FEATURE_COUNT)?;
        let n = self.nodes.node_count();
        if self.value.len() != n || self.cover.len() != n {
            return Err(ModelError::InvalidArtifact(
                "value/cover length differs from node count".to_string(),
            ));
        }
        if self.value.iter().any(|v| v.len() != n_outputs) {
            return Err(ModelError::InvalidArtifact(format!(
                "every node needs {} output values",
                n_outputs
            )));
        }
        if self.cover.iter().any(|&c| c.is_nan() || c <= 0.0) {
            return Err(ModelError::InvalidArtifact(
                "node cover must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Cover-weighted mean output over the leaves
    fn expected_value(&self, node: usize, out: &mut [f64], weight: f64) {
        if self.nodes.is_leaf(node) {
            for (o, v) in out.iter_mut().zip(&self.value[node]) {
                *o += weight * v;
            }
            return;
        }
        let cover = self.cover[node];
        for child in [self.nodes.left(node), self.nodes.right(node)] {
            self.expected_value(child, out, weight * self.cover[child] / cover);
        }
    }

    fn predict(&self, row: &ArrayView1<'_, f64>) -> &[f64] {
        let (leaf, _) = self.nodes.apply(row);
        &self.value[leaf]
    }
}

/// Tree ensemble explainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeExplainer {
    pub n_outputs: usize,
    pub trees: Vec<ShapTree>,
    /// Columns the ensemble was trained on; defaults to the layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl Artifact for TreeExplainer {
    const KIND: &'static str = "SHAP explainer";

    fn validate(&self) -> Result<(), ModelError> {
        if self.n_outputs == 0 {
            return Err(ModelError::InvalidArtifact("n_outputs must be positive".to_string()));
        }
        if self.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("ensemble has no trees".to_string()));
        }
        for tree in &self.trees {
            tree.validate(self.n_outputs)?;
        }
        if let Some(names) = &self.feature_names {
            validate_feature_names(names)?;
        }
        Ok(())
    }
}

impl TreeExplainer {
    /// Mean model output over the training distribution, per output
    pub fn expected_value(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.n_outputs];
        for tree in &self.trees {
            tree.expected_value(0, &mut out, 1.0);
        }
        let n = self.trees.len() as f64;
        out.iter_mut().for_each(|v| *v /= n);
        out
    }

    /// Ensemble output for one row, per output
    pub fn predict(&self, row: &ArrayView1<'_, f64>) -> Vec<f64> {
        let mut out = vec![0.0; self.n_outputs];
        for tree in &self.trees {
            for (o, v) in out.iter_mut().zip(tree.predict(row)) {
                *o += v;
            }
        }
        let n = self.trees.len() as f64;
        out.iter_mut().for_each(|v| *v /= n);
        out
    }

    /// SHAP values of one row, indexed `[output][feature]`
    fn explain_row(&self, row: &ArrayView1<'_, f64>) -> Vec<Vec<f64>> {
        let mut phi = vec![vec![0.0; FEATURE_COUNT]; self.n_outputs];
        for tree in &self.trees {
            recurse(tree, 0, row, &mut phi, Vec::new(), 1.0, 1.0, None);
        }
        let n = self.trees.len() as f64;
        for output in &mut phi {
            output.iter_mut().for_each(|v| *v /= n);
        }
        phi
    }

    fn expected_columns(&self) -> Vec<String> {
        self.feature_names.clone().unwrap_or_else(feature_names)
    }
}

impl Explainer for TreeExplainer {
    fn shap_values(&self, frame: &FeatureFrame) -> Result<ShapOutput, ModelError> {
        let expected = self.expected_columns();
        if frame.columns() != expected.as_slice() {
            return Err(ModelError::ColumnMismatch {
                expected,
                actual: frame.columns().to_vec(),
            });
        }
        let x = frame.values();
        check_width(&x, FEATURE_COUNT)?;

        let mut outputs = vec![Array2::zeros((x.nrows(), FEATURE_COUNT)); self.n_outputs];
        for (r, row) in x.rows().into_iter().enumerate() {
            for (o, values) in self.explain_row(&row).into_iter().enumerate() {
                for (f, v) in values.into_iter().enumerate() {
                    outputs[o][[r, f]] = v;
                }
            }
        }

        if self.n_outputs == 1 {
            Ok(ShapOutput::Single(outputs.remove(0)))
        } else {
            Ok(ShapOutput::PerClass(outputs))
        }
    }
}

// ============================================================================
// TREE SHAP
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

fn extend_path(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });

    let scale = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / scale;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / scale;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let scale = (depth + 1) as f64;
    let mut next_one = path[depth].weight;

    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one * scale / ((i + 1) as f64 * one);
            next_one = tmp - path[i].weight * zero * (depth - i) as f64 / scale;
        } else {
            path[i].weight = path[i].weight * scale / (zero * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

/// Total weight of the path with element `index` unwound, without mutating it
fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let mut next_one = path[depth].weight;
    let mut total = 0.0;

    if one != 0.0 {
        for i in (0..depth).rev() {
            let tmp = next_one / ((i + 1) as f64 * one);
            total += tmp;
            next_one = path[i].weight - tmp * zero * (depth - i) as f64;
        }
    } else {
        for i in (0..depth).rev() {
            total += path[i].weight / (zero * (depth - i) as f64);
        }
    }

    total * (depth + 1) as f64
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &ShapTree,
    node: usize,
    row: &ArrayView1<'_, f64>,
    phi: &mut [Vec<f64>],
    mut path: Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    extend_path(&mut path, zero_fraction, one_fraction, feature);

    if tree.nodes.is_leaf(node) {
        let value = &tree.value[node];
        for i in 1..path.len() {
            let element = path[i];
            let Some(f) = element.feature else { continue };
            let scale = unwound_path_sum(&path, i) * (element.one_fraction - element.zero_fraction);
            for (out, v) in phi.iter_mut().zip(value) {
                out[f] += scale * v;
            }
        }
        return;
    }

    let split = tree.nodes.split_feature(node);
    let (hot, cold) = tree.nodes.route(node, row);

    // A feature already on the path is undone before being split on again
    let mut incoming_zero = 1.0;
    let mut incoming_one = 1.0;
    if let Some(k) = (1..path.len()).find(|&k| path[k].feature == Some(split)) {
        incoming_zero = path[k].zero_fraction;
        incoming_one = path[k].one_fraction;
        unwind_path(&mut path, k);
    }

    let cover = tree.cover[node];
    recurse(
        tree,
        hot,
        row,
        phi,
        path.clone(),
        incoming_zero * tree.cover[hot] / cover,
        incoming_one,
        Some(split),
    );
    recurse(
        tree,
        cold,
        row,
        phi,
        path,
        incoming_zero * tree.cover[cold] / cover,
        0.0,
        Some(split),
    );
}

// ============================================================================
// TESTS
// ============================================================================
