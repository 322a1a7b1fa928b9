//! Isolation Forest anomaly model
//!
//! Scores match scikit-learn's `IsolationForest`: anomalies are isolated
//! close to the root, so their average path length is short.
//!
//! ```text
//! score_samples(x)     = -2 ^ (-E[h(x)] / c(max_samples))
//! decision_function(x) = score_samples(x) - offset
//! predict(x)           = -1 if decision_function(x) < 0 else 1
//! ```

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::tree::NodeTree;
use super::{check_width, AnomalyDetector, Artifact, ANOMALY_LABEL, INLIER_LABEL};
use crate::error::ModelError;
use crate::features::{validate_feature_names, FEATURE_COUNT};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful BST search over `n` points, `c(n)`
pub fn average_path_length(n: u64) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// One isolation tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationTree {
    #[serde(flatten)]
    pub nodes: NodeTree,
    /// Training samples that reached each node
    pub n_node_samples: Vec<u64>,
    /// Input columns seen by this tree; tree-local feature `i` reads column
    /// `features[i]`. Absent means the identity mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<usize>>,
}

impl IsolationTree {
    fn path_length(&self, row: &ArrayView1<'_, f64>) -> f64 {
        let (leaf, depth) = match &self.features {
            Some(columns) => {
                let local: Array1<f64> = columns.iter().map(|&c| row[c]).collect();
                self.nodes.apply(&local.view())
            }
            None => self.nodes.apply(row),
        };
        depth as f64 + average_path_length(self.n_node_samples[leaf])
    }

    fn validate(&self) -> Result<(), ModelError> {
        let width = match &self.features {
            Some(columns) => {
                if let Some(&bad) = columns.iter().find(|&&c| c >= FEATURE_COUNT) {
                    return Err(ModelError::InvalidArtifact(format!(
                        "tree reads unknown column {}",
                        bad
                    )));
                }
                columns.len()
            }
            None => FEATURE_COUNT,
        };
        self.nodes.validate(width)?;
        if self.n_node_samples.len() != self.nodes.node_count() {
            return Err(ModelError::InvalidArtifact(
                "n_node_samples length differs from node count".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fitted isolation forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Sub-sample size each tree was grown on
    pub max_samples: u64,
    /// Threshold subtracted from `score_samples`
    pub offset: f64,
    pub trees: Vec<IsolationTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl IsolationForest {
    /// Opposite of the anomaly score; lower is more abnormal
    pub fn score_samples(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        check_width(&x, FEATURE_COUNT)?;

        let denominator = self.trees.len() as f64 * average_path_length(self.max_samples);
        let scores = x
            .rows()
            .into_iter()
            .map(|row| {
                let depths: f64 = self.trees.iter().map(|t| t.path_length(&row)).sum();
                let ratio = if denominator != 0.0 { depths / denominator } else { 1.0 };
                -(2.0_f64.powf(-ratio))
            })
            .collect();

        Ok(scores)
    }
}

impl Artifact for IsolationForest {
    const KIND: &'static str = "anomaly model";

    fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no trees".to_string()));
        }
        if !self.offset.is_finite() {
            return Err(ModelError::InvalidArtifact("offset must be finite".to_string()));
        }
        for tree in &self.trees {
            tree.validate()?;
        }
        if let Some(names) = &self.feature_names {
            validate_feature_names(names)?;
        }
        Ok(())
    }
}

impl AnomalyDetector for IsolationForest {
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i8>, ModelError> {
        let decision = self.decision_function(x)?;
        Ok(decision.mapv(|d| if d < 0.0 { ANOMALY_LABEL } else { INLIER_LABEL }))
    }

    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        let scores = self.score_samples(x)?;
        Ok(scores - self.offset)
    }
}
