//! Model Module - loaded artifacts and the inference seams
//!
//! Artifacts are exported offline as JSON. Each one is loaded once through
//! [`Artifact::load`] and then used read-only behind one of the traits below.

pub mod artifact;
pub mod isolation_forest;
pub mod logistic;
pub mod tree;
pub mod tree_shap;

use ndarray::{Array1, Array2, ArrayView2};

use crate::error::ModelError;
use crate::features::FeatureFrame;

pub use artifact::Artifact;
pub use isolation_forest::IsolationForest;
pub use logistic::LogisticRegression;
pub use tree_shap::{ShapOutput, TreeExplainer};

/// Label returned by [`AnomalyDetector::predict`] for outliers
pub const ANOMALY_LABEL: i8 = -1;

/// Label returned by [`AnomalyDetector::predict`] for inliers
pub const INLIER_LABEL: i8 = 1;

/// Classifier with class probability output
pub trait ProbabilisticClassifier: Send + Sync {
    /// Class probabilities, shape (rows, classes)
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError>;
}

/// Unsupervised outlier detector
pub trait AnomalyDetector: Send + Sync {
    /// `ANOMALY_LABEL` or `INLIER_LABEL` per row
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i8>, ModelError>;

    /// Signed score per row; negative means outlier
    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError>;
}

/// Per-feature attribution of a model's output
pub trait Explainer: Send + Sync {
    fn shap_values(&self, frame: &FeatureFrame) -> Result<ShapOutput, ModelError>;
}

fn check_width(x: &ArrayView2<'_, f64>, expected: usize) -> Result<(), ModelError> {
    let actual = x.ncols();
    if actual != expected {
        return Err(ModelError::InputWidth { expected, actual });
    }
    Ok(())
}
