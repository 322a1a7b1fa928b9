//! Anomaly classification of single transactions

use std::path::Path;

use trustai_core::features::feature_names;
use trustai_core::model::{AnomalyDetector, Artifact, IsolationForest, ANOMALY_LABEL};
use trustai_core::{ModelError, Transaction};

/// Outcome for one transaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// `ANOMALY_LABEL` or `INLIER_LABEL`
    pub label: i8,
    /// Decision function value; negative is abnormal
    pub score: f64,
}

impl Detection {
    pub fn is_anomaly(&self) -> bool {
        self.label == ANOMALY_LABEL
    }
}

/// Loaded model plus the column order it is fed
pub struct WatchdogState<D> {
    detector: D,
    columns: Vec<String>,
}

impl WatchdogState<IsolationForest> {
    /// Load the anomaly model; any failure here is fatal for the watchdog
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let forest = IsolationForest::load(path)?;
        log::info!(
            "Isolation forest ready: {} trees, offset {:.4}",
            forest.trees.len(),
            forest.offset
        );
        Ok(Self::new(forest))
    }
}

impl<D: AnomalyDetector> WatchdogState<D> {
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            columns: feature_names(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Run `predict` and `decision_function` on one row
    pub fn classify(&self, txn: &Transaction) -> Result<Detection, ModelError> {
        let vector = txn.to_vector();
        let labels = self.detector.predict(vector.view())?;
        let scores = self.detector.decision_function(vector.view())?;

        match (labels.get(0), scores.get(0)) {
            (Some(&label), Some(&score)) => Ok(Detection { label, score }),
            _ => Err(ModelError::InvalidOutput(
                "anomaly model returned no prediction".to_string(),
            )),
        }
    }
}
