//! Logistic scoring model

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{check_width, Artifact, ProbabilisticClassifier};
use crate::error::ModelError;
use crate::features::{validate_feature_names, FEATURE_COUNT};

/// Binary logistic regression: `p(approved) = sigmoid(w . x + b)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Columns the model was fitted on, if the exporter recorded them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl LogisticRegression {
    pub fn new(coefficients: [f64; FEATURE_COUNT], intercept: f64) -> Self {
        Self {
            coefficients: coefficients.to_vec(),
            intercept,
            feature_names: None,
        }
    }

    fn positive_probability(&self, logit: f64) -> f64 {
        1.0 / (1.0 + (-logit).exp())
    }
}

impl Artifact for LogisticRegression {
    const KIND: &'static str = "scoring model";

    fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelError::InvalidArtifact(format!(
                "expected {} coefficients, got {}",
                FEATURE_COUNT,
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidArtifact(
                "coefficients must be finite".to_string(),
            ));
        }
        if let Some(names) = &self.feature_names {
            validate_feature_names(names)?;
        }
        Ok(())
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        check_width(&x, self.coefficients.len())?;

        let mut proba = Array2::zeros((x.nrows(), 2));
        for (i, row) in x.rows().into_iter().enumerate() {
            let logit = row
                .iter()
                .zip(&self.coefficients)
                .map(|(v, w)| v * w)
                .sum::<f64>()
                + self.intercept;
            let p = self.positive_probability(logit);
            proba[[i, 0]] = 1.0 - p;
            proba[[i, 1]] = p;
        }

        Ok(proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{feature_names, FeatureVector};
    use ndarray::array;

    fn synthetic() -> LogisticRegression {
        LogisticRegression::new([0.004, -1.5, -0.2, 0.01, 0.00002], -2.0)
    }

    #[test]
    fn test_zero_weights_give_half() {
        let model = LogisticRegression::new([0.0; FEATURE_COUNT], 0.0);
        let proba = model.predict_proba(FeatureVector::zeros().view()).unwrap();
        assert!((proba[[0, 1]] - 0.5).abs() < 1e-12);
        assert!((proba[[0, 0]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = synthetic();
        let x = array![[750.0, 0.3, 0.0, 24.0, 5000.0], [300.0, 0.9, 5.0, 0.0, 10000.0]];
        let proba = model.predict_proba(x.view()).unwrap();
        assert_eq!(proba.dim(), (2, 2));
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        // Better credit profile scores higher
        assert!(proba[[0, 1]] > proba[[1, 1]]);
    }

    #[test]
    fn test_known_logit() {
        let model = synthetic();
        let x = array![[750.0, 0.3, 0.0, 24.0, 5000.0]];
        let logit: f64 = -2.0 + 0.004 * 750.0 - 1.5 * 0.3 + 0.01 * 24.0 + 0.00002 * 5000.0;
        let expected = 1.0 / (1.0 + (-logit).exp());
        let proba = model.predict_proba(x.view()).unwrap();
        assert!((proba[[0, 1]] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_wrong_width() {
        let model = synthetic();
        let x = array![[1.0, 2.0]];
        assert!(matches!(
            model.predict_proba(x.view()),
            Err(ModelError::InputWidth { expected: 5, actual: 2 })
        ));
    }

    #[test]
    fn test_from_json_validates_coefficients() {
        let err = LogisticRegression::from_json(r#"{"coefficients":[1.0,2.0],"intercept":0.0}"#)
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidArtifact(_)));
    }

    #[test]
    fn test_from_json_checks_feature_names() {
        let mut names = feature_names();
        names.reverse();
        let doc = serde_json::json!({
            "coefficients": [0.0, 0.0, 0.0, 0.0, 0.0],
            "intercept": 0.0,
            "feature_names": names,
        });
        let err = LogisticRegression::from_json(&doc.to_string()).unwrap_err();
        assert!(matches!(err, ModelError::Layout(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring_model.json");
        std::fs::write(&path, serde_json::to_string(&synthetic()).unwrap()).unwrap();

        let model = LogisticRegression::load(&path).unwrap();
        assert_eq!(model.coefficients.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogisticRegression::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }
}
