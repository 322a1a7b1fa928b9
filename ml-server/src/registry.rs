//! Model Registry - artifacts loaded once at startup
//!
//! Each model is loaded independently. A model that fails to load stays
//! unset for the life of the process and callers fall back; nothing is
//! retried or reloaded.

use std::path::Path;

use serde::Serialize;
use trustai_core::model::{
    Artifact, Explainer, LogisticRegression, ProbabilisticClassifier, ShapOutput, TreeExplainer,
};
use trustai_core::{FeatureFrame, FeatureVector, ModelError};

use crate::config::Config;

/// Index of the positive ("approved") class in `predict_proba` output
pub(crate) const POSITIVE_CLASS: usize = 1;

/// Availability flags reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub scoring_model_loaded: bool,
    pub explainer_loaded: bool,
}

pub struct ModelRegistry {
    scoring: Option<Box<dyn ProbabilisticClassifier>>,
    explainer: Option<Box<dyn Explainer>>,
}

impl ModelRegistry {
    /// Load every artifact named by `config`. Never fails.
    pub fn load(config: &Config) -> Self {
        let scoring = match LogisticRegression::load(&config.scoring_model_path()) {
            Ok(model) => Some(Box::new(model) as Box<dyn ProbabilisticClassifier>),
            Err(e) => {
                tracing::error!("Failed to load scoring model: {}", e);
                None
            }
        };

        let explainer = match load_explainer(&config.explainer_path()) {
            Ok(explainer) => Some(explainer),
            Err(e) => {
                tracing::warn!("SHAP explainer unavailable, explanations will be mocked: {}", e);
                None
            }
        };

        let registry = Self::with_models(scoring, explainer);
        let status = registry.status();
        tracing::info!(
            scoring_model_loaded = status.scoring_model_loaded,
            explainer_loaded = status.explainer_loaded,
            "Model registry ready"
        );
        registry
    }

    pub fn with_models(
        scoring: Option<Box<dyn ProbabilisticClassifier>>,
        explainer: Option<Box<dyn Explainer>>,
    ) -> Self {
        Self { scoring, explainer }
    }

    pub fn is_scoring_available(&self) -> bool {
        self.scoring.is_some()
    }

    pub fn is_explainer_available(&self) -> bool {
        self.explainer.is_some()
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            scoring_model_loaded: self.is_scoring_available(),
            explainer_loaded: self.is_explainer_available(),
        }
    }

    /// Positive-class probability, `None` without a scoring model
    pub fn predict_proba(&self, vector: &FeatureVector) -> Result<Option<f64>, ModelError> {
        let Some(model) = &self.scoring else {
            return Ok(None);
        };

        let proba = model.predict_proba(vector.view())?;
        let p = proba.get((0, POSITIVE_CLASS)).copied().ok_or_else(|| {
            ModelError::InvalidOutput(format!(
                "predict_proba returned shape {:?}, expected a positive class column",
                proba.dim()
            ))
        })?;

        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(ModelError::InvalidOutput(format!(
                "probability {} outside [0, 1]",
                p
            )));
        }

        Ok(Some(p))
    }

    /// Raw explainer output, `None` without an explainer
    pub fn explain(&self, frame: &FeatureFrame) -> Result<Option<ShapOutput>, ModelError> {
        match &self.explainer {
            Some(explainer) => explainer.shap_values(frame).map(Some),
            None => Ok(None),
        }
    }
}

fn load_explainer(path: &Path) -> Result<Box<dyn Explainer>, ModelError> {
    let explainer = TreeExplainer::load(path)?;
    Ok(Box::new(explainer))
}
