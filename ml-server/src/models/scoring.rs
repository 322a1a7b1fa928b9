//! Scoring and explanation payloads

use serde::{Deserialize, Serialize};
use trustai_core::FeatureMap;

/// Body of `/score` and `/shap`
#[derive(Debug, Default, Deserialize)]
pub struct FeaturesRequest {
    #[serde(default)]
    pub features: Option<FeatureMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub probability: f64,
    pub score: u8,
    pub model_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapResponse {
    pub shap_values: Vec<f64>,
    pub base_probability: f64,
    pub feature_names: Vec<String>,
}
