//! Configuration module

use std::env;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directory holding the exported model artifacts
    pub model_dir: PathBuf,

    /// Scoring model file name inside `model_dir`
    pub scoring_model_file: String,

    /// SHAP explainer file name inside `model_dir`
    pub explainer_file: String,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            model_dir: env::var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models")),

            scoring_model_file: env::var("SCORING_MODEL_FILE")
                .unwrap_or_else(|_| "scoring_model.json".to_string()),

            explainer_file: env::var("EXPLAINER_FILE")
                .unwrap_or_else(|_| "shap_explainer.json".to_string()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn scoring_model_path(&self) -> PathBuf {
        self.model_dir.join(&self.scoring_model_file)
    }

    pub fn explainer_path(&self) -> PathBuf {
        self.model_dir.join(&self.explainer_file)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths_join_model_dir() {
        let config = Config {
            port: 8000,
            model_dir: PathBuf::from("/srv/models"),
            scoring_model_file: "scoring_model.json".to_string(),
            explainer_file: "shap_explainer.json".to_string(),
            environment: "production".to_string(),
        };
        assert_eq!(config.scoring_model_path(), PathBuf::from("/srv/models/scoring_model.json"));
        assert_eq!(config.explainer_path(), PathBuf::from("/srv/models/shap_explainer.json"));
        assert!(config.is_production());
    }
}
