//! Artifact loading

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ModelError;

/// A model exported offline as a JSON document
pub trait Artifact: DeserializeOwned + Sized {
    /// Human-readable kind, used in log lines
    const KIND: &'static str;

    /// Structural checks run after parsing
    fn validate(&self) -> Result<(), ModelError>;

    /// Read, parse and validate an artifact file
    fn load(path: &Path) -> Result<Self, ModelError> {
        log::info!("Loading {} from: {}", Self::KIND, path.display());

        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let artifact = Self::from_json(&content).map_err(|e| match e {
            ModelError::Parse { source, .. } => ModelError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        log::info!("{} loaded successfully", Self::KIND);
        Ok(artifact)
    }

    /// Parse and validate an in-memory document
    fn from_json(content: &str) -> Result<Self, ModelError> {
        let artifact: Self = serde_json::from_str(content).map_err(|source| ModelError::Parse {
            path: Default::default(),
            source,
        })?;
        artifact.validate()?;
        Ok(artifact)
    }
}
