//! TrustAI Core
//!
//! Shared building blocks for the ML server and the anomaly watchdog:
//! the feature layout, the vectorizer, model artifacts and transaction types.

pub mod error;
pub mod features;
pub mod model;
pub mod transaction;

pub use error::{FeatureError, ModelError};
pub use features::{
    vectorize, FeatureFrame, FeatureMap, FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT,
};
pub use transaction::{SimulatedTransaction, Transaction};
