//! Features Module - payload to model input
//!
//! The layout fixes the column order; the vectorizer maps loosely-typed
//! request payloads onto it.

pub mod layout;
pub mod vector;

pub use layout::{
    feature_index, feature_name, feature_names, layout_hash, validate_feature_names,
    LayoutInfo, LayoutMismatchError, FEATURE_COUNT, FEATURE_DEFAULTS, FEATURE_LAYOUT,
    FEATURE_VERSION,
};
pub use vector::{vectorize, FeatureFrame, FeatureMap, FeatureVector};
