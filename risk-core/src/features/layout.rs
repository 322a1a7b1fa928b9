//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the model input schema.**
//!
//! Every artifact (scoring model, anomaly model, explainer) was trained on
//! the columns below, in this exact order. Adding, removing or reordering a
//! feature requires bumping [`FEATURE_VERSION`] and re-exporting all models.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in the exact column order consumed by the models
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "credit_score",      // 0: bureau score
    "dti_ratio",         // 1: debt-to-income ratio
    "late_payments_6m",  // 2: late payments over the last 6 months
    "employment_months", // 3: months with current employer
    "monthly_income",    // 4: gross monthly income
];

/// Total number of features
pub const FEATURE_COUNT: usize = 5;

/// Value substituted for a key missing from a non-empty payload
pub const FEATURE_DEFAULTS: [f64; FEATURE_COUNT] = [600.0, 0.35, 0.0, 12.0, 30000.0];

// ============================================================================
// LAYOUT HASH
// ============================================================================

fn hash_names<'a, I>(version: u8, names: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Hasher::new();
    hasher.update(&[version]);
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// CRC32 of the layout version and feature names
pub fn layout_hash() -> u32 {
    hash_names(FEATURE_VERSION, FEATURE_LAYOUT)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout description for logging and health output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: feature_names(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Artifact trained on a different column layout
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_hash: u32,
    pub actual_hash: u32,
    pub actual_names: Vec<String>,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected {:?} (hash: {:08x}), got {:?} (hash: {:08x})",
            FEATURE_LAYOUT, self.expected_hash, self.actual_names, self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Check the column names an artifact was trained on against the layout
pub fn validate_feature_names(names: &[String]) -> Result<(), LayoutMismatchError> {
    let expected = layout_hash();
    let actual = hash_names(FEATURE_VERSION, names.iter().map(String::as_str));

    if names.len() != FEATURE_COUNT || actual != expected {
        return Err(LayoutMismatchError {
            expected_hash: expected,
            actual_hash: actual,
            actual_names: names.to_vec(),
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

/// Owned copy of the layout, as sent to clients
pub fn feature_names() -> Vec<String> {
    FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// TESTS
// ============================================================================
