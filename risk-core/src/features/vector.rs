//! Feature Vector - model input built from request payloads
//!
//! `vectorize` is the only way request data reaches a model. It has two
//! fallbacks that are easy to confuse:
//!
//! - a missing or empty payload produces the all-zero row;
//! - a non-empty payload missing some keys gets [`FEATURE_DEFAULTS`] for them.
//!
//! The zero row for empty payloads is a known quirk kept for compatibility
//! with existing clients, not the per-key defaults.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde_json::Value;

use super::layout::{feature_names, FEATURE_COUNT, FEATURE_DEFAULTS, FEATURE_LAYOUT};
use crate::error::FeatureError;

/// Loosely-typed feature payload as received over HTTP
pub type FeatureMap = HashMap<String, Value>;

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Single-row (1 x FEATURE_COUNT) model input in layout order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Array2<f64>,
}

impl FeatureVector {
    /// All-zero row
    pub fn zeros() -> Self {
        Self {
            values: Array2::zeros((1, FEATURE_COUNT)),
        }
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        let mut row = Array2::zeros((1, FEATURE_COUNT));
        for (slot, value) in row.iter_mut().zip(values) {
            *slot = value;
        }
        Self { values: row }
    }

    /// Wrap an existing matrix; it must be exactly one row of FEATURE_COUNT
    pub fn from_array(values: Array2<f64>) -> Result<Self, FeatureError> {
        let (rows, cols) = values.dim();
        if rows != 1 || cols != FEATURE_COUNT {
            return Err(FeatureError::Shape {
                expected: FEATURE_COUNT,
                rows,
                cols,
            });
        }
        Ok(Self { values })
    }

    /// Matrix view, shape (1, FEATURE_COUNT)
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn row(&self) -> ArrayView1<'_, f64> {
        self.values.row(0)
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get((0, index)).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::zeros()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// FEATURE FRAME
// ============================================================================

/// Feature vector with column names attached, the input shape the explainer
/// checks against the names it was trained on
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    columns: Vec<String>,
    vector: FeatureVector,
}

impl FeatureFrame {
    /// Frame over the standard layout columns
    pub fn new(vector: FeatureVector) -> Self {
        Self {
            columns: feature_names(),
            vector,
        }
    }

    pub fn with_columns(columns: Vec<String>, vector: FeatureVector) -> Self {
        Self { columns, vector }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn vector(&self) -> &FeatureVector {
        &self.vector
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.vector.view()
    }
}

// ============================================================================
// VECTORIZER
// ============================================================================

/// Map a payload onto the fixed layout.
///
/// Values are not range-checked. JSON numbers pass through unchanged and
/// booleans become 1.0/0.0; anything else cannot be fed to a model and is
/// rejected. Keys outside the layout are ignored.
pub fn vectorize(payload: Option<&FeatureMap>) -> Result<FeatureVector, FeatureError> {
    let payload = match payload {
        Some(map) if !map.is_empty() => map,
        _ => return Ok(FeatureVector::zeros()),
    };

    let mut values = FEATURE_DEFAULTS;
    for (slot, name) in values.iter_mut().zip(FEATURE_LAYOUT) {
        if let Some(raw) = payload.get(name) {
            *slot = numeric(name, raw)?;
        }
    }

    Ok(FeatureVector::from_values(values))
}

fn numeric(key: &str, value: &Value) -> Result<f64, FeatureError> {
    let non_numeric = || FeatureError::NonNumeric {
        key: key.to_string(),
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => n.as_f64().ok_or_else(non_numeric),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        _ => Err(non_numeric()),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> FeatureMap {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_vectorize_none_is_zero_row() {
        let v = vectorize(None).unwrap();
        assert_eq!(v.shape(), (1, FEATURE_COUNT));
        assert!(v.to_vec().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_vectorize_empty_is_zero_row() {
        let v = vectorize(Some(&FeatureMap::new())).unwrap();
        assert_eq!(v, FeatureVector::zeros());
    }

    #[test]
    fn test_vectorize_full_payload_keeps_order() {
        let map = payload(json!({
            "monthly_income": 5000,
            "credit_score": 750,
            "employment_months": 24,
            "dti_ratio": 0.3,
            "late_payments_6m": 0
        }));
        let v = vectorize(Some(&map)).unwrap();
        assert_eq!(v.to_vec(), vec![750.0, 0.3, 0.0, 24.0, 5000.0]);
    }

    #[test]
    fn test_vectorize_fills_defaults_for_missing_keys() {
        let map = payload(json!({ "credit_score": 710 }));
        let v = vectorize(Some(&map)).unwrap();
        assert_eq!(v.to_vec(), vec![710.0, 0.35, 0.0, 12.0, 30000.0]);
    }

    #[test]
    fn test_vectorize_each_single_missing_key() {
        let full = [700.0, 0.5, 3.0, 48.0, 9000.0];
        for missing in 0..FEATURE_COUNT {
            let mut map = FeatureMap::new();
            for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
                if i != missing {
                    map.insert(name.to_string(), json!(full[i]));
                }
            }
            let v = vectorize(Some(&map)).unwrap();
            for i in 0..FEATURE_COUNT {
                let expected = if i == missing { FEATURE_DEFAULTS[i] } else { full[i] };
                assert_eq!(v.get(i), Some(expected), "feature {}", FEATURE_LAYOUT[i]);
            }
        }
    }

    #[test]
    fn test_vectorize_only_unknown_keys_uses_defaults() {
        let map = payload(json!({ "age": 41 }));
        let v = vectorize(Some(&map)).unwrap();
        assert_eq!(v.to_vec(), FEATURE_DEFAULTS.to_vec());
    }

    #[test]
    fn test_vectorize_out_of_range_passes_through() {
        let map = payload(json!({ "credit_score": -5, "dti_ratio": 42.0 }));
        let v = vectorize(Some(&map)).unwrap();
        assert_eq!(v.get_by_name("credit_score"), Some(-5.0));
        assert_eq!(v.get_by_name("dti_ratio"), Some(42.0));
    }

    #[test]
    fn test_vectorize_bool_coerced() {
        let map = payload(json!({ "late_payments_6m": true }));
        let v = vectorize(Some(&map)).unwrap();
        assert_eq!(v.get_by_name("late_payments_6m"), Some(1.0));
    }

    #[test]
    fn test_vectorize_rejects_string_value() {
        let map = payload(json!({ "credit_score": "high" }));
        match vectorize(Some(&map)) {
            Err(FeatureError::NonNumeric { key, .. }) => assert_eq!(key, "credit_score"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_from_array_rejects_wrong_shape() {
        let err = FeatureVector::from_array(Array2::zeros((2, FEATURE_COUNT))).unwrap_err();
        assert!(matches!(err, FeatureError::Shape { rows: 2, .. }));
    }

    #[test]
    fn test_frame_has_layout_columns() {
        let frame = FeatureFrame::new(FeatureVector::zeros());
        assert_eq!(frame.columns(), feature_names().as_slice());
        assert_eq!(frame.values().dim(), (1, FEATURE_COUNT));
    }
}
