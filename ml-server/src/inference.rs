//! Inference Service - scoring, explanation and simulated traffic
//!
//! Handlers stay thin; everything that decides a response body lives here.
//! The fallback paths (no scoring model, no explainer) answer without
//! reading the payload.

use trustai_core::model::ShapOutput;
use trustai_core::{
    vectorize, FeatureFrame, FeatureMap, ModelError, SimulatedTransaction, Transaction,
    FEATURE_COUNT,
};
use trustai_core::features::feature_names;

use crate::error::AppResult;
use crate::models::{ScoreResponse, ShapResponse, SimulationResponse, TrafficKind};
use crate::registry::{ModelRegistry, POSITIVE_CLASS};

pub const MODEL_VERSION: &str = "v0.1";

/// Probability reported when no scoring model is loaded
pub const FALLBACK_PROBABILITY: f64 = 0.5;

pub const MOCK_SHAP_VALUES: [f64; FEATURE_COUNT] = [0.2, -0.1, -0.3, 0.1, 0.05];
pub const MOCK_BASE_PROBABILITY: f64 = 0.75;

// ============================================================================
// SCORE
// ============================================================================

pub fn score(registry: &ModelRegistry, features: Option<&FeatureMap>) -> AppResult<ScoreResponse> {
    let probability = if registry.is_scoring_available() {
        let vector = vectorize(features)?;
        registry
            .predict_proba(&vector)?
            .unwrap_or(FALLBACK_PROBABILITY)
    } else {
        FALLBACK_PROBABILITY
    };

    Ok(ScoreResponse {
        probability,
        score: probability_to_score(probability),
        model_version: MODEL_VERSION.to_string(),
    })
}

/// `round(p * 100)` with ties to even
pub fn probability_to_score(probability: f64) -> u8 {
    (probability * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
}

// ============================================================================
// EXPLAIN
// ============================================================================

pub fn explain(registry: &ModelRegistry, features: Option<&FeatureMap>) -> AppResult<ShapResponse> {
    if !registry.is_explainer_available() {
        return Ok(mock_explanation());
    }
    if !registry.is_scoring_available() {
        tracing::warn!("Explainer loaded without a scoring model, returning mock explanation");
        return Ok(mock_explanation());
    }

    let frame = FeatureFrame::new(vectorize(features)?);

    let Some(output) = registry.explain(&frame)? else {
        return Ok(mock_explanation());
    };
    let shap_values = positive_row(output)?;

    let Some(base_probability) = registry.predict_proba(frame.vector())? else {
        return Ok(mock_explanation());
    };

    Ok(ShapResponse {
        shap_values,
        base_probability,
        feature_names: feature_names(),
    })
}

/// Fixed explanation served while no explainer is usable
pub fn mock_explanation() -> ShapResponse {
    ShapResponse {
        shap_values: MOCK_SHAP_VALUES.to_vec(),
        base_probability: MOCK_BASE_PROBABILITY,
        feature_names: feature_names(),
    }
}

/// First row of the positive-class attribution matrix
fn positive_row(output: ShapOutput) -> Result<Vec<f64>, ModelError> {
    let matrix = match output {
        ShapOutput::Single(matrix) => matrix,
        ShapOutput::PerClass(mut classes) => {
            if classes.len() <= POSITIVE_CLASS {
                return Err(ModelError::InvalidOutput(format!(
                    "explainer returned {} class(es), expected at least {}",
                    classes.len(),
                    POSITIVE_CLASS + 1
                )));
            }
            classes.swap_remove(POSITIVE_CLASS)
        }
    };

    if matrix.nrows() == 0 || matrix.ncols() != FEATURE_COUNT {
        return Err(ModelError::InvalidOutput(format!(
            "SHAP matrix has shape {:?}, expected (1, {})",
            matrix.dim(),
            FEATURE_COUNT
        )));
    }

    Ok(matrix.row(0).to_vec())
}

// ============================================================================
// SIMULATED TRAFFIC
// ============================================================================

pub fn simulate_traffic(kind: TrafficKind) -> SimulationResponse {
    match kind {
        TrafficKind::Fraud => SimulationResponse {
            transaction: SimulatedTransaction {
                features: Transaction {
                    credit_score: 300,
                    dti_ratio: 0.99,
                    late_payments_6m: 12,
                    employment_months: 0,
                    monthly_income: 50000,
                },
                amount: "$50,000".to_string(),
                location: "Russia".to_string(),
                ip_address: "10.0.0.1".to_string(),
            },
            score: -0.99,
            is_anomaly: true,
        },
        TrafficKind::Normal => SimulationResponse {
            transaction: SimulatedTransaction {
                features: Transaction {
                    credit_score: 750,
                    dti_ratio: 0.2,
                    late_payments_6m: 0,
                    employment_months: 24,
                    monthly_income: 5000,
                },
                amount: "$10".to_string(),
                location: "USA".to_string(),
                ip_address: "192.168.1.1".to_string(),
            },
            score: 0.15,
            is_anomaly: false,
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================
