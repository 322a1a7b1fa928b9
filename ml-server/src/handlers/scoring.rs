//! Scoring and explanation handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::inference;
use crate::models::{FeaturesRequest, ScoreResponse, ShapResponse};
use crate::{AppResult, AppState};

/// Approval probability for one application
pub async fn score(
    State(state): State<AppState>,
    payload: Result<Json<FeaturesRequest>, JsonRejection>,
) -> AppResult<Json<ScoreResponse>> {
    let Json(req) = payload?;
    let result = inference::score(&state.registry, req.features.as_ref())?;
    tracing::debug!(probability = result.probability, score = result.score, "Scored application");
    Ok(Json(result))
}

/// Per-feature SHAP attribution for one application
pub async fn shap(
    State(state): State<AppState>,
    payload: Result<Json<FeaturesRequest>, JsonRejection>,
) -> AppResult<Json<ShapResponse>> {
    let Json(req) = payload?;
    let result = inference::explain(&state.registry, req.features.as_ref())?;
    Ok(Json(result))
}
