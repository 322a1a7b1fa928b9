//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;
use trustai_core::features::LayoutInfo;

use crate::inference::MODEL_VERSION;
use crate::AppState;

/// Plain-text liveness probe
pub async fn alive() -> &'static str {
    "TrustAI ML Server is Alive!"
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    environment: String,
    scoring_model_loaded: bool,
    explainer_loaded: bool,
    model_version: &'static str,
    feature_layout: LayoutInfo,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = state.registry.status();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        environment: state.config.environment.clone(),
        scoring_model_loaded: models.scoring_model_loaded,
        explainer_loaded: models.explainer_loaded,
        model_version: MODEL_VERSION,
        feature_layout: LayoutInfo::current(),
    })
}
