//! Traffic simulator handler

use axum::{body::Bytes, Json};

use crate::inference;
use crate::models::{SimulateRequest, SimulationResponse, TrafficKind};

/// Canned transaction for demos. Any body that is not `{"type": "fraud"}`
/// gets the normal template.
pub async fn simulate(body: Bytes) -> Json<SimulationResponse> {
    let req: SimulateRequest = serde_json::from_slice(&body).unwrap_or_default();
    Json(inference::simulate_traffic(TrafficKind::from_request(&req)))
}
