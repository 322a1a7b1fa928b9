//! Traffic simulator payloads

use serde::{Deserialize, Serialize};
use trustai_core::SimulatedTransaction;

/// Body of `/simulate-traffic`
#[derive(Debug, Default, Deserialize)]
pub struct SimulateRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Which template the simulator returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficKind {
    Fraud,
    Normal,
}

impl TrafficKind {
    /// Only an explicit `"fraud"` selects the fraud template
    pub fn from_request(request: &SimulateRequest) -> Self {
        match request.kind.as_deref() {
            Some("fraud") => TrafficKind::Fraud,
            _ => TrafficKind::Normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub transaction: SimulatedTransaction,
    pub score: f64,
    pub is_anomaly: bool,
}
