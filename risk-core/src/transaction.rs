//! Transaction types shared by the traffic simulator and the watchdog

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Loan application features in their wire representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub credit_score: u32,
    pub dti_ratio: f64,
    pub late_payments_6m: u32,
    pub employment_months: u32,
    pub monthly_income: u32,
}

impl Transaction {
    /// Model row in layout order
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::from_values([
            f64::from(self.credit_score),
            self.dti_ratio,
            f64::from(self.late_payments_6m),
            f64::from(self.employment_months),
            f64::from(self.monthly_income),
        ])
    }
}

/// Transaction plus display-only metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedTransaction {
    #[serde(flatten)]
    pub features: Transaction,
    pub amount: String,
    pub location: String,
    pub ip_address: String,
}
