//! Synthetic transaction stream

use rand::Rng;
use trustai_core::Transaction;

/// Traffic pattern a transaction was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Normal,
    Fraud,
}

impl Pattern {
    pub fn label(&self) -> &'static str {
        match self {
            Pattern::Normal => "🟢 NORMAL",
            Pattern::Fraud => "🔴 FRAUD SIMULATION",
        }
    }
}

/// Established borrower: good credit, low debt, no late payments
pub fn normal_transaction<R: Rng + ?Sized>(rng: &mut R) -> Transaction {
    Transaction {
        credit_score: rng.gen_range(650..=850),
        dti_ratio: round2(rng.gen_range(0.1..=0.4)),
        late_payments_6m: 0,
        employment_months: rng.gen_range(24..=120),
        monthly_income: rng.gen_range(4000..=12000),
    }
}

/// Poor credit, high debt, recent late payments and an inflated income
pub fn fraud_transaction<R: Rng + ?Sized>(rng: &mut R) -> Transaction {
    Transaction {
        credit_score: rng.gen_range(300..=550),
        dti_ratio: round2(rng.gen_range(0.6..=0.9)),
        late_payments_6m: rng.gen_range(2..=5),
        employment_months: rng.gen_range(0..=6),
        monthly_income: rng.gen_range(10000..=50000),
    }
}

/// Draw the next transaction; `fraud_rate` must lie in [0, 1]
pub fn next_transaction<R: Rng + ?Sized>(rng: &mut R, fraud_rate: f64) -> (Pattern, Transaction) {
    if rng.gen_bool(fraud_rate) {
        (Pattern::Fraud, fraud_transaction(rng))
    } else {
        (Pattern::Normal, normal_transaction(rng))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
