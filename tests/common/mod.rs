//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use queue_sim::analysis::QualityCriterion;
use queue_sim::model::SystemRates;
use queue_sim::sim::{SimulationTrace, Simulator};

/// Observed office arrival intensity (customers per second).
pub const LAMBDA: f64 = 0.035;

/// Observed office service intensity (customers per second).
pub const NU: f64 = 0.0488;

/// Single-server rates of the observed office.
pub fn office_rates() -> SystemRates {
    SystemRates::new(LAMBDA, NU, 1).expect("office rates are valid")
}

/// At most 5 waiting during 99% of the time.
pub fn office_criterion() -> QualityCriterion {
    QualityCriterion::new(5, 99.0).expect("valid criterion")
}

/// 100-customer office run with seed 42.
pub fn office_trace() -> SimulationTrace {
    Simulator::new(&office_rates(), 100)
        .expect("valid simulator")
        .run_seeded(42)
        .expect("office run fits the clock")
}
