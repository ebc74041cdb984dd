//! Markov-chain parameter model.

/// Rate derivation and per-state transition parameters.
pub mod params;

pub use params::{
    SystemRates, StateParameters, StateTable, arrival_rate, service_rate, state_parameters,
};
