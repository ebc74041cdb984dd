//! Birth-death queue analysis: steady-state probabilities, service-level
//! dimensioning and a discrete-event single-server simulator.

/// Steady-state and dimensioning results.
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
/// Sample ingestion and artifact export.
pub mod io;
pub mod logging;
pub mod model;
pub mod report;
pub mod runner;
/// Discrete-event simulation of a FCFS queue.
pub mod sim;

pub use error::{QueueError, Result};
