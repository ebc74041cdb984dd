/// Simulator drawing exponential arrival and service samples.
pub mod engine;
pub mod kpi;
/// Occupancy step function of a trace.
pub mod occupancy;
pub mod types;

pub use engine::Simulator;
pub use kpi::SimulationKpis;
pub use occupancy::{OccupancySeries, OccupancyStep};
pub use types::{CustomerRecord, SimConfig, SimulationTrace};
