//! Analytic queueing results: stationary distribution and dimensioning.

pub mod dimensioning;
/// Stationary distribution of the birth-death chain.
pub mod steady_state;

pub use dimensioning::{
    DimensioningResult, MAX_SERVERS, QualityCriterion, plan, required_per_server_rate,
    required_server_count, required_service_time,
};
pub use steady_state::{
    QueueExceedance, SteadyStateDistribution, cumulative_tail, finite_distribution,
    infinite_state_probability, queue_exceedance, truncated_mass,
};
