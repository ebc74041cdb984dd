//! Random arrival/service timeline generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use tracing::info;

use super::types::{SimConfig, SimulationTrace};
use crate::error::{QueueError, Result};
use crate::model::SystemRates;

/// Largest expected horizon accepted, leaving the `u64` clock room for the
/// exponential tails of the samples.
const HORIZON_BUDGET: f64 = u64::MAX as f64 / 1024.0;

/// Single-server FCFS simulator with exponential inter-arrival and service times.
///
/// Holds only the rates; every run builds and returns a fresh trace.
#[derive(Debug, Clone)]
pub struct Simulator {
    interarrival: Exp<f64>,
    service: Exp<f64>,
    customers: usize,
}

impl Simulator {
    /// Creates a simulator drawing `customers` arrivals at `rates`.
    ///
    /// Only λ and ν are used; the timeline is always single-server.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Domain`] if `customers` is zero, a rate cannot
    /// parameterize an exponential distribution, or the expected timeline
    /// N·(1/λ + 1/ν) does not fit the integer clock.
    pub fn new(rates: &SystemRates, customers: usize) -> Result<Self> {
        if customers == 0 {
            return Err(QueueError::domain("simulation needs at least one customer"));
        }
        let expected = customers as f64 * (1.0 / rates.arrival_rate + 1.0 / rates.service_rate);
        if expected > HORIZON_BUDGET {
            return Err(QueueError::domain(format!(
                "expected horizon {expected:e} time units exceeds the clock budget {HORIZON_BUDGET:e}"
            )));
        }
        let interarrival = Exp::new(rates.arrival_rate)
            .map_err(|e| QueueError::domain(format!("arrival distribution: {e}")))?;
        let service = Exp::new(rates.service_rate)
            .map_err(|e| QueueError::domain(format!("service distribution: {e}")))?;
        Ok(Self {
            interarrival,
            service,
            customers,
        })
    }

    /// Creates a simulator from a run configuration.
    ///
    /// # Errors
    ///
    /// See [`Simulator::new`].
    pub fn from_config(rates: &SystemRates, config: &SimConfig) -> Result<Self> {
        Self::new(rates, config.customers)
    }

    /// Draws N intervals then N durations from `rng` and builds the trace.
    ///
    /// Both samples are rounded up to whole time units. Identical generator
    /// state yields an identical trace.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Domain`] if a sample or an instant of the
    /// timeline does not fit the `u64` clock.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SimulationTrace> {
        let intervals = (0..self.customers)
            .map(|_| whole_units(self.interarrival.sample(rng)))
            .collect::<Result<Vec<u64>>>()?;
        let durations = (0..self.customers)
            .map(|_| whole_units(self.service.sample(rng)))
            .collect::<Result<Vec<u64>>>()?;

        let trace = SimulationTrace::assemble(&intervals, durations)?;
        info!(
            customers = trace.len(),
            last_departure = trace.last_departure(),
            "simulation finished"
        );
        Ok(trace)
    }

    /// Runs with a `StdRng` seeded from `seed`.
    ///
    /// # Errors
    ///
    /// See [`Simulator::run`].
    pub fn run_seeded(&self, seed: u64) -> Result<SimulationTrace> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.run(&mut rng)
    }
}

fn whole_units(sample: f64) -> Result<u64> {
    let units = sample.ceil();
    // `u64::MAX as f64` rounds up to 2^64.
    if units < u64::MAX as f64 {
        Ok(units as u64)
    } else {
        Err(QueueError::domain(format!("sample {sample:e} exceeds the u64 clock")))
    }
}
