//! Core simulation types: run configuration and the customer timeline.

use std::fmt;

use serde::Serialize;

use super::occupancy::OccupancySeries;
use crate::error::{QueueError, Result};

/// Parameters of one simulation run.
///
/// # Examples
///
/// ```
/// use queue_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(100, 42).unwrap();
/// assert_eq!(cfg.customers, 100);
/// assert!(SimConfig::new(0, 42).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of customers N to draw.
    pub customers: usize,
    /// Seed for the run's random source.
    pub seed: u64,
}

impl SimConfig {
    /// # Errors
    ///
    /// Returns [`QueueError::Domain`] if `customers` is zero.
    pub fn new(customers: usize, seed: u64) -> Result<Self> {
        if customers == 0 {
            return Err(QueueError::domain("simulation needs at least one customer"));
        }
        Ok(Self { customers, seed })
    }
}

/// Arrival, service duration and service start of every simulated customer.
///
/// Built once under single-server FCFS discipline and read-only afterwards.
/// All instants are integer time units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationTrace {
    arrivals: Vec<u64>,
    service_durations: Vec<u64>,
    service_starts: Vec<u64>,
}

impl SimulationTrace {
    /// Builds the timeline from inter-arrival intervals and service durations.
    ///
    /// `arrival[0] = interval[0]`, `arrival[i] = arrival[i-1] + interval[i]`.
    /// A customer starts service when it has arrived and the previous
    /// customer has left: `start[i] = max(arrival[i], start[i-1] + duration[i-1])`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Domain`] if the slices are empty, differ in
    /// length, or an instant does not fit the `u64` clock.
    pub fn from_samples(interarrivals: &[u64], service_durations: &[u64]) -> Result<Self> {
        if interarrivals.is_empty() {
            return Err(QueueError::domain("simulation needs at least one customer"));
        }
        if interarrivals.len() != service_durations.len() {
            return Err(QueueError::domain(format!(
                "{} inter-arrival intervals but {} service durations",
                interarrivals.len(),
                service_durations.len()
            )));
        }

        Self::assemble(interarrivals, service_durations.to_vec())
    }

    /// Applies the FCFS recurrence; callers guarantee equal, non-zero lengths.
    pub(crate) fn assemble(interarrivals: &[u64], service_durations: Vec<u64>) -> Result<Self> {
        let overflow = || QueueError::domain("timeline exceeds the u64 clock");
        let n = interarrivals.len();
        let mut arrivals = Vec::with_capacity(n);
        let mut clock = 0_u64;
        for &interval in interarrivals {
            clock = clock.checked_add(interval).ok_or_else(overflow)?;
            arrivals.push(clock);
        }

        let mut service_starts = Vec::with_capacity(n);
        let mut server_free_at = arrivals.first().copied().unwrap_or(0);
        for (&arrival, &duration) in arrivals.iter().zip(&service_durations) {
            let start = arrival.max(server_free_at);
            service_starts.push(start);
            server_free_at = start.checked_add(duration).ok_or_else(overflow)?;
        }

        Ok(Self {
            arrivals,
            service_durations,
            service_starts,
        })
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    pub fn arrivals(&self) -> &[u64] {
        &self.arrivals
    }

    pub fn service_durations(&self) -> &[u64] {
        &self.service_durations
    }

    pub fn service_starts(&self) -> &[u64] {
        &self.service_starts
    }

    /// Instant customer `i` leaves the system. Fits in `u64` by construction.
    pub fn departure(&self, i: usize) -> u64 {
        self.service_starts[i] + self.service_durations[i]
    }

    /// Instant the last customer leaves (FCFS keeps departures ordered).
    pub fn last_departure(&self) -> u64 {
        self.len().checked_sub(1).map_or(0, |i| self.departure(i))
    }

    /// Per-customer view of the timeline, in arrival order.
    pub fn records(&self) -> impl Iterator<Item = CustomerRecord> + '_ {
        (0..self.len()).map(|i| CustomerRecord {
            customer: i,
            arrival: self.arrivals[i],
            service: self.service_durations[i],
            start: self.service_starts[i],
            departure: self.departure(i),
            wait: self.service_starts[i] - self.arrivals[i],
        })
    }

    /// Number of customers in the system over time, as change points.
    pub fn occupancy(&self) -> OccupancySeries {
        OccupancySeries::from_trace(self)
    }
}

/// One customer's passage through the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CustomerRecord {
    pub customer: usize,
    pub arrival: u64,
    pub service: u64,
    pub start: u64,
    pub departure: u64,
    /// Time spent queueing before service, `start - arrival`.
    pub wait: u64,
}

impl fmt::Display for CustomerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:>4} | arrive={:>6}  start={:>6}  service={:>4}  leave={:>6}  wait={:>4}",
            self.customer, self.arrival, self.start, self.service, self.departure, self.wait,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrivals_are_cumulative_intervals() {
        let trace = SimulationTrace::from_samples(&[3, 2, 5], &[1, 1, 1]).expect("valid");
        assert_eq!(trace.arrivals(), &[3, 5, 10]);
    }

    #[test]
    fn idle_server_starts_on_arrival() {
        let trace = SimulationTrace::from_samples(&[3, 10, 10], &[2, 2, 2]).expect("valid");
        assert_eq!(trace.service_starts(), trace.arrivals());
    }

    #[test]
    fn busy_server_queues_fcfs() {
        // arrivals 1, 2, 3; each needs 5
        let trace = SimulationTrace::from_samples(&[1, 1, 1], &[5, 5, 5]).expect("valid");
        assert_eq!(trace.service_starts(), &[1, 6, 11]);
        assert_eq!(trace.last_departure(), 16);
        let waits: Vec<u64> = trace.records().map(|r| r.wait).collect();
        assert_eq!(waits, vec![0, 4, 8]);
    }

    #[test]
    fn mismatched_samples_rejected() {
        assert!(SimulationTrace::from_samples(&[1, 2], &[1]).is_err());
        assert!(SimulationTrace::from_samples(&[], &[]).is_err());
    }

    #[test]
    fn clock_overflow_rejected() {
        assert!(matches!(
            SimulationTrace::from_samples(&[u64::MAX, 1], &[1, 1]),
            Err(QueueError::Domain(_))
        ));
        assert!(matches!(
            SimulationTrace::from_samples(&[u64::MAX - 1], &[5]),
            Err(QueueError::Domain(_))
        ));
        let edge = SimulationTrace::from_samples(&[u64::MAX - 5], &[5]).expect("fits");
        assert_eq!(edge.last_departure(), u64::MAX);
    }

    #[test]
    fn record_display_does_not_panic() {
        let trace = SimulationTrace::from_samples(&[1], &[2]).expect("valid");
        let rec = trace.records().next();
        assert!(rec.is_some_and(|r| !format!("{r}").is_empty()));
    }
}
