//! Post-hoc statistics of a simulation trace.

use std::fmt;

use serde::Serialize;

use super::types::SimulationTrace;

/// Aggregate indicators derived from a complete simulation run.
///
/// Computed post-hoc from the trace and its occupancy series so the reported
/// figures are consistent with the exported timeline.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationKpis {
    /// Number of simulated customers.
    pub customers: usize,
    /// Time units from 0 to the last departure, inclusive.
    pub horizon: u64,
    /// Mean time spent queueing before service.
    pub mean_wait: f64,
    /// Mean time from arrival to departure.
    pub mean_sojourn: f64,
    /// Fraction of the horizon the server spent serving.
    pub utilization: f64,
    /// Time-average number of customers in the system.
    pub mean_occupancy: f64,
    /// Largest number of customers present at once.
    pub peak_occupancy: u32,
    /// Occupancy level the exceedance fraction refers to.
    pub exceedance_threshold: u32,
    /// Fraction of time with at least `exceedance_threshold` customers present.
    pub exceedance_fraction: f64,
}

impl SimulationKpis {
    /// Computes all indicators from `trace`.
    ///
    /// # Arguments
    ///
    /// * `trace` - Complete simulation timeline
    /// * `threshold` - Occupancy level for the exceedance fraction
    pub fn from_trace(trace: &SimulationTrace, threshold: u32) -> Self {
        let occupancy = trace.occupancy();
        let n = trace.len();
        let horizon = occupancy.horizon();

        let mut wait_sum = 0_u64;
        let mut sojourn_sum = 0_u64;
        let mut busy = 0_u64;
        for r in trace.records() {
            wait_sum += r.wait;
            sojourn_sum += r.departure - r.arrival;
            busy += r.service;
        }

        let per_customer = |total: u64| {
            if n == 0 { 0.0 } else { total as f64 / n as f64 }
        };
        let utilization = if horizon == 0 {
            0.0
        } else {
            busy as f64 / horizon as f64
        };

        Self {
            customers: n,
            horizon,
            mean_wait: per_customer(wait_sum),
            mean_sojourn: per_customer(sojourn_sum),
            utilization,
            mean_occupancy: occupancy.mean(),
            peak_occupancy: occupancy.peak(),
            exceedance_threshold: threshold,
            exceedance_fraction: occupancy.fraction_at_or_above(threshold),
        }
    }
}

impl fmt::Display for SimulationKpis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Simulation KPIs ---")?;
        writeln!(f, "Customers:             {}", self.customers)?;
        writeln!(f, "Horizon:               {} s", self.horizon)?;
        writeln!(f, "Mean wait:             {:.2} s", self.mean_wait)?;
        writeln!(f, "Mean time in system:   {:.2} s", self.mean_sojourn)?;
        writeln!(f, "Server utilization:    {:.1}%", self.utilization * 100.0)?;
        writeln!(f, "Mean occupancy:        {:.3}", self.mean_occupancy)?;
        writeln!(f, "Peak occupancy:        {}", self.peak_occupancy)?;
        write!(
            f,
            "Time with >= {} present: {:.2}%",
            self.exceedance_threshold,
            self.exceedance_fraction * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn queued_trace() -> SimulationTrace {
        // arrivals 1, 2, 3; starts 1, 6, 11; departures 6, 11, 16
        SimulationTrace::from_samples(&[1, 1, 1], &[5, 5, 5]).expect("valid")
    }

    #[test]
    fn waits_and_sojourns() {
        let kpi = SimulationKpis::from_trace(&queued_trace(), 2);
        assert_relative_eq!(kpi.mean_wait, 4.0);
        assert_relative_eq!(kpi.mean_sojourn, 9.0);
    }

    #[test]
    fn utilization_counts_busy_time() {
        let kpi = SimulationKpis::from_trace(&queued_trace(), 2);
        assert_eq!(kpi.horizon, 17);
        assert_relative_eq!(kpi.utilization, 15.0 / 17.0);
    }

    #[test]
    fn peak_and_exceedance() {
        let kpi = SimulationKpis::from_trace(&queued_trace(), 3);
        assert_eq!(kpi.peak_occupancy, 3);
        // three customers present only at t = 3, 4, 5
        assert_relative_eq!(kpi.exceedance_fraction, 3.0 / 17.0);
    }

    #[test]
    fn display_does_not_panic() {
        let kpi = SimulationKpis::from_trace(&queued_trace(), 2);
        assert!(format!("{kpi}").contains("Mean wait"));
    }
}
