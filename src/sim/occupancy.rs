//! Step function n(t) of customers in the system.

use serde::Serialize;

use super::types::SimulationTrace;

/// Level the step function takes from `time` until the next change point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OccupancyStep {
    pub time: u64,
    pub customers: u32,
}

/// Customers present over the time units `0..=last_departure`.
///
/// Stored as change points, so memory follows the number of customers
/// rather than the length of the horizon. Arrivals count from their arrival
/// instant; a customer is no longer counted from its departure instant on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancySeries {
    steps: Vec<OccupancyStep>,
    horizon: u64,
}

impl OccupancySeries {
    pub(crate) fn from_trace(trace: &SimulationTrace) -> Self {
        let mut events: Vec<(u64, i64)> = Vec::with_capacity(2 * trace.len());
        for record in trace.records() {
            events.push((record.arrival, 1));
            events.push((record.departure, -1));
        }
        events.sort_unstable_by_key(|&(time, _)| time);

        let mut steps = vec![OccupancyStep {
            time: 0,
            customers: 0,
        }];
        let mut n = 0_i64;
        let mut i = 0;
        while i < events.len() {
            let time = events[i].0;
            while i < events.len() && events[i].0 == time {
                n += events[i].1;
                i += 1;
            }
            let customers = n.max(0) as u32;
            match steps.last_mut() {
                Some(last) if last.time == time => last.customers = customers,
                Some(last) if last.customers == customers => {}
                _ => steps.push(OccupancyStep { time, customers }),
            }
        }

        Self {
            steps,
            horizon: trace.last_departure().saturating_add(1),
        }
    }

    /// Change points in increasing time order; the first is at time 0.
    pub fn steps(&self) -> &[OccupancyStep] {
        &self.steps
    }

    /// Number of time units covered.
    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    /// Customers present at time `t`.
    pub fn level_at(&self, t: u64) -> u32 {
        let idx = self.steps.partition_point(|s| s.time <= t);
        idx.checked_sub(1).map_or(0, |i| self.steps[i].customers)
    }

    pub fn peak(&self) -> u32 {
        self.steps.iter().map(|s| s.customers).max().unwrap_or(0)
    }

    /// Each step paired with the number of time units it lasts.
    fn segments(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.steps.iter().enumerate().map(|(i, s)| {
            let end = self
                .steps
                .get(i + 1)
                .map_or(self.horizon, |next| next.time)
                .min(self.horizon);
            (s.customers, end.saturating_sub(s.time))
        })
    }

    /// Time-average number of customers.
    pub fn mean(&self) -> f64 {
        if self.horizon == 0 {
            return 0.0;
        }
        let area: f64 = self
            .segments()
            .map(|(n, units)| f64::from(n) * units as f64)
            .sum();
        area / self.horizon as f64
    }

    /// Fraction of time units with at least `threshold` customers present.
    pub fn fraction_at_or_above(&self, threshold: u32) -> f64 {
        if self.horizon == 0 {
            return 0.0;
        }
        let hits: u64 = self
            .segments()
            .filter(|&(n, _)| n >= threshold)
            .map(|(_, units)| units)
            .sum();
        hits as f64 / self.horizon as f64
    }
}
