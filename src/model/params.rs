//! Birth-death rate parameters derived from empirical mean times.

use serde::Serialize;

use crate::error::{QueueError, Result};

/// Converts a mean inter-arrival time into the arrival intensity λ.
///
/// # Errors
///
/// Returns [`QueueError::Domain`] if `mean_interarrival` is not a positive
/// finite number.
pub fn arrival_rate(mean_interarrival: f64) -> Result<f64> {
    reciprocal(mean_interarrival, "mean inter-arrival time")
}

/// Converts a mean service time into the service intensity ν.
///
/// # Errors
///
/// Returns [`QueueError::Domain`] if `mean_service` is not a positive finite
/// number.
pub fn service_rate(mean_service: f64) -> Result<f64> {
    reciprocal(mean_service, "mean service time")
}

fn reciprocal(mean: f64, what: &str) -> Result<f64> {
    if !mean.is_finite() || mean <= 0.0 {
        return Err(QueueError::domain(format!("{what} must be > 0, got {mean}")));
    }
    Ok(1.0 / mean)
}

/// Arrival rate, per-server service rate and number of parallel servers.
///
/// # Examples
///
/// ```
/// use queue_sim::model::SystemRates;
///
/// let rates = SystemRates::new(0.035, 0.0488, 1).unwrap();
/// assert!(rates.is_stable());
/// assert!((rates.traffic_intensity() - 0.035 / 0.0488).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemRates {
    /// Arrival intensity λ (customers per time unit).
    pub arrival_rate: f64,
    /// Per-server service intensity ν.
    pub service_rate: f64,
    /// Number of parallel servers s.
    pub servers: u32,
}

impl SystemRates {
    /// Creates validated system rates.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Domain`] if either rate is not a positive finite
    /// number or `servers` is zero. Stability is not checked here; use
    /// [`SystemRates::ensure_stable`] before unbounded-queue analyses.
    pub fn new(arrival_rate: f64, service_rate: f64, servers: u32) -> Result<Self> {
        ensure_rate(arrival_rate, "arrival rate")?;
        ensure_rate(service_rate, "service rate")?;
        if servers == 0 {
            return Err(QueueError::domain("server count must be >= 1"));
        }
        Ok(Self {
            arrival_rate,
            service_rate,
            servers,
        })
    }

    /// Builds rates from the column means of inter-arrival and service samples.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Domain`] for non-positive means or zero servers.
    pub fn from_means(mean_interarrival: f64, mean_service: f64, servers: u32) -> Result<Self> {
        Self::new(
            arrival_rate(mean_interarrival)?,
            service_rate(mean_service)?,
            servers,
        )
    }

    /// Offered load r = λ/ν (in Erlangs).
    pub fn traffic_intensity(&self) -> f64 {
        self.arrival_rate / self.service_rate
    }

    /// Total service capacity s·ν when every server is busy.
    pub fn capacity(&self) -> f64 {
        f64::from(self.servers) * self.service_rate
    }

    /// Per-server utilization ρ = λ/(s·ν).
    pub fn utilization(&self) -> f64 {
        self.arrival_rate / self.capacity()
    }

    /// Returns `true` when a stationary distribution exists (ρ < 1).
    pub fn is_stable(&self) -> bool {
        self.utilization() < 1.0
    }

    /// # Errors
    ///
    /// Returns [`QueueError::Instability`] when λ ≥ s·ν.
    pub fn ensure_stable(&self) -> Result<()> {
        if self.is_stable() {
            Ok(())
        } else {
            Err(QueueError::instability(self.arrival_rate, self.capacity()))
        }
    }

    /// Permanence rate and transition probabilities of state `i`.
    pub fn state(&self, i: usize) -> StateParameters {
        state_parameters_unchecked(self.arrival_rate, self.service_rate, i, self.servers)
    }

    /// Parameters of states `0..n`, in state order.
    pub fn state_table(&self, n: usize) -> StateTable {
        StateTable {
            states: (0..n).map(|i| self.state(i)).collect(),
        }
    }
}

fn ensure_rate(rate: f64, what: &str) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(QueueError::domain(format!("{what} must be > 0, got {rate}")));
    }
    Ok(())
}

/// Exit rate and next-transition probabilities of one chain state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateParameters {
    /// Total exit rate Ω_i.
    pub permanence_rate: f64,
    /// Probability p_i that the next transition is an arrival.
    pub up_probability: f64,
    /// Probability q_i that the next transition is a departure.
    pub down_probability: f64,
}

/// Computes (Ω_i, p_i, q_i) for state `i` of an M/M/s chain.
///
/// * `i = 0`: only arrivals are possible, Ω_0 = λ, p_0 = 1, q_0 = 0.
/// * `1 <= i < s`: `i` servers busy, Ω_i = λ + i·ν.
/// * `i >= s`: every server busy, Ω_i = λ + s·ν.
///
/// # Errors
///
/// Returns [`QueueError::Domain`] if a rate is not positive or `s` is zero.
pub fn state_parameters(
    arrival_rate: f64,
    service_rate: f64,
    i: usize,
    servers: u32,
) -> Result<StateParameters> {
    let rates = SystemRates::new(arrival_rate, service_rate, servers)?;
    Ok(rates.state(i))
}

fn state_parameters_unchecked(lam: f64, nu: f64, i: usize, servers: u32) -> StateParameters {
    if i == 0 {
        return StateParameters {
            permanence_rate: lam,
            up_probability: 1.0,
            down_probability: 0.0,
        };
    }
    let busy = (i as f64).min(f64::from(servers));
    let omega = lam + busy * nu;
    StateParameters {
        permanence_rate: omega,
        up_probability: lam / omega,
        down_probability: busy * nu / omega,
    }
}

/// Per-state parameters for a contiguous range of states starting at 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTable {
    states: Vec<StateParameters>,
}

impl StateTable {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[StateParameters] {
        &self.states
    }

    /// Ω column.
    pub fn permanence_rates(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.permanence_rate).collect()
    }

    /// p column.
    pub fn up_probabilities(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.up_probability).collect()
    }

    /// q column.
    pub fn down_probabilities(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.down_probability).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rates_are_reciprocals_of_means() {
        assert_relative_eq!(arrival_rate(28.5).unwrap_or(0.0), 1.0 / 28.5);
        assert_relative_eq!(service_rate(20.0).unwrap_or(0.0), 0.05);
    }

    #[test]
    fn non_positive_means_are_rejected() {
        assert!(matches!(arrival_rate(0.0), Err(QueueError::Domain(_))));
        assert!(matches!(service_rate(-3.0), Err(QueueError::Domain(_))));
        assert!(matches!(arrival_rate(f64::NAN), Err(QueueError::Domain(_))));
    }

    #[test]
    fn zero_servers_rejected() {
        assert!(matches!(
            SystemRates::new(1.0, 1.0, 0),
            Err(QueueError::Domain(_))
        ));
    }

    #[test]
    fn empty_state_only_moves_up() {
        let st = state_parameters(0.035, 0.0488, 0, 3).unwrap();
        assert_eq!(st.permanence_rate, 0.035);
        assert_eq!(st.up_probability, 1.0);
        assert_eq!(st.down_probability, 0.0);
    }

    #[test]
    fn unsaturated_state_uses_busy_server_count() {
        let st = state_parameters(1.0, 2.0, 2, 4).unwrap();
        assert_relative_eq!(st.permanence_rate, 5.0);
        assert_relative_eq!(st.up_probability, 0.2);
        assert_relative_eq!(st.down_probability, 0.8);
    }

    #[test]
    fn saturated_state_caps_at_server_count() {
        let a = state_parameters(1.0, 2.0, 3, 3).unwrap();
        let b = state_parameters(1.0, 2.0, 30, 3).unwrap();
        assert_eq!(a, b);
        assert_relative_eq!(a.permanence_rate, 7.0);
        assert_relative_eq!(a.down_probability, 6.0 / 7.0);
    }

    #[test]
    fn transition_probabilities_sum_to_one() {
        let rates = SystemRates::new(0.035, 0.0488, 2).unwrap();
        for st in rates.state_table(12).states() {
            assert_relative_eq!(st.up_probability + st.down_probability, 1.0);
            assert!(st.permanence_rate > 0.0);
        }
    }

    #[test]
    fn stability_check() {
        let stable = SystemRates::new(1.5, 1.0, 2).unwrap();
        assert!(stable.ensure_stable().is_ok());
        let unstable = SystemRates::new(2.0, 1.0, 2).unwrap();
        assert!(matches!(
            unstable.ensure_stable(),
            Err(QueueError::Instability { .. })
        ));
    }
}
