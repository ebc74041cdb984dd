//! Stationary occupancy distribution of the birth-death chain.
//!
//! Two families of results live here: a recursive solution over a finite
//! range of states that works for any server count, and closed forms for the
//! unbounded M/M/1 and M/M/s queues.
//!
//! The finite solution normalizes over the states it was asked for. Any
//! probability mass the unbounded chain places above that range is folded
//! into the retained states; [`truncated_mass`] reports how much that is.

use serde::Serialize;
use tracing::debug;

use crate::error::{QueueError, Result};
use crate::model::SystemRates;

/// Stationary probabilities φ_0..φ_{n-1} over a finite state range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteadyStateDistribution {
    probabilities: Vec<f64>,
}

impl SteadyStateDistribution {
    /// Solves the chain of `rates` over states `0..n`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Domain`] if `n` is zero.
    pub fn truncated(rates: &SystemRates, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(QueueError::domain("state range must contain at least one state"));
        }
        let table = rates.state_table(n);
        finite_distribution(
            &table.permanence_rates(),
            &table.up_probabilities(),
            &table.down_probabilities(),
            n,
        )
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability of state `i`, or `None` past the truncation.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.probabilities.get(i).copied()
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Sum of all retained probabilities (1 up to rounding).
    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// P(X <= i) within the retained range.
    pub fn cumulative(&self, i: usize) -> f64 {
        self.probabilities.iter().take(i + 1).sum()
    }

    /// Expected number of customers in the system.
    pub fn mean_occupancy(&self) -> f64 {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(i, p)| i as f64 * p)
            .sum()
    }
}

/// Solves local balance φ_i·Ω_i·q_i = φ_{i-1}·Ω_{i-1}·p_{i-1} for states `0..n`.
///
/// The ratios φ_i/φ_0 are accumulated as logarithms and normalized against
/// the largest one, so long chains with λ ≫ ν stay finite: the result is
/// φ_i = exp(ℓ_i − ℓ_max) / Σ_j exp(ℓ_j − ℓ_max).
///
/// # Arguments
///
/// * `omega` - Permanence rates Ω_i
/// * `up` - Arrival probabilities p_i
/// * `down` - Departure probabilities q_i
/// * `n` - Number of states to solve (`0..n`)
///
/// # Errors
///
/// Returns [`QueueError::Domain`] if `n` is zero, any slice is shorter than
/// `n`, a state above 0 has a non-positive departure flow Ω_i·q_i, or a state
/// below n − 1 has a negative or non-finite arrival flow Ω_i·p_i.
pub fn finite_distribution(
    omega: &[f64],
    up: &[f64],
    down: &[f64],
    n: usize,
) -> Result<SteadyStateDistribution> {
    if n == 0 {
        return Err(QueueError::domain("state range must contain at least one state"));
    }
    if omega.len() < n || up.len() < n || down.len() < n {
        return Err(QueueError::domain(format!(
            "parameter arrays cover {} states, {n} requested",
            omega.len().min(up.len()).min(down.len())
        )));
    }
    for i in 1..n {
        let outflow = omega[i] * down[i];
        if !outflow.is_finite() || outflow <= 0.0 {
            return Err(QueueError::domain(format!(
                "state {i} has no downward flow (Ω={}, q={})",
                omega[i], down[i]
            )));
        }
        let inflow = omega[i - 1] * up[i - 1];
        if !inflow.is_finite() || inflow < 0.0 {
            return Err(QueueError::domain(format!(
                "state {} has an invalid upward flow (Ω={}, p={})",
                i - 1,
                omega[i - 1],
                up[i - 1]
            )));
        }
    }

    // ℓ_0 = 0, so the maximum is finite; a zero inflow gives ℓ = −∞ and φ = 0.
    let mut log_ratios = Vec::with_capacity(n);
    log_ratios.push(0.0_f64);
    for i in 1..n {
        let step = (omega[i - 1] * up[i - 1]).ln() - (omega[i] * down[i]).ln();
        log_ratios.push(log_ratios[i - 1] + step);
    }

    let peak = log_ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = log_ratios.iter().map(|l| (l - peak).exp()).collect();
    let total: f64 = weights.iter().sum();
    let probabilities = weights.into_iter().map(|w| w / total).collect();
    Ok(SteadyStateDistribution { probabilities })
}

/// Closed-form M/M/1 probability φ_i = r^i·(1 − r), r = λ/ν.
///
/// # Errors
///
/// Returns [`QueueError::Domain`] for non-positive rates and
/// [`QueueError::Instability`] when r ≥ 1.
pub fn infinite_state_probability(arrival_rate: f64, service_rate: f64, i: usize) -> Result<f64> {
    let rates = SystemRates::new(arrival_rate, service_rate, 1)?;
    rates.ensure_stable()?;
    let r = rates.traffic_intensity();
    Ok(r.powf(i as f64) * (1.0 - r))
}

/// Probability that an M/M/s system holds at least `L + 1` customers.
///
/// Computes 1 − Σ_{i=0}^{L} φ_i with
///
/// * φ_i = r^i/i! · φ_0 for i < s,
/// * φ_i = s^s·(r/s)^i/s! · φ_0 for i ≥ s,
///
/// where φ_0 = 1/(Σ_{k<s} r^k/k! + s·r^s/(s!·(1 − r/s))). For s = 1 this is
/// the exact M/M/1 tail r^{L+1}. For s > 1 the saturated series in φ_0 is
/// weighted by s, which overstates congestion relative to the Erlang-C
/// normalization; the server-count search in `dimensioning` is calibrated
/// against this form.
///
/// # Errors
///
/// Returns [`QueueError::Domain`] if `r` is not positive or `servers` is zero
/// and [`QueueError::Instability`] when r ≥ s.
pub fn cumulative_tail(r: f64, threshold: usize, servers: u32) -> Result<f64> {
    if !r.is_finite() || r <= 0.0 {
        return Err(QueueError::domain(format!("offered load must be > 0, got {r}")));
    }
    if servers == 0 {
        return Err(QueueError::domain("server count must be >= 1"));
    }
    let s = f64::from(servers);
    if r >= s {
        return Err(QueueError::instability(r, s));
    }

    let s_idx = servers as usize;
    // r^k/k! for k = 0..=s
    let mut terms = Vec::with_capacity(s_idx + 1);
    let mut term = 1.0;
    terms.push(term);
    for k in 1..=s_idx {
        term *= r / k as f64;
        terms.push(term);
    }

    let alfa: f64 = terms[..s_idx].iter().sum();
    let beta = s * terms[s_idx] / (1.0 - r / s);
    let phi0 = 1.0 / (alfa + beta);

    let mut within = 0.0;
    let mut saturated = terms[s_idx];
    for i in 0..=threshold {
        if i < s_idx {
            within += terms[i] * phi0;
        } else {
            if i > s_idx {
                saturated *= r / s;
            }
            within += saturated * phi0;
        }
    }

    let tail = (1.0 - within).clamp(0.0, 1.0);
    debug!(r, threshold, servers, phi0, tail, "cumulative tail");
    Ok(tail)
}

/// Mean queue length of a busy single server and how often it is exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueueExceedance {
    /// Mean number waiting while the server is busy, λ²/(ν(ν−λ)), rounded up.
    pub mean_queue: u64,
    /// State horizon ⌈mean_queue / r⌉ over which the head mass is summed.
    pub state_horizon: usize,
    /// Percentage of time spent at or beyond the state horizon.
    pub percent_time: f64,
}

/// Mean queue of an M/M/1 system and the percentage of time it is reached.
///
/// # Errors
///
/// Returns [`QueueError::Domain`] for non-positive rates and
/// [`QueueError::Instability`] when λ ≥ ν.
pub fn queue_exceedance(arrival_rate: f64, service_rate: f64) -> Result<QueueExceedance> {
    let rates = SystemRates::new(arrival_rate, service_rate, 1)?;
    rates.ensure_stable()?;

    let lam = arrival_rate;
    let nu = service_rate;
    let mean_queue = (lam * lam / (nu * (nu - lam))).ceil();
    let r = rates.traffic_intensity();
    let state_horizon = (mean_queue / r).ceil() as usize;

    let mut head = 0.0;
    for n in 0..state_horizon {
        head += infinite_state_probability(lam, nu, n)?;
    }

    Ok(QueueExceedance {
        mean_queue: mean_queue as u64,
        state_horizon,
        percent_time: 100.0 * (1.0 - head),
    })
}

/// Probability that the unbounded chain is in a state ≥ `n`.
///
/// This is exactly the mass that [`finite_distribution`] over `0..n`
/// redistributes onto the retained states when it normalizes.
///
/// # Errors
///
/// Returns [`QueueError::Domain`] if `n` is zero and
/// [`QueueError::Instability`] when λ ≥ s·ν.
pub fn truncated_mass(rates: &SystemRates, n: usize) -> Result<f64> {
    if n == 0 {
        return Err(QueueError::domain("state range must contain at least one state"));
    }
    rates.ensure_stable()?;

    let lam = rates.arrival_rate;
    let nu = rates.service_rate;
    let s = rates.servers as usize;
    let step = |i: usize| lam / (i.min(s) as f64 * nu);

    let mut u = 1.0;
    let mut head = 1.0;
    let mut i = 1;
    while i < n {
        u *= step(i);
        head += u;
        i += 1;
    }

    let mut tail = 0.0;
    while i < s {
        u *= step(i);
        tail += u;
        i += 1;
    }
    let rho = rates.utilization();
    tail += u * rho / (1.0 - rho);

    Ok(tail / (head + tail))
}
