//! Server count and service time sizing against a quality criterion.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use super::steady_state::cumulative_tail;
use crate::error::{QueueError, Result};
use crate::model::SystemRates;

/// Largest server count the finite-sum tail formula is searched over.
pub const MAX_SERVERS: u32 = 10;

/// Starting guess for the service intensity root, close to zero.
const NEWTON_INITIAL_GUESS: f64 = 1e-4;
const MAX_NEWTON_ITERATIONS: usize = 500;
/// Tolerance on the step in ln v, i.e. a relative tolerance on v.
const NEWTON_RELATIVE_TOLERANCE: f64 = 1e-12;

/// Maximum queue length tolerated during at least `percentage` % of the time.
///
/// # Examples
///
/// ```
/// use queue_sim::analysis::QualityCriterion;
///
/// let criterion = QualityCriterion::new(5, 99.0).unwrap();
/// assert!((criterion.tolerated_fraction() - 0.01).abs() < 1e-12);
/// assert!(QualityCriterion::new(5, 100.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityCriterion {
    /// Queue length Lq (customers waiting, not being served).
    pub queue_threshold: u32,
    /// Percentage of operating time P, strictly between 0 and 100.
    pub percentage: f64,
}

impl QualityCriterion {
    /// # Errors
    ///
    /// Returns [`QueueError::Domain`] if `percentage` is outside (0, 100).
    pub fn new(queue_threshold: u32, percentage: f64) -> Result<Self> {
        if !(percentage > 0.0 && percentage < 100.0) {
            return Err(QueueError::domain(format!(
                "criterion percentage must be in (0, 100), got {percentage}"
            )));
        }
        Ok(Self {
            queue_threshold,
            percentage,
        })
    }

    /// Largest fraction of time the queue may exceed the threshold, 1 − P/100.
    pub fn tolerated_fraction(&self) -> f64 {
        1.0 - self.percentage / 100.0
    }

    /// System state L = ⌈Lq + r⌉ whose exceedance the M/M/s search evaluates.
    fn system_threshold(&self, r: f64) -> usize {
        (f64::from(self.queue_threshold) + r).ceil() as usize
    }
}

/// Longest mean service time (seconds) a single server may take.
///
/// Solves (λ/v)^(Lq+2) = 1 − P/100 for the service intensity `v` with a
/// bounded Newton iteration in ln v started near zero, and returns ⌈1/v⌉.
///
/// # Errors
///
/// Returns [`QueueError::Domain`] for a non-positive arrival rate and
/// [`QueueError::Convergence`] if the iteration does not settle.
pub fn required_service_time(arrival_rate: f64, criterion: &QualityCriterion) -> Result<u64> {
    if !arrival_rate.is_finite() || arrival_rate <= 0.0 {
        return Err(QueueError::domain(format!(
            "arrival rate must be > 0, got {arrival_rate}"
        )));
    }
    let exponent = f64::from(criterion.queue_threshold) + 2.0;
    let v = solve_service_intensity(arrival_rate, exponent, criterion.tolerated_fraction())?;
    Ok(ceil_seconds(v))
}

/// Newton iteration on g(u) = e·(ln λ − u) − ln p with u = ln v.
///
/// g is linear in u, so the first step lands on the root from any start and
/// the second confirms it. Any threshold is reached in the same two steps.
fn solve_service_intensity(lam: f64, exponent: f64, p: f64) -> Result<f64> {
    let (ln_lam, ln_p) = (lam.ln(), p.ln());
    let mut u = NEWTON_INITIAL_GUESS.ln();
    for iteration in 1..=MAX_NEWTON_ITERATIONS {
        let g = exponent * (ln_lam - u) - ln_p;
        // g'(u) = −e
        let next = u + g / exponent;
        if !next.is_finite() {
            break;
        }
        if (next - u).abs() <= NEWTON_RELATIVE_TOLERANCE {
            let v = next.exp();
            debug!(iteration, intensity = v, "service intensity converged");
            return Ok(v);
        }
        u = next;
    }
    let last_estimate = u.exp();
    warn!(last_estimate, "service intensity did not converge");
    Err(QueueError::Convergence {
        iterations: MAX_NEWTON_ITERATIONS,
        last_estimate,
    })
}

/// Smallest number of servers meeting the criterion at the current rates.
///
/// Servers are added one at a time from 1 while the probability of holding
/// more than L = ⌈Lq + λ/ν⌉ customers is at least 1 − P/100. Server counts
/// that cannot carry the load (λ/ν ≥ s) never satisfy the criterion.
///
/// # Errors
///
/// Returns [`QueueError::Domain`] for non-positive rates and
/// [`QueueError::CapacityLimitReached`] when [`MAX_SERVERS`] servers are not
/// enough; past that point an infinite-server approximation is the
/// appropriate model.
pub fn required_server_count(
    arrival_rate: f64,
    service_rate: f64,
    criterion: &QualityCriterion,
) -> Result<u32> {
    let rates = SystemRates::new(arrival_rate, service_rate, 1)?;
    let r = rates.traffic_intensity();
    let threshold = criterion.system_threshold(r);
    let tolerated = criterion.tolerated_fraction();

    for servers in 1..=MAX_SERVERS {
        if r >= f64::from(servers) {
            debug!(servers, r, "server count cannot carry the offered load");
            continue;
        }
        let tail = cumulative_tail(r, threshold, servers)?;
        debug!(servers, threshold, tail, tolerated, "server count probe");
        if tail < tolerated {
            return Ok(servers);
        }
    }

    warn!(ceiling = MAX_SERVERS, r, "server search exhausted");
    Err(QueueError::CapacityLimitReached {
        ceiling: MAX_SERVERS,
    })
}

/// Mean service time (seconds) each of `servers` servers must achieve.
///
/// When the current service rate already meets the criterion this is ⌈1/ν⌉.
/// Otherwise, with D the ratio of the computed tail probability to the
/// tolerated one and φ_L = 1 − tail, ν is scaled by (φ_L + D − 1)/(D·φ_L).
///
/// # Errors
///
/// Returns [`QueueError::Domain`] for non-positive rates or zero servers and
/// [`QueueError::Instability`] when the servers cannot carry the load.
pub fn required_per_server_rate(
    arrival_rate: f64,
    service_rate: f64,
    criterion: &QualityCriterion,
    servers: u32,
) -> Result<u64> {
    let rates = SystemRates::new(arrival_rate, service_rate, servers)?;
    let r = rates.traffic_intensity();
    let tail = cumulative_tail(r, criterion.system_threshold(r), servers)?;
    let ratio = tail / criterion.tolerated_fraction();

    if ratio <= 1.0 {
        return Ok(ceil_seconds(service_rate));
    }

    let within = 1.0 - tail;
    let factor = (within + ratio - 1.0) / (ratio * within);
    debug!(servers, ratio, factor, "scaling per-server service rate");
    Ok(ceil_seconds(factor * service_rate))
}

fn ceil_seconds(intensity: f64) -> u64 {
    (1.0 / intensity).ceil() as u64
}

/// Outcome of sizing a system for a criterion and a number of available servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DimensioningResult {
    /// One server suffices if it serves each customer within this many seconds.
    SingleServer { max_service_time: u64 },
    /// The current service rate meets the criterion with this many servers.
    ServerCount { servers: u32 },
    /// Only `servers` are available; each must serve within this many seconds.
    PerServerServiceTime { servers: u32, max_service_time: u64 },
}

impl fmt::Display for DimensioningResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleServer { max_service_time } => write!(
                f,
                "a single server must take at most {max_service_time} s per customer"
            ),
            Self::ServerCount { servers } => write!(
                f,
                "current service rate already meets the criterion; minimum servers: {servers}"
            ),
            Self::PerServerServiceTime {
                servers,
                max_service_time,
            } => write!(
                f,
                "with only {servers} servers, each must take at most {max_service_time} s per customer"
            ),
        }
    }
}

/// Chooses between the three sizing answers for `available_servers`.
///
/// # Errors
///
/// Propagates errors from the individual solvers. A capacity-limited search
/// is only an error when `available_servers` reaches [`MAX_SERVERS`].
pub fn plan(
    arrival_rate: f64,
    service_rate: f64,
    criterion: &QualityCriterion,
    available_servers: u32,
) -> Result<DimensioningResult> {
    if available_servers == 0 {
        return Err(QueueError::domain("available servers must be >= 1"));
    }
    let single = || {
        required_service_time(arrival_rate, criterion)
            .map(|max_service_time| DimensioningResult::SingleServer { max_service_time })
    };
    if available_servers == 1 {
        return single();
    }

    let minimum = match required_server_count(arrival_rate, service_rate, criterion) {
        Ok(minimum) => Some(minimum),
        Err(QueueError::CapacityLimitReached { .. }) if available_servers < MAX_SERVERS => None,
        Err(e) => return Err(e),
    };

    match minimum {
        Some(1) => single(),
        Some(minimum) if available_servers >= minimum => {
            Ok(DimensioningResult::ServerCount { servers: minimum })
        }
        _ => {
            let max_service_time =
                required_per_server_rate(arrival_rate, service_rate, criterion, available_servers)?;
            Ok(DimensioningResult::PerServerServiceTime {
                servers: available_servers,
                max_service_time,
            })
        }
    }
}
