//! Error types shared by the analytic engines and the simulator.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Failure modes of a single queueing computation.
///
/// Every error is local to the call that produced it; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueueError {
    /// An input lies outside the domain of the model (non-positive rate,
    /// criterion percentage outside (0, 100), empty state range, ...).
    #[error("domain error: {0}")]
    Domain(String),

    /// The queue would grow without bound: λ ≥ s·ν.
    #[error("unstable system: utilization {utilization:.4} >= 1 (λ={arrival_rate}, s·ν={capacity})")]
    Instability {
        arrival_rate: f64,
        capacity: f64,
        utilization: f64,
    },

    /// Root-finding did not reach tolerance within its iteration budget.
    #[error("root-finding did not converge after {iterations} iterations (last estimate {last_estimate})")]
    Convergence { iterations: usize, last_estimate: f64 },

    /// The server-count search hit its ceiling without meeting the criterion.
    #[error(
        "criterion not met with up to {ceiling} servers; use an infinite-server (Poisson) approximation"
    )]
    CapacityLimitReached { ceiling: u32 },
}

impl QueueError {
    pub(crate) fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    pub(crate) fn instability(arrival_rate: f64, capacity: f64) -> Self {
        Self::Instability {
            arrival_rate,
            capacity,
            utilization: arrival_rate / capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instability_reports_utilization() {
        let err = QueueError::instability(2.0, 1.0);
        assert_eq!(
            err,
            QueueError::Instability {
                arrival_rate: 2.0,
                capacity: 1.0,
                utilization: 2.0,
            }
        );
        assert!(err.to_string().contains("2.0000"));
    }

    #[test]
    fn capacity_limit_mentions_poisson() {
        let msg = QueueError::CapacityLimitReached { ceiling: 10 }.to_string();
        assert!(msg.contains("10 servers"));
        assert!(msg.contains("Poisson"));
    }
}
