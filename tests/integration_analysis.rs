mod common;

use approx::assert_relative_eq;
use queue_sim::QueueError;
use queue_sim::analysis::{
    DimensioningResult, MAX_SERVERS, QualityCriterion, SteadyStateDistribution, cumulative_tail,
    infinite_state_probability, plan, queue_exceedance, required_per_server_rate,
    required_server_count, required_service_time, truncated_mass,
};
use queue_sim::model::SystemRates;

use common::{LAMBDA, NU, office_criterion, office_rates};

#[test]
fn office_state_five_probability() {
    let phi5 = infinite_state_probability(LAMBDA, NU, 5).expect("stable");
    assert_relative_eq!(phi5, 0.05367, epsilon = 1e-4);
}

#[test]
fn finite_chain_matches_closed_form_up_to_truncation() {
    let rates = office_rates();
    let n = 60;
    let dist = SteadyStateDistribution::truncated(&rates, n).expect("solvable");
    let mass = truncated_mass(&rates, n).expect("stable");
    assert!(mass < 1e-8);
    for i in 0..10 {
        let exact = infinite_state_probability(LAMBDA, NU, i).expect("stable");
        assert_relative_eq!(dist.get(i).unwrap_or_default(), exact, max_relative = 1e-6);
    }
}

#[test]
fn truncated_distribution_sums_to_one() {
    for servers in 1..=3 {
        let rates = SystemRates::new(LAMBDA, NU, servers).expect("valid");
        let dist = SteadyStateDistribution::truncated(&rates, 6).expect("solvable");
        assert_relative_eq!(dist.total(), 1.0, epsilon = 1e-12);
        assert!(dist.probabilities().iter().all(|p| *p >= 0.0));
    }
}

#[test]
fn more_servers_shrink_the_tail() {
    let r = LAMBDA / NU;
    let three = cumulative_tail(r, 6, 3).expect("stable");
    let five = cumulative_tail(r, 6, 5).expect("stable");
    assert_relative_eq!(three, 0.07302, epsilon = 1e-4);
    assert_relative_eq!(five, 0.00361, epsilon = 1e-4);
    assert!(five < three);
}

#[test]
fn office_dimensioning_answers() {
    let c = office_criterion();
    assert_eq!(required_service_time(LAMBDA, &c).ok(), Some(15));
    assert_eq!(required_server_count(LAMBDA, NU, &c).ok(), Some(5));
    assert_eq!(required_per_server_rate(LAMBDA, NU, &c, 3).ok(), Some(20));
}

#[test]
fn looser_criterion_needs_one_server() {
    let c = QualityCriterion::new(5, 90.0).expect("valid");
    assert_eq!(required_server_count(LAMBDA, NU, &c).ok(), Some(1));
}

#[test]
fn heavy_load_hits_server_ceiling() {
    // r = 9.5 keeps the tail near one for every s <= 10.
    let c = office_criterion();
    let result = required_server_count(0.95, 0.1, &c);
    assert_eq!(
        result,
        Err(QueueError::CapacityLimitReached {
            ceiling: MAX_SERVERS
        })
    );
}

#[test]
fn plan_covers_each_branch() {
    let c = office_criterion();
    assert_eq!(
        plan(LAMBDA, NU, &c, 1).ok(),
        Some(DimensioningResult::SingleServer {
            max_service_time: 15
        })
    );
    assert_eq!(
        plan(LAMBDA, NU, &c, 6).ok(),
        Some(DimensioningResult::ServerCount { servers: 5 })
    );
    assert_eq!(
        plan(LAMBDA, NU, &c, 2).ok(),
        Some(DimensioningResult::PerServerServiceTime {
            servers: 2,
            max_service_time: 18
        })
    );
}

#[test]
fn office_queue_exceedance() {
    let ex = queue_exceedance(LAMBDA, NU).expect("stable");
    assert_eq!(ex.mean_queue, 2);
    assert_eq!(ex.state_horizon, 3);
    assert_relative_eq!(ex.percent_time, 36.893, epsilon = 1e-2);
}

#[test]
fn unstable_rates_are_reported() {
    assert!(matches!(
        infinite_state_probability(0.05, 0.04, 0),
        Err(QueueError::Instability { .. })
    ));
    assert!(matches!(
        queue_exceedance(0.05, 0.05),
        Err(QueueError::Instability { .. })
    ));
}
