//! Runs every stage of a scenario and collects the report.

use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::{
    SteadyStateDistribution, cumulative_tail, infinite_state_probability, plan, queue_exceedance,
    required_server_count, required_service_time, truncated_mass,
};
use crate::config::ScenarioConfig;
use crate::error::QueueError;
use crate::io::IoError;
use crate::io::samples::read_sample_means;
use crate::model::SystemRates;
use crate::report::{ScenarioReport, TailComparison};
use crate::sim::{SimulationKpis, SimulationTrace, Simulator};

/// Mass above the analysed range beyond which a warning is logged.
const TRUNCATION_WARN_MASS: f64 = 0.01;

/// Failures that stop a scenario before any report exists.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot load samples: {0}")]
    Samples(#[from] IoError),

    #[error(transparent)]
    Model(#[from] QueueError),
}

/// Report plus the simulated timeline it summarizes.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub report: ScenarioReport,
    pub trace: SimulationTrace,
}

/// Builds the rates from the configured means or sample file.
///
/// # Errors
///
/// Returns [`RunError::Samples`] if the sample file cannot be read and
/// [`RunError::Model`] if the resulting rates are invalid.
pub fn resolve_rates(config: &ScenarioConfig) -> Result<(SystemRates, Option<usize>), RunError> {
    let servers = config.analysis.servers;
    match &config.rates.samples {
        Some(path) => {
            let means = read_sample_means(path)?;
            let rates =
                SystemRates::from_means(means.mean_interarrival, means.mean_service, servers)?;
            Ok((rates, Some(means.count)))
        }
        None => {
            let r = &config.rates;
            let rates = SystemRates::from_means(r.mean_interarrival, r.mean_service, servers)?;
            Ok((rates, None))
        }
    }
}

/// Records a stage failure as a note and turns it into `None`.
fn keep<T>(notes: &mut Vec<String>, stage: &str, result: crate::error::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(stage, error = %err, "stage skipped");
            notes.push(format!("{stage}: {err}"));
            None
        }
    }
}

/// Runs analysis, dimensioning and simulation for `config`.
///
/// Analytic stages that need a stable chain (or a reachable criterion) are
/// skipped with a note rather than failing the whole run.
///
/// # Errors
///
/// Returns a [`RunError`] when the rates, criterion, state range or
/// simulation parameters are invalid.
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioRun, RunError> {
    let (rates, sample_rows) = resolve_rates(config)?;
    let criterion = config.quality_criterion()?;
    let sim_config = config.sim_config()?;
    let lam = rates.arrival_rate;
    let nu = rates.service_rate;
    info!(
        arrival_rate = lam,
        service_rate = nu,
        servers = rates.servers,
        utilization = rates.utilization(),
        "rates resolved"
    );

    let mut notes = Vec::new();
    let n = config.analysis.states;
    let states = rates.state_table(n);
    let distribution = SteadyStateDistribution::truncated(&rates, n)?;

    let mass = keep(&mut notes, "truncation", truncated_mass(&rates, n));
    if let Some(mass) = mass.filter(|m| *m > TRUNCATION_WARN_MASS) {
        warn!(mass, states = n, "analysed range leaves out significant probability mass");
    }

    let probe_state = config.analysis.probe_state;
    let probe_probability = keep(
        &mut notes,
        "probe state",
        infinite_state_probability(lam, nu, probe_state),
    );
    let exceedance = keep(&mut notes, "queue exceedance", queue_exceedance(lam, nu));

    let single_server_time = keep(
        &mut notes,
        "single-server time",
        required_service_time(lam, &criterion),
    );
    let required_servers = keep(
        &mut notes,
        "server count",
        required_server_count(lam, nu, &criterion),
    );
    let plan = keep(
        &mut notes,
        "plan",
        plan(lam, nu, &criterion, config.dimensioning.available_servers),
    );

    let simulator = Simulator::from_config(&rates, &sim_config)?;
    let trace = simulator.run_seeded(sim_config.seed)?;
    let level = config.simulation.occupancy_threshold;
    let simulation = SimulationKpis::from_trace(&trace, level);

    let analytic = if level == 0 {
        Some(1.0)
    } else {
        keep(
            &mut notes,
            "analytic tail",
            cumulative_tail(rates.traffic_intensity(), level as usize - 1, 1),
        )
    };
    let tail_comparison = TailComparison {
        level,
        analytic,
        empirical: simulation.exceedance_fraction,
    };

    let report = ScenarioReport {
        rates,
        sample_rows,
        states,
        distribution,
        truncated_mass: mass,
        probe_state,
        probe_probability,
        exceedance,
        criterion,
        single_server_time,
        required_servers,
        plan,
        simulation,
        tail_comparison,
        notes,
    };
    Ok(ScenarioRun { report, trace })
}
