//! Human-readable and serializable summary of a scenario run.

use std::fmt;

use serde::Serialize;

use crate::analysis::{DimensioningResult, QualityCriterion, QueueExceedance, SteadyStateDistribution};
use crate::model::{StateTable, SystemRates};
use crate::sim::SimulationKpis;

/// Simulated versus analytic share of time with at least `level` customers.
#[derive(Debug, Clone, Serialize)]
pub struct TailComparison {
    /// Occupancy level compared.
    pub level: u32,
    /// M/M/1 probability of holding `level` or more customers, if stable.
    pub analytic: Option<f64>,
    /// Fraction of simulated time units at or above `level`.
    pub empirical: f64,
}

/// Everything one scenario run produced, ready for printing or JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub rates: SystemRates,
    /// Rows averaged when the rates came from a sample file.
    pub sample_rows: Option<usize>,
    pub states: StateTable,
    pub distribution: SteadyStateDistribution,
    /// Probability mass above the truncated range, if the chain is stable.
    pub truncated_mass: Option<f64>,
    pub probe_state: usize,
    /// Closed-form M/M/1 probability of `probe_state`, if stable.
    pub probe_probability: Option<f64>,
    pub exceedance: Option<QueueExceedance>,
    pub criterion: QualityCriterion,
    /// Longest single-server mean service time meeting the criterion.
    pub single_server_time: Option<u64>,
    /// Smallest server count meeting the criterion at the current rates.
    pub required_servers: Option<u32>,
    pub plan: Option<DimensioningResult>,
    pub simulation: SimulationKpis,
    pub tail_comparison: TailComparison,
    /// Conditions that prevented a section from being computed.
    pub notes: Vec<String>,
}

fn opt<T: fmt::Display>(value: Option<T>, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v}{unit}"))
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}%", v * 100.0))
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.rates;
        writeln!(f, "--- Rates ---")?;
        if let Some(rows) = self.sample_rows {
            writeln!(f, "Derived from {rows} customer samples")?;
        }
        writeln!(f, "Arrival intensity:     {:.4}", r.arrival_rate)?;
        writeln!(f, "Service intensity:     {:.4}", r.service_rate)?;
        writeln!(f, "Servers:               {}", r.servers)?;
        writeln!(f, "Utilization:           {:.4}", r.utilization())?;

        writeln!(f, "\n--- States ---")?;
        writeln!(f, "  i   Omega      p        q        phi")?;
        for (i, (st, phi)) in self
            .states
            .states()
            .iter()
            .zip(self.distribution.probabilities())
            .enumerate()
        {
            writeln!(
                f,
                "{i:>3}   {:.4}   {:.4}   {:.4}   {:.6}",
                st.permanence_rate, st.up_probability, st.down_probability, phi
            )?;
        }
        writeln!(f, "Mass above range:      {}", pct(self.truncated_mass))?;
        writeln!(
            f,
            "P(state {}) (M/M/1):   {}",
            self.probe_state,
            pct(self.probe_probability)
        )?;
        if let Some(ex) = &self.exceedance {
            writeln!(
                f,
                "{:.4}% of the time at least {} customers wait in line",
                ex.percent_time, ex.mean_queue
            )?;
        }

        writeln!(f, "\n--- Dimensioning ---")?;
        writeln!(
            f,
            "Criterion:             at most {} waiting during {}% of the time",
            self.criterion.queue_threshold, self.criterion.percentage
        )?;
        writeln!(f, "Single-server time:    {}", opt(self.single_server_time, " s"))?;
        writeln!(f, "Required servers:      {}", opt(self.required_servers, ""))?;
        writeln!(f, "Plan:                  {}", opt(self.plan, ""))?;

        writeln!(f, "\n{}", self.simulation)?;
        let cmp = &self.tail_comparison;
        write!(
            f,
            "\nP(n >= {}): analytic {}  simulated {:.4}%",
            cmp.level,
            pct(cmp.analytic),
            cmp.empirical * 100.0
        )?;

        for note in &self.notes {
            write!(f, "\nnote: {note}")?;
        }
        Ok(())
    }
}
