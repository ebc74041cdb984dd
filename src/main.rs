//! queue-sim entry point: CLI wiring and config-driven scenario run.

use std::path::Path;
use std::process;

use clap::Parser;
use tracing::info;

use queue_sim::cli::Cli;
use queue_sim::io::IoError;
use queue_sim::io::export::{export_json, export_occupancy_csv, export_trace_csv};
use queue_sim::logging::init_logging;
use queue_sim::runner::run_scenario;

fn write_or_exit(what: &str, path: &Path, result: Result<(), IoError>) {
    if let Err(e) = result {
        eprintln!("error: failed to write {what}: {e}");
        process::exit(1);
    }
    info!(path = %path.display(), "{what} written");
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let scenario = match cli.load_scenario() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let run = match run_scenario(&scenario) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("{}", run.report);

    if let Some(path) = &cli.trace_out {
        write_or_exit("trace", path, export_trace_csv(&run.trace, path));
    }
    if let Some(path) = &cli.occupancy_out {
        let occupancy = run.trace.occupancy();
        write_or_exit("occupancy", path, export_occupancy_csv(&occupancy, path));
    }
    if let Some(path) = &cli.summary_out {
        write_or_exit("summary", path, export_json(&run.report, path));
    }
}
