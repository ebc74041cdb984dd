//! CSV and JSON export of simulation and analysis results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use super::IoError;
use crate::sim::{OccupancySeries, SimulationTrace};

/// Column header of the per-customer trace export.
const TRACE_HEADER: &str = "customer,arrival,service,start,departure,wait";

/// Column header of the occupancy export.
const OCCUPANCY_HEADER: &str = "time,customers";

/// Exports the per-customer trace to a CSV file at the given path.
///
/// # Errors
///
/// Returns an [`IoError`] if file creation or writing fails.
pub fn export_trace_csv(trace: &SimulationTrace, path: &Path) -> Result<(), IoError> {
    let file = File::create(path)?;
    write_trace_csv(trace, io::BufWriter::new(file))
}

/// Writes one row per customer, in arrival order, to any writer.
///
/// # Errors
///
/// Returns an [`IoError`] if writing fails.
pub fn write_trace_csv(trace: &SimulationTrace, writer: impl Write) -> Result<(), IoError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TRACE_HEADER.split(','))?;
    for r in trace.records() {
        wtr.write_record(&[
            r.customer.to_string(),
            r.arrival.to_string(),
            r.service.to_string(),
            r.start.to_string(),
            r.departure.to_string(),
            r.wait.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports the occupancy step function to a CSV file at the given path.
///
/// # Errors
///
/// Returns an [`IoError`] if file creation or writing fails.
pub fn export_occupancy_csv(occupancy: &OccupancySeries, path: &Path) -> Result<(), IoError> {
    let file = File::create(path)?;
    write_occupancy_csv(occupancy, io::BufWriter::new(file))
}

/// Writes one `time,customers` row per change point of the step function.
///
/// Each level holds from its `time` until the next row; the last row is the
/// final departure, where the system is empty again.
///
/// # Errors
///
/// Returns an [`IoError`] if writing fails.
pub fn write_occupancy_csv(occupancy: &OccupancySeries, writer: impl Write) -> Result<(), IoError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(OCCUPANCY_HEADER.split(','))?;
    for step in occupancy.steps() {
        wtr.write_record(&[step.time.to_string(), step.customers.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports any serializable summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an [`IoError`] if file creation, serialization or writing fails.
pub fn export_json<T: Serialize>(value: &T, path: &Path) -> Result<(), IoError> {
    let file = File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
