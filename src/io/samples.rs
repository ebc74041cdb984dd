//! Customer sample tables and their column means.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::IoError;

/// One observed customer: time since the previous arrival and service time.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CustomerSample {
    #[serde(alias = "intervalo")]
    pub interval: f64,
    #[serde(alias = "servicio")]
    pub service: f64,
}

/// Column means of a customer sample table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMeans {
    /// Number of rows averaged.
    pub count: usize,
    /// Mean inter-arrival time.
    pub mean_interarrival: f64,
    /// Mean service time.
    pub mean_service: f64,
}

/// Reads a customer CSV file and returns its column means.
///
/// # Errors
///
/// Returns an [`IoError`] if the file cannot be opened, a row does not parse,
/// the table is empty, or a mean is not positive.
pub fn read_sample_means(path: &Path) -> Result<SampleMeans, IoError> {
    let file = File::open(path)?;
    let means = sample_means(file)?;
    info!(
        path = %path.display(),
        rows = means.count,
        mean_interarrival = means.mean_interarrival,
        mean_service = means.mean_service,
        "loaded customer samples"
    );
    Ok(means)
}

/// Parses customer rows from any reader and averages both columns.
///
/// The header must name an `interval` (or `intervalo`) and a `service` (or
/// `servicio`) column; other columns are ignored.
///
/// # Errors
///
/// See [`read_sample_means`].
pub fn sample_means(reader: impl Read) -> Result<SampleMeans, IoError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut count = 0_usize;
    let mut interval_sum = 0.0;
    let mut service_sum = 0.0;
    for row in rdr.deserialize::<CustomerSample>() {
        let row = row?;
        count += 1;
        interval_sum += row.interval;
        service_sum += row.service;
    }

    if count == 0 {
        return Err(IoError::InvalidSamples("no customer rows".into()));
    }

    let means = SampleMeans {
        count,
        mean_interarrival: interval_sum / count as f64,
        mean_service: service_sum / count as f64,
    };
    if !(means.mean_interarrival > 0.0 && means.mean_service > 0.0) {
        return Err(IoError::InvalidSamples(format!(
            "means must be > 0, got interval={} service={}",
            means.mean_interarrival, means.mean_service
        )));
    }
    Ok(means)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn averages_columns() {
        let csv = "interval,service\n10,4\n20,6\n30,8\n";
        let means = sample_means(csv.as_bytes()).expect("valid csv");
        assert_eq!(means.count, 3);
        assert_relative_eq!(means.mean_interarrival, 20.0);
        assert_relative_eq!(means.mean_service, 6.0);
    }

    #[test]
    fn accepts_spanish_headers_and_extra_columns() {
        let csv = "cliente,intervalo,servicio\n1,12,5\n2,8,7\n";
        let means = sample_means(csv.as_bytes()).expect("valid csv");
        assert_relative_eq!(means.mean_interarrival, 10.0);
        assert_relative_eq!(means.mean_service, 6.0);
    }

    #[test]
    fn empty_table_rejected() {
        let result = sample_means("interval,service\n".as_bytes());
        assert!(matches!(result, Err(IoError::InvalidSamples(_))));
    }

    #[test]
    fn non_numeric_rejected() {
        let result = sample_means("interval,service\nabc,1\n".as_bytes());
        assert!(matches!(result, Err(IoError::Csv(_))));
    }

    #[test]
    fn non_positive_mean_rejected() {
        let result = sample_means("interval,service\n0,1\n0,2\n".as_bytes());
        assert!(matches!(result, Err(IoError::InvalidSamples(_))));
    }
}
