//! File ingestion and export.

use thiserror::Error;

pub mod export;
/// Customer sample ingestion from CSV.
pub mod samples;

/// Errors raised while reading samples or writing artifacts.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid samples: {0}")]
    InvalidSamples(String),
}
