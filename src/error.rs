//! Errors surfaced by the data pipeline.
//!
//! Only loading can fail. Geometry degeneracies are resolved in place and
//! countries without coordinates are skipped with a warning.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch {url}: {reason}")]
    Http { url: String, reason: String },
    #[error("server returned status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset contains no usable records")]
    Empty,
}

impl LoadError {
    /// Short label for the retry prompt.
    pub fn headline(&self) -> &'static str {
        match self {
            LoadError::Io(_) | LoadError::Http { .. } | LoadError::Status { .. } => {
                "failed to load the data file"
            }
            LoadError::Csv(_) => "failed to parse the data file",
            LoadError::Empty => "the data file is empty",
        }
    }
}
