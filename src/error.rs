use thiserror::Error;

/// Failures that abort a dataset load. Per-row problems never surface here;
/// they are counted in the [`crate::loader::LoadReport`] instead.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("required column '{0}' not found after header normalization")]
    MissingColumn(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a `location` string could not be turned into a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location is empty")]
    Empty,

    #[error("expected exactly two comma-separated values, found {0}")]
    WrongArity(usize),

    #[error("'{0}' is not a number")]
    NotNumeric(String),
}
