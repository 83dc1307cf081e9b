use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid month '{0}': expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown branch: {0}")]
    UnknownBranch(String),

    #[error("Invalid target value {value} for branch {branch}: must be a finite, non-negative number")]
    InvalidTargetValue { branch: String, value: f64 },

    #[error("Invalid chunk size {0}: must be at least 1")]
    InvalidChunkSize(usize),

    #[error("Operation '{0}' requires a privileged session")]
    Unauthorized(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
