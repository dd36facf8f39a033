use thiserror::Error;

/// Invalid run parameters, reported before any pipeline stage starts.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("n must be positive: got {n}")]
    InvalidCount { n: u64 },
    #[error("Failed to build HTTP client: {source}")]
    BuildClient {
        #[source]
        source: reqwest::Error,
    },
}

/// Call-level failure of a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Invalid run configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Run canceled after {completed} of {requested} requests.")]
    Cancelled { completed: u64, requested: u64 },
}

impl RunError {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Cancelled { .. })
    }
}
