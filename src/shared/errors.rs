//! Errors raised by the CTMC pipeline and the histogram loader.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Only the two-promoter (2) and three-promoter (3) families exist.
    #[error("unsupported model family {0} (expected 2 or 3)")]
    UnsupportedModelFamily(u8),

    /// Missing or malformed observation histogram.
    #[error("observation data unavailable: {0}")]
    DataUnavailable(String),

    /// Eigen-decomposition did not converge, or NaN/Inf appeared in a
    /// probability vector or a log-likelihood.
    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    #[error("invalid time schedule: {0}")]
    InvalidTimeSchedule(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
