use crate::constants::Float;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LbError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Could not open geometry file {path:?}: {source}")]
    GeometrySourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Geometry truncated: expected {expected} slices, found {found}")]
    TruncatedGeometry { expected: usize, found: usize },

    #[error("Invalid tag {value:?} in slice {slice}: expected 0, 1 or 2")]
    InvalidTag { value: String, slice: usize },

    #[error("Numerical divergence at iteration {iteration}: {reason}")]
    NumericalDivergence { iteration: usize, reason: String },

    #[error("No flow through the domain (mean velocity {mean_velocity:e})")]
    NoFlow { mean_velocity: Float },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LbResult<T> = Result<T, LbError>;
