//! Error types for the crate.
//!
//! This module defines low-level backend errors returned by concrete
//! algebraic backends (Arkworks, blstrs, the integer ring) as well as the
//! harness-facing `Error` type used by samplers, suites and the runner.
//!
//! The errors are implemented with `thiserror` and are `Clone`, so a failure
//! can be stored inside the per-operation outcome it caused.
//!
//! # Examples
//!
//! ```rust
//! use opcost::errors::{BackendError, Error};
//! use opcost::Operation;
//!
//! let err = Error::Operation {
//!     operation: Operation::Div,
//!     source: BackendError::Math("division by zero"),
//! };
//! assert_eq!(err.to_string(), "operation div failed: math error: division by zero");
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::adapter::BackendState;
use crate::domain::Operation;

/// Errors bubbled up from backend implementations (Arkworks, blstrs, num-bigint).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(&'static str),
    #[error("unsupported backend feature: {0}")]
    UnsupportedFeature(&'static str),
    #[error("math error: {0}")]
    Math(&'static str),
    #[error("{0}")]
    Other(String),
}

/// High-level errors returned by the benchmarking harness.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("randomness source unavailable: {0}")]
    Sampling(String),
    #[error("parameter generation failed: {0}")]
    ParameterGeneration(#[from] BackendError),
    #[error("operation {operation} failed: {source}")]
    Operation {
        operation: Operation,
        source: BackendError,
    },
    #[error("no samples recorded for {0}")]
    NoSamples(Operation),
    #[error("time budget of {budget:?} exhausted after {completed} trials")]
    Timeout { budget: Duration, completed: u64 },
    #[error("backend cannot move from {from:?} to {to:?}")]
    InvalidState { from: BackendState, to: BackendState },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Sampling failures poison the whole backend: its randomness can no
    /// longer be trusted, so no later domain of the same backend runs.
    pub fn is_fatal_to_backend(&self) -> bool {
        matches!(
            self,
            Error::Sampling(_) | Error::ParameterGeneration(_) | Error::InvalidState { .. }
        )
    }
}
