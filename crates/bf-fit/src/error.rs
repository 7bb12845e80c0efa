//! Error types for fitting.

use bf_sim::SimError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FitError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),
}

pub type FitResult<T> = Result<T, FitError>;
