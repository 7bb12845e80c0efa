//! Least squares fitting of element parameters.
//!
//! A residual is formed by propagating a seeded state through the machine
//! and subtracting a target; Levenberg-Marquardt minimizes its norm.

pub mod error;
pub mod jacobian;
pub mod lm;
pub mod problem;

pub use error::{FitError, FitResult};
pub use lm::{Differencing, LmConfig, LmResult, levenberg_marquardt};
pub use problem::ElementFit;
