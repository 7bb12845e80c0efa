//! bf-core: stable foundation for beamflow.
//!
//! Contains:
//! - matrix (6x6 transfer matrices, phase-space vectors, coordinate indices)
//! - units (uom lengths + metre/millimetre conversion)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for machines and states)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod matrix;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use matrix::*;
pub use numeric::*;
pub use units::*;
