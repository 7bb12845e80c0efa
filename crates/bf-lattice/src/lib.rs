//! bf-lattice: element model for beamflow.
//!
//! Provides:
//! - Element kinds and their first-order transfer matrices
//! - `ElementSpec` with cached, re-derivable transfer data
//! - Parameter values and the flat `Lattice` sequence
//! - `Payload`, the vector or matrix pushed through elements
//!
//! # Example
//!
//! ```
//! use bf_lattice::{ElementKind, ElementSpec, Lattice, params};
//!
//! let drift = ElementSpec::new("d1", ElementKind::Drift, params([("L", 1e-3)])).unwrap();
//! let lattice = Lattice::new(vec![drift.clone(), drift]);
//!
//! assert_eq!(lattice.len(), 2);
//! assert_eq!(lattice.find("d1"), vec![0, 1]);
//! ```

pub mod element;
pub mod error;
pub mod kind;
pub mod lattice;
pub mod optics;
pub mod payload;
pub mod value;

pub use element::ElementSpec;
pub use error::{LatticeError, LatticeResult};
pub use kind::ElementKind;
pub use lattice::Lattice;
pub use payload::{Payload, PayloadShape};
pub use value::{Params, Value, params};
