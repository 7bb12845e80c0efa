//! Linear propagation of beam states through a lattice.
//!
//! Provides:
//! - `Machine`: simulation mode plus an owned, reconfigurable lattice
//! - `State`: shared payload block with a cursor, plus aliasing views
//! - Observation snapshots taken after selected elements
//!
//! # Example
//!
//! ```
//! use bf_sim::Machine;
//!
//! let machine = Machine::from_glps(r#"
//!     sim_type = "Vector";
//!     d: drift, L = 1.0e-3;
//!     l: LINE = (d);
//! "#).unwrap();
//!
//! let state = machine.alloc_state();
//! state.set_values(&[1.0, 1e-3, 0.0, 0.0, 0.0, 0.0]).unwrap();
//! machine.propagate(&state, None).unwrap();
//! assert_eq!(state.next_elem(), 1);
//! ```

pub mod error;
pub mod machine;
pub mod propagate;
pub mod snapshot;
pub mod state;

pub use bf_config::SimType;
pub use error::{SimError, SimResult};
pub use machine::{Machine, payload_shape};
pub use propagate::Observations;
pub use snapshot::Snapshot;
pub use state::{PayloadView, State, StateOptions, WeakState};
