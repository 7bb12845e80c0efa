//! Error types for machine and state operations.

use bf_config::ConfigError;
use bf_core::{CoreError, MachineId};
use bf_lattice::{LatticeError, PayloadShape};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Element index {index} out of range (machine has {len} elements)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Type error: not a State")]
    NotAState,

    #[error("Type error: State belongs to machine {state_machine}, not machine {machine}")]
    ForeignState {
        state_machine: MachineId,
        machine: MachineId,
    },

    #[error("Payload shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: PayloadShape,
        got: PayloadShape,
    },

    #[error("Payload needs {expected} values, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("Lattice error: {0}")]
    Lattice(#[from] LatticeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
