//! Simulation state: a payload plus the index of the next element to apply.
//!
//! A [`State`] is a handle to one shared block. [`PayloadView`]s alias the
//! same block, so writes through a view are seen by the state and the block
//! lives until the state handle and every view are dropped.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use bf_core::{MachineId, PhaseVector, Real, TransferMatrix};
use bf_lattice::{Payload, PayloadShape};

use crate::error::{SimError, SimResult};
use crate::snapshot::Snapshot;

#[derive(Debug)]
pub(crate) struct StateBlock {
    pub(crate) machine: MachineId,
    pub(crate) payload: Payload,
    pub(crate) next_elem: usize,
}

type Shared = Arc<RwLock<StateBlock>>;

fn read(block: &Shared) -> RwLockReadGuard<'_, StateBlock> {
    block.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(block: &Shared) -> RwLockWriteGuard<'_, StateBlock> {
    block.write().unwrap_or_else(PoisonError::into_inner)
}

/// Replace every entry of `payload` with `values` (row-major for matrices).
fn assign(payload: &mut Payload, values: &[Real]) -> SimResult<()> {
    let expected = payload.shape().entry_count();
    if values.len() != expected {
        return Err(SimError::WrongLength {
            expected,
            got: values.len(),
        });
    }
    *payload = Payload::from_values(payload.shape(), values)?;
    Ok(())
}

/// Options for [`Machine::alloc_state_with`](crate::Machine::alloc_state_with).
#[derive(Debug, Clone, Default)]
pub struct StateOptions {
    /// Values overlaid onto the default payload (row-major for matrices).
    pub initial: Option<Vec<Real>>,
    /// Starting cursor.
    pub next_elem: usize,
}

#[derive(Debug)]
pub struct State {
    block: Shared,
    shape: PayloadShape,
}

impl State {
    pub(crate) fn new(machine: MachineId, payload: Payload, next_elem: usize) -> Self {
        let shape = payload.shape();
        Self {
            block: Arc::new(RwLock::new(StateBlock {
                machine,
                payload,
                next_elem,
            })),
            shape,
        }
    }

    pub(crate) fn lock(&self) -> RwLockWriteGuard<'_, StateBlock> {
        write(&self.block)
    }

    pub fn machine_id(&self) -> MachineId {
        read(&self.block).machine
    }

    pub fn shape(&self) -> PayloadShape {
        self.shape
    }

    /// Index of the next element propagation will apply.
    pub fn next_elem(&self) -> usize {
        read(&self.block).next_elem
    }

    /// Move the cursor; positions past the end are clamped when propagating.
    pub fn set_next_elem(&self, next_elem: usize) {
        write(&self.block).next_elem = next_elem;
    }

    /// Copy of the current payload.
    pub fn payload(&self) -> Payload {
        read(&self.block).payload.clone()
    }

    pub fn set_payload(&self, payload: Payload) -> SimResult<()> {
        if payload.shape() != self.shape {
            return Err(SimError::ShapeMismatch {
                expected: self.shape,
                got: payload.shape(),
            });
        }
        write(&self.block).payload = payload;
        Ok(())
    }

    /// Overwrite every payload entry; `values` must match the shape exactly.
    pub fn set_values(&self, values: &[Real]) -> SimResult<()> {
        assign(&mut write(&self.block).payload, values)
    }

    pub fn to_vec(&self) -> Vec<Real> {
        read(&self.block).payload.to_vec()
    }

    pub fn vector(&self) -> Option<PhaseVector> {
        read(&self.block).payload.as_vector().copied()
    }

    pub fn matrix(&self) -> Option<TransferMatrix> {
        read(&self.block).payload.as_matrix().copied()
    }

    /// Default payload and cursor at the first element.
    pub fn reset(&self) {
        let mut block = write(&self.block);
        block.payload = Payload::default_for(self.shape);
        block.next_elem = 0;
    }

    pub fn snapshot(&self) -> Snapshot {
        let block = read(&self.block);
        Snapshot::new(block.payload.clone(), block.next_elem)
    }

    /// Independent copy sharing no storage with `self`.
    pub fn duplicate(&self) -> State {
        let block = read(&self.block);
        State::new(block.machine, block.payload.clone(), block.next_elem)
    }

    /// A view aliasing this state's payload.
    pub fn view(&self) -> PayloadView {
        PayloadView {
            block: Arc::clone(&self.block),
        }
    }

    pub fn downgrade(&self) -> WeakState {
        WeakState {
            block: Arc::downgrade(&self.block),
            shape: self.shape,
        }
    }
}

/// Live view of a state's payload.
///
/// Holds the state's storage alive on its own.
#[derive(Debug, Clone)]
pub struct PayloadView {
    block: Shared,
}

impl PayloadView {
    pub fn get(&self) -> Payload {
        read(&self.block).payload.clone()
    }

    pub fn to_vec(&self) -> Vec<Real> {
        read(&self.block).payload.to_vec()
    }

    pub fn set(&self, values: &[Real]) -> SimResult<()> {
        assign(&mut write(&self.block).payload, values)
    }
}

/// Non-owning handle used to observe when a state's storage is released.
#[derive(Debug, Clone)]
pub struct WeakState {
    block: Weak<RwLock<StateBlock>>,
    shape: PayloadShape,
}

impl WeakState {
    pub fn upgrade(&self) -> Option<State> {
        self.block.upgrade().map(|block| State {
            block,
            shape: self.shape,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.block.strong_count() > 0
    }
}
