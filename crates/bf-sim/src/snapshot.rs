//! Frozen copies of a state taken during propagation.

use bf_core::{PhaseVector, Real, TransferMatrix};
use bf_lattice::Payload;

/// Deep copy of a payload and cursor; later propagation never alters it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    payload: Payload,
    next_elem: usize,
}

impl Snapshot {
    pub(crate) fn new(payload: Payload, next_elem: usize) -> Self {
        Self { payload, next_elem }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn next_elem(&self) -> usize {
        self.next_elem
    }

    pub fn vector(&self) -> Option<&PhaseVector> {
        self.payload.as_vector()
    }

    pub fn matrix(&self) -> Option<&TransferMatrix> {
        self.payload.as_matrix()
    }

    pub fn to_vec(&self) -> Vec<Real> {
        self.payload.to_vec()
    }
}
