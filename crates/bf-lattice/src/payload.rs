//! Numeric payload carried through a lattice.

use bf_core::{
    CoreResult, PhaseVector, Real, TransferMatrix, identity, matrix_from_row_major,
    vector_from_slice,
};

/// Shape of a payload; fixed per machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Single 6-component phase-space vector.
    Vector,
    /// Cumulative 6x6 transfer matrix.
    Matrix,
}

impl PayloadShape {
    /// Number of scalar entries.
    pub fn entry_count(self) -> usize {
        match self {
            PayloadShape::Vector => bf_core::PHASE_DIM,
            PayloadShape::Matrix => bf_core::MATRIX_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Vector(PhaseVector),
    Matrix(TransferMatrix),
}

impl Payload {
    /// Zero vector or identity matrix.
    pub fn default_for(shape: PayloadShape) -> Self {
        match shape {
            PayloadShape::Vector => Payload::Vector(PhaseVector::zeros()),
            PayloadShape::Matrix => Payload::Matrix(identity()),
        }
    }

    /// Overlay `values` (row-major for matrices) onto the default for `shape`.
    pub fn from_values(shape: PayloadShape, values: &[Real]) -> CoreResult<Self> {
        Ok(match shape {
            PayloadShape::Vector => Payload::Vector(vector_from_slice(values)?),
            PayloadShape::Matrix => Payload::Matrix(matrix_from_row_major(values)?),
        })
    }

    pub fn shape(&self) -> PayloadShape {
        match self {
            Payload::Vector(_) => PayloadShape::Vector,
            Payload::Matrix(_) => PayloadShape::Matrix,
        }
    }

    /// Left-multiply by `t`, so successive calls accumulate in propagation order.
    pub fn compose(&mut self, t: &TransferMatrix) {
        match self {
            Payload::Vector(v) => *v = t * *v,
            Payload::Matrix(m) => *m = t * *m,
        }
    }

    pub fn as_vector(&self) -> Option<&PhaseVector> {
        match self {
            Payload::Vector(v) => Some(v),
            Payload::Matrix(_) => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&TransferMatrix> {
        match self {
            Payload::Matrix(m) => Some(m),
            Payload::Vector(_) => None,
        }
    }

    /// Flat copy of the entries (row-major for matrices).
    pub fn to_vec(&self) -> Vec<Real> {
        match self {
            Payload::Vector(v) => v.iter().copied().collect(),
            Payload::Matrix(m) => bf_core::matrix_to_row_major(m),
        }
    }
}
