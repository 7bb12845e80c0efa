//! Phase-space vectors and 6x6 transfer matrices.

use nalgebra::{Matrix6, Vector6};

use crate::{CoreError, CoreResult, Real, nulp_eq};

/// Number of phase-space coordinates.
pub const PHASE_DIM: usize = 6;

/// Entries in a full transfer matrix.
pub const MATRIX_LEN: usize = PHASE_DIM * PHASE_DIM;

pub type TransferMatrix = Matrix6<Real>;
pub type PhaseVector = Vector6<Real>;

/// Coordinate indices: `x, x', y, y', s, δ`.
pub mod ps {
    pub const X: usize = 0;
    pub const PX: usize = 1;
    pub const Y: usize = 2;
    pub const PY: usize = 3;
    pub const S: usize = 4;
    pub const PS: usize = 5;
}

pub fn identity() -> TransferMatrix {
    TransferMatrix::identity()
}

/// Build a matrix by overlaying row-major `values` onto the identity.
///
/// Shorter inputs leave the remaining entries at their identity values.
pub fn matrix_from_row_major(values: &[Real]) -> CoreResult<TransferMatrix> {
    if values.len() > MATRIX_LEN {
        return Err(CoreError::TooLarge {
            what: "transfer matrix",
            got: values.len(),
            max: MATRIX_LEN,
        });
    }
    let mut out = identity();
    for (i, v) in values.iter().enumerate() {
        out[(i / PHASE_DIM, i % PHASE_DIM)] = *v;
    }
    Ok(out)
}

/// Build a vector by overlaying `values` onto zero.
pub fn vector_from_slice(values: &[Real]) -> CoreResult<PhaseVector> {
    if values.len() > PHASE_DIM {
        return Err(CoreError::TooLarge {
            what: "phase vector",
            got: values.len(),
            max: PHASE_DIM,
        });
    }
    let mut out = PhaseVector::zeros();
    for (i, v) in values.iter().enumerate() {
        out[i] = *v;
    }
    Ok(out)
}

/// Row-major copy of a matrix.
pub fn matrix_to_row_major(m: &TransferMatrix) -> Vec<Real> {
    let mut out = Vec::with_capacity(MATRIX_LEN);
    for r in 0..PHASE_DIM {
        for c in 0..PHASE_DIM {
            out.push(m[(r, c)]);
        }
    }
    out
}

pub fn matrix_nulp_eq(a: &TransferMatrix, b: &TransferMatrix, nulp: Real) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| nulp_eq(*x, *y, nulp))
}

/// Render as `[6,6]((r0...),(r1...),...)`.
pub fn format_matrix(m: &TransferMatrix) -> String {
    let rows: Vec<String> = (0..PHASE_DIM)
        .map(|r| {
            let cols: Vec<String> = (0..PHASE_DIM).map(|c| format!("{}", m[(r, c)])).collect();
            format!("({})", cols.join(","))
        })
        .collect();
    format!("[{},{}]({})", PHASE_DIM, PHASE_DIM, rows.join(","))
}

/// Render as `[6](v0,v1,...)`.
pub fn format_vector(v: &PhaseVector) -> String {
    let cols: Vec<String> = v.iter().map(|x| format!("{}", x)).collect();
    format!("[{}]({})", PHASE_DIM, cols.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_renders_nested_rows() {
        let s = format_matrix(&identity());
        assert_eq!(
            s,
            "[6,6]((1,0,0,0,0,0),(0,1,0,0,0,0),(0,0,1,0,0,0),(0,0,0,1,0,0),(0,0,0,0,1,0),(0,0,0,0,0,1))"
        );
    }

    #[test]
    fn row_major_overlay() {
        let m = matrix_from_row_major(&[2.0, 3.0]).unwrap();
        assert_eq!(m[(0, 0)], 2.0);
        assert_eq!(m[(0, 1)], 3.0);
        assert_eq!(m[(1, 1)], 1.0);

        let full: Vec<Real> = (0..36).map(|i| i as Real).collect();
        let m = matrix_from_row_major(&full).unwrap();
        assert_eq!(m[(1, 0)], 6.0);
        assert_eq!(matrix_to_row_major(&m), full);
    }

    #[test]
    fn oversized_inputs_rejected() {
        assert!(matrix_from_row_major(&[0.0; 37]).is_err());
        assert!(vector_from_slice(&[0.0; 7]).is_err());
    }

    #[test]
    fn vector_overlay_and_format() {
        let v = vector_from_slice(&[1.0, 0.5]).unwrap();
        assert_eq!(format_vector(&v), "[6](1,0.5,0,0,0,0)");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn identity_is_neutral(vals in prop::collection::vec(-1e3_f64..1e3_f64, 36)) {
            let m = matrix_from_row_major(&vals).unwrap();
            prop_assert!(matrix_nulp_eq(&(identity() * m), &m, 0.0));
            prop_assert!(matrix_nulp_eq(&(m * identity()), &m, 0.0));
        }
    }
}
