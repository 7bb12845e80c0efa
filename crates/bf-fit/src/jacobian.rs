//! Finite difference Jacobian computation.

use crate::error::FitResult;
use nalgebra::{DMatrix, DVector};

/// Forward differences: column j is `(f(x + dx e_j) - f(x)) / dx`.
///
/// `f_x` is `f(x)`, already known to the caller.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    mut f: F,
    epsilon: f64,
) -> FitResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> FitResult<DVector<f64>>,
{
    let mut jac = DMatrix::zeros(f_x.len(), x.len());

    for j in 0..x.len() {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;

        let df = (f(&x_perturbed)? - f_x) / dx;
        jac.set_column(j, &df);
    }

    Ok(jac)
}

/// Central differences; twice the evaluations, second-order accurate.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    mut f: F,
    epsilon: f64,
) -> FitResult<DMatrix<f64>>
where
    F: FnMut(&DVector<f64>) -> FitResult<DVector<f64>>,
{
    let mut jac: Option<DMatrix<f64>> = None;

    for j in 0..x.len() {
        let dx = epsilon * x[j].abs().max(1.0);

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;

        let df = (f_plus - f_minus) / (2.0 * dx);
        jac.get_or_insert_with(|| DMatrix::zeros(df.len(), x.len()))
            .set_column(j, &df);
    }

    Ok(jac.unwrap_or_else(|| DMatrix::zeros(0, x.len())))
}
