//! Levenberg-Marquardt least squares with a finite difference Jacobian.

use crate::error::{FitError, FitResult};
use crate::jacobian::{central_difference_jacobian, finite_difference_jacobian};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// How the Jacobian is approximated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Differencing {
    /// One extra evaluation per parameter
    #[default]
    Forward,
    /// Two extra evaluations per parameter, second-order accurate
    Central,
}

/// Levenberg-Marquardt configuration.
#[derive(Clone, Debug)]
pub struct LmConfig {
    /// Maximum accepted steps
    pub max_iterations: usize,
    /// Stop when an accepted step reduces the cost by less than this fraction
    pub ftol: f64,
    /// Stop when the step is this small relative to the parameters
    pub xtol: f64,
    /// Stop when the largest gradient component is at most this
    pub gtol: f64,
    /// Initial damping
    pub initial_lambda: f64,
    /// Damping multiplier after a rejected step
    pub lambda_up: f64,
    /// Damping multiplier after an accepted step
    pub lambda_down: f64,
    /// Relative finite difference step
    pub epsilon: f64,
    pub differencing: Differencing,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 0.0,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            epsilon: 1e-8,
            differencing: Differencing::Forward,
        }
    }
}

/// Outcome of a least squares run.
#[derive(Clone, Debug)]
pub struct LmResult {
    /// Best parameters found
    pub x: DVector<f64>,
    /// Residual at `x`
    pub residual: DVector<f64>,
    /// Sum of squared residuals at `x`
    pub cost: f64,
    /// Accepted steps taken
    pub iterations: usize,
    /// Residual evaluations, Jacobian columns included
    pub evaluations: usize,
}

const MAX_LAMBDA: f64 = 1e32;

/// Minimize `|residual_fn(x)|²` starting from `x0`.
pub fn levenberg_marquardt<F>(
    x0: DVector<f64>,
    mut residual_fn: F,
    config: &LmConfig,
) -> FitResult<LmResult>
where
    F: FnMut(&DVector<f64>) -> FitResult<DVector<f64>>,
{
    let mut evaluations = 0;
    let mut eval = |x: &DVector<f64>| -> FitResult<DVector<f64>> {
        evaluations += 1;
        let r = residual_fn(x)?;
        if r.iter().any(|v| !v.is_finite()) {
            return Err(FitError::Numeric {
                what: format!("non-finite residual at {:?}", x.as_slice()),
            });
        }
        Ok(r)
    };

    let mut x = x0;
    let mut r = eval(&x)?;
    if r.len() < x.len() {
        return Err(FitError::ProblemSetup {
            what: format!(
                "{} residuals cannot determine {} parameters",
                r.len(),
                x.len()
            ),
        });
    }
    let mut cost = r.norm_squared();
    let mut lambda = config.initial_lambda;

    for iter in 0..config.max_iterations {
        debug!(iter, cost, lambda, x = ?x.as_slice(), "lm iteration");

        if cost == 0.0 {
            return Ok(finish(x, r, cost, iter, evaluations));
        }

        let jac = match config.differencing {
            Differencing::Forward => finite_difference_jacobian(&x, &r, &mut eval, config.epsilon)?,
            Differencing::Central => central_difference_jacobian(&x, &mut eval, config.epsilon)?,
        };
        let jt = jac.transpose();
        let g = &jt * &r;
        if g.amax() <= config.gtol {
            return Ok(finish(x, r, cost, iter, evaluations));
        }
        let a = &jt * &jac;

        loop {
            let dx = damped_step(&a, &g, lambda)?;
            if dx.norm() <= config.xtol * (x.norm() + config.xtol) {
                return Ok(finish(x, r, cost, iter, evaluations));
            }

            let x_new = &x + &dx;
            let r_new = eval(&x_new)?;
            let cost_new = r_new.norm_squared();

            if cost_new < cost {
                let reduction = cost - cost_new;
                x = x_new;
                r = r_new;
                cost = cost_new;
                lambda *= config.lambda_down;
                if reduction <= config.ftol * (cost + reduction) {
                    return Ok(finish(x, r, cost, iter + 1, evaluations));
                }
                break;
            }

            lambda *= config.lambda_up;
            if lambda > MAX_LAMBDA {
                return Err(FitError::ConvergenceFailed {
                    what: format!("damping diverged at iteration {}, cost = {}", iter, cost),
                });
            }
        }
    }

    Err(FitError::ConvergenceFailed {
        what: format!(
            "Maximum iterations {} reached, cost = {}",
            config.max_iterations, cost
        ),
    })
}

/// Solve `(JᵀJ + λ diag(JᵀJ)) dx = -Jᵀr`.
fn damped_step(a: &DMatrix<f64>, g: &DVector<f64>, lambda: f64) -> FitResult<DVector<f64>> {
    let mut damped = a.clone();
    for i in 0..damped.nrows() {
        let d = a[(i, i)];
        damped[(i, i)] += lambda * if d > 0.0 { d } else { 1.0 };
    }
    let rhs = -g;
    match damped.clone().cholesky() {
        Some(chol) => Ok(chol.solve(&rhs)),
        None => damped.lu().solve(&rhs).ok_or_else(|| FitError::Numeric {
            what: "damped normal equations are singular".to_string(),
        }),
    }
}

fn finish(
    x: DVector<f64>,
    residual: DVector<f64>,
    cost: f64,
    iterations: usize,
    evaluations: usize,
) -> LmResult {
    debug!(iterations, evaluations, cost, "lm finished");
    LmResult {
        x,
        residual,
        cost,
        iterations,
        evaluations,
    }
}
