//! Fitting element parameters so a propagated state hits a target.

use bf_lattice::{Params, Value};
use bf_sim::{Machine, StateOptions};
use nalgebra::DVector;

use crate::error::{FitError, FitResult};
use crate::lm::{LmConfig, LmResult, levenberg_marquardt};

/// Adjust numeric parameters of one element.
///
/// Every residual evaluation allocates a fresh state seeded with `initial`,
/// reconfigures the element, propagates the whole machine, and returns the
/// payload minus `target`.
pub struct ElementFit<'m> {
    machine: &'m mut Machine,
    element: usize,
    params: Vec<String>,
    /// Held-fixed parameters merged alongside the fitted ones
    fixed: Params,
    initial: Vec<f64>,
    target: Vec<f64>,
}

impl<'m> ElementFit<'m> {
    pub fn new(
        machine: &'m mut Machine,
        element: usize,
        params: Vec<String>,
        initial: Vec<f64>,
        target: Vec<f64>,
    ) -> FitResult<Self> {
        machine.element(element)?;
        if params.is_empty() {
            return Err(FitError::ProblemSetup {
                what: "no parameters to fit".to_string(),
            });
        }
        let entries = machine.shape().entry_count();
        if initial.len() > entries {
            return Err(FitError::ProblemSetup {
                what: format!("initial state has {} values, at most {}", initial.len(), entries),
            });
        }
        if target.len() != entries {
            return Err(FitError::ProblemSetup {
                what: format!("target has {} values, expected {}", target.len(), entries),
            });
        }
        Ok(Self {
            machine,
            element,
            params,
            fixed: Params::new(),
            initial,
            target,
        })
    }

    /// Parameters re-applied on every evaluation next to the fitted ones.
    pub fn with_fixed(mut self, fixed: Params) -> Self {
        self.fixed = fixed;
        self
    }

    /// Payload minus target with the fitted parameters set to `p`.
    pub fn residual(&mut self, p: &DVector<f64>) -> FitResult<DVector<f64>> {
        if p.len() != self.params.len() {
            return Err(FitError::ProblemSetup {
                what: format!("expected {} parameters, got {}", self.params.len(), p.len()),
            });
        }
        let mut changes = self.fixed.clone();
        for (name, value) in self.params.iter().zip(p.iter()) {
            changes.insert(name.clone(), Value::Number(*value));
        }

        let state = self.machine.alloc_state_with(StateOptions {
            initial: Some(self.initial.clone()),
            next_elem: 0,
        })?;
        self.machine.reconfigure(self.element, changes)?;
        self.machine.propagate(&state, None)?;

        let payload = state.to_vec();
        Ok(DVector::from_iterator(
            payload.len(),
            payload.iter().zip(&self.target).map(|(v, t)| v - t),
        ))
    }

    /// Run the fit from `p0`.
    ///
    /// On success the machine is left configured with the result; on failure
    /// the element is put back exactly as it was before the fit.
    pub fn solve(&mut self, p0: &[f64], config: &LmConfig) -> FitResult<LmResult> {
        let original = self.machine.element(self.element)?.clone();
        let outcome = levenberg_marquardt(
            DVector::from_column_slice(p0),
            |p| self.residual(p),
            config,
        )
        .and_then(|result| self.residual(&result.x).map(|_| result));

        if outcome.is_err() {
            self.machine.set_element(self.element, original)?;
        }
        outcome
    }
}
