//! Lattice elements: a kind, named parameters, and the derived transfer matrix.

use bf_core::{CoreError, MATRIX_LEN, Real, TransferMatrix, identity, matrix_from_row_major};
use tracing::debug;

use crate::error::{LatticeError, LatticeResult};
use crate::kind::ElementKind;
use crate::optics;
use crate::payload::{Payload, PayloadShape};
use crate::value::{Params, Value};

/// One lattice element.
///
/// The transfer matrix is cached and re-derived whenever parameters change,
/// so propagation never evaluates the optics formulas.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    name: String,
    kind: ElementKind,
    params: Params,
    transfer: TransferMatrix,
}

impl ElementSpec {
    pub fn new(name: impl Into<String>, kind: ElementKind, params: Params) -> LatticeResult<Self> {
        let name = name.into();
        let transfer = derive(&name, kind, &params)?;
        Ok(Self {
            name,
            kind,
            params,
            transfer,
        })
    }

    /// Build from the type name used in configurations.
    pub fn from_type_name(
        name: impl Into<String>,
        type_name: &str,
        params: Params,
    ) -> LatticeResult<Self> {
        let name = name.into();
        let kind = ElementKind::from_name(type_name).ok_or_else(|| LatticeError::UnknownKind {
            element: name.clone(),
            kind: type_name.to_string(),
        })?;
        Self::new(name, kind, params)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Cached transfer matrix (identity for `source`).
    pub fn transfer(&self) -> &TransferMatrix {
        &self.transfer
    }

    /// Recompute the transfer matrix from the current parameters.
    pub fn derive_transfer(&self) -> LatticeResult<TransferMatrix> {
        derive(&self.name, self.kind, &self.params)
    }

    /// The payload a `source` element injects for the given shape.
    ///
    /// `initial` is overlaid onto the shape's default; when absent the default
    /// itself is injected.
    pub fn initial_payload(&self, shape: PayloadShape) -> LatticeResult<Payload> {
        let values = array_param(&self.name, &self.params, "initial")?.unwrap_or(&[]);
        Payload::from_values(shape, values).map_err(|e| self.size_error("initial", e))
    }

    /// Check that this element can act on payloads of `shape`.
    pub fn check_shape(&self, shape: PayloadShape) -> LatticeResult<()> {
        if self.kind.overrides_payload() {
            self.initial_payload(shape)?;
        }
        Ok(())
    }

    /// Push `payload` through this element.
    pub fn apply(&self, payload: &mut Payload) -> LatticeResult<()> {
        if self.kind.overrides_payload() {
            *payload = self.initial_payload(payload.shape())?;
        } else {
            payload.compose(&self.transfer);
        }
        Ok(())
    }

    /// A copy with `changes` merged over the current parameters.
    ///
    /// Keys not mentioned keep their values. Fails without touching `self`.
    pub fn reconfigured(&self, changes: Params) -> LatticeResult<Self> {
        let mut params = self.params.clone();
        params.extend(changes);
        Self::new(self.name.clone(), self.kind, params)
    }

    /// Merge `changes` in place; on error the element is left as it was.
    pub fn reconfigure(&mut self, changes: Params) -> LatticeResult<()> {
        let updated = self.reconfigured(changes)?;
        debug!(element = %self.name, kind = %self.kind, "reconfigured element");
        *self = updated;
        Ok(())
    }

    fn size_error(&self, param: &str, err: CoreError) -> LatticeError {
        match err {
            CoreError::TooLarge { got, max, .. } => LatticeError::TooLarge {
                element: self.name.clone(),
                param: param.to_string(),
                got,
                max,
            },
            other => LatticeError::Core(other),
        }
    }
}

fn derive(name: &str, kind: ElementKind, params: &Params) -> LatticeResult<TransferMatrix> {
    let domain = |e: CoreError| LatticeError::NumericDomain {
        element: name.to_string(),
        what: e.to_string(),
    };

    match kind {
        ElementKind::Source => {
            if let Some(initial) = array_param(name, params, "initial")? {
                ensure_fits(name, "initial", initial.len(), MATRIX_LEN)?;
            }
            Ok(identity())
        }
        ElementKind::Marker | ElementKind::Stripper | ElementKind::EDipole => Ok(identity()),
        ElementKind::Drift => {
            let l = number_or(name, params, "L", 0.0)?;
            Ok(optics::drift(l))
        }
        ElementKind::RfCavity => {
            let l = required_number(name, params, "L")?;
            Ok(optics::drift(l))
        }
        ElementKind::SBend => {
            let l = required_number(name, params, "L")?;
            let phi = required_number(name, params, "phi")?;
            let k = number_or(name, params, "K", 0.0)?;
            optics::sbend(l, phi, k).map_err(domain)
        }
        ElementKind::Quadrupole => {
            let l = required_number(name, params, "L")?;
            let k = number_or(name, params, "K", 0.0)?;
            optics::quadrupole(l, k).map_err(domain)
        }
        ElementKind::Solenoid => {
            let l = required_number(name, params, "L")?;
            let k = number_or(name, params, "K", 0.0)?;
            optics::solenoid(l, k).map_err(domain)
        }
        ElementKind::Generic => {
            let values = array_param(name, params, "transfer")?.ok_or_else(|| {
                LatticeError::MissingParam {
                    element: name.to_string(),
                    param: "transfer".to_string(),
                }
            })?;
            ensure_fits(name, "transfer", values.len(), MATRIX_LEN)?;
            if let Some(bad) = bf_core::first_non_finite(values) {
                return Err(LatticeError::NumericDomain {
                    element: name.to_string(),
                    what: format!("non-finite transfer entry {}", bad),
                });
            }
            Ok(matrix_from_row_major(values)?)
        }
    }
}

fn ensure_fits(name: &str, param: &str, got: usize, max: usize) -> LatticeResult<()> {
    if got > max {
        return Err(LatticeError::TooLarge {
            element: name.to_string(),
            param: param.to_string(),
            got,
            max,
        });
    }
    Ok(())
}

fn number_param(name: &str, params: &Params, key: &str) -> LatticeResult<Option<Real>> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::Number(v)) if v.is_finite() => Ok(Some(*v)),
        Some(Value::Number(v)) => Err(LatticeError::NumericDomain {
            element: name.to_string(),
            what: format!("parameter '{}' is not finite ({})", key, v),
        }),
        Some(other) => Err(LatticeError::InvalidParam {
            element: name.to_string(),
            param: key.to_string(),
            expected: "a number",
            got: other.type_name(),
        }),
    }
}

fn required_number(name: &str, params: &Params, key: &str) -> LatticeResult<Real> {
    number_param(name, params, key)?.ok_or_else(|| LatticeError::MissingParam {
        element: name.to_string(),
        param: key.to_string(),
    })
}

fn number_or(name: &str, params: &Params, key: &str, default: Real) -> LatticeResult<Real> {
    Ok(number_param(name, params, key)?.unwrap_or(default))
}

fn array_param<'a>(name: &str, params: &'a Params, key: &str) -> LatticeResult<Option<&'a [Real]>> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::Array(a)) => Ok(Some(a)),
        Some(other) => Err(LatticeError::InvalidParam {
            element: name.to_string(),
            param: key.to_string(),
            expected: "an array",
            got: other.type_name(),
        }),
    }
}
