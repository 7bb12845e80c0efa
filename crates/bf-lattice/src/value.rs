//! Element parameter values.

use std::collections::BTreeMap;
use std::fmt;

use bf_core::{PhaseVector, Real, TransferMatrix, matrix_to_row_major};

/// A single named parameter: scalar, string, or flat array.
///
/// Matrices travel as row-major arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(Real),
    Text(String),
    Array(Vec<Real>),
}

/// Parameters of one element, ordered by name.
pub type Params = BTreeMap<String, Value>;

impl Value {
    pub fn as_number(&self) -> Option<Real> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Real]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Array(_) => "array",
        }
    }
}

impl From<Real> for Value {
    fn from(v: Real) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Real>> for Value {
    fn from(v: Vec<Real>) -> Self {
        Value::Array(v)
    }
}

impl From<&TransferMatrix> for Value {
    fn from(m: &TransferMatrix) -> Self {
        Value::Array(matrix_to_row_major(m))
    }
}

impl From<&PhaseVector> for Value {
    fn from(v: &PhaseVector) -> Self {
        Value::Array(v.iter().copied().collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Build a parameter map from `(name, value)` pairs.
pub fn params<K, V, I>(pairs: I) -> Params
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
