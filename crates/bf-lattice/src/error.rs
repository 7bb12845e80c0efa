//! Error types for element and lattice operations.

use bf_core::CoreError;
use thiserror::Error;

/// Errors raised while building, deriving, or reconfiguring elements.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatticeError {
    #[error("Element '{element}': unknown element type '{kind}'")]
    UnknownKind { element: String, kind: String },

    #[error("Element '{element}': missing required parameter '{param}'")]
    MissingParam { element: String, param: String },

    #[error("Element '{element}': parameter '{param}' must be {expected}, got {got}")]
    InvalidParam {
        element: String,
        param: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("Element '{element}': numeric domain error: {what}")]
    NumericDomain { element: String, what: String },

    #[error("Element '{element}': parameter '{param}' has {got} values, at most {max} allowed")]
    TooLarge {
        element: String,
        param: String,
        got: usize,
        max: usize,
    },

    #[error("Element index {index} out of range (lattice has {len} elements)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type LatticeResult<T> = Result<T, LatticeError>;
