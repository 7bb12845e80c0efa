//! Configuration errors.

use bf_lattice::LatticeError;

/// Position of a token in GLPS source (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Syntax error at {pos}: {message}")]
    Syntax { pos: Pos, message: String },

    #[error("Undefined {what} '{name}' at {pos}")]
    UndefinedReference {
        pos: Pos,
        name: String,
        what: &'static str,
    },

    #[error("Duplicate definition of '{name}' at {pos}")]
    Duplicate { pos: Pos, name: String },

    #[error("LINE '{name}' refers to itself")]
    RecursiveLine { name: String },

    #[error("LINE '{name}' expands to more than {limit} elements")]
    LineTooLong { name: String, limit: usize },

    #[error("Missing 'sim_type'")]
    MissingSimType,

    #[error("Invalid sim_type '{value}' (expected \"Vector\" or \"TransferMatrix\")")]
    InvalidSimType { value: String },

    #[error("No LINE defined")]
    NoLine,

    #[error("Element '{element}': unknown element type '{kind}'")]
    UnknownKind { element: String, kind: String },

    #[error("'{name}' cannot be written as a GLPS identifier")]
    InvalidName { name: String },

    #[error("Element '{name}' is defined more than once with different settings")]
    ConflictingElement { name: String },

    #[error("Parameter '{param}' of '{element}' cannot be written as GLPS: {reason}")]
    Unprintable {
        element: String,
        param: String,
        reason: &'static str,
    },

    #[error("Lattice error: {0}")]
    Lattice(#[from] LatticeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
