//! Flat machine description shared by both configuration forms.

use std::fmt;

use bf_lattice::{ElementKind, ElementSpec, Lattice, Params};

use crate::error::{ConfigError, ConfigResult};

/// Name of the variable selecting the simulation mode.
pub const SIM_TYPE_KEY: &str = "sim_type";

/// Simulation mode, fixed for a machine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimType {
    /// Propagate a single phase-space vector.
    Vector,
    /// Accumulate the cumulative transfer matrix.
    TransferMatrix,
}

impl SimType {
    pub fn as_str(self) -> &'static str {
        match self {
            SimType::Vector => "Vector",
            SimType::TransferMatrix => "TransferMatrix",
        }
    }

    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value {
            "Vector" => Ok(SimType::Vector),
            "TransferMatrix" => Ok(SimType::TransferMatrix),
            other => Err(ConfigError::InvalidSimType {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element as configured, before its transfer matrix is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementConfig {
    pub name: String,
    pub kind: ElementKind,
    pub params: Params,
}

impl ElementConfig {
    /// Resolve `type_name`, failing with a configuration error when unknown.
    pub fn new(name: impl Into<String>, type_name: &str, params: Params) -> ConfigResult<Self> {
        let name = name.into();
        let kind = ElementKind::from_name(type_name).ok_or_else(|| ConfigError::UnknownKind {
            element: name.clone(),
            kind: type_name.to_string(),
        })?;
        Ok(Self { name, kind, params })
    }

    pub fn build(&self) -> ConfigResult<ElementSpec> {
        Ok(ElementSpec::new(
            self.name.clone(),
            self.kind,
            self.params.clone(),
        )?)
    }
}

/// Simulation mode plus the expanded, ordered element list.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineConfig {
    pub sim_type: SimType,
    pub elements: Vec<ElementConfig>,
}

impl MachineConfig {
    pub fn new(sim_type: SimType, elements: Vec<ElementConfig>) -> Self {
        Self { sim_type, elements }
    }

    /// Derive every element; fails on the first element that cannot be built.
    pub fn build_lattice(&self) -> ConfigResult<Lattice> {
        self.elements.iter().map(ElementConfig::build).collect()
    }
}
