//! Structured configuration schema (YAML / JSON).
//!
//! ```yaml
//! sim_type: Vector
//! elements:
//!   - name: elem0
//!     type: drift
//!     L: 1.0e-3
//! ```

use std::collections::BTreeMap;

use bf_lattice::{Params, Value};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ElementConfig, MachineConfig, SimType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_type: Option<String>,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(flatten)]
    pub params: BTreeMap<String, ParamDef>,
}

/// Parameter value; matrices may be written as nested rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamDef {
    Number(f64),
    Text(String),
    Array(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

impl From<ParamDef> for Value {
    fn from(p: ParamDef) -> Self {
        match p {
            ParamDef::Number(v) => Value::Number(v),
            ParamDef::Text(s) => Value::Text(s),
            ParamDef::Array(a) => Value::Array(a),
            ParamDef::Rows(rows) => Value::Array(rows.into_iter().flatten().collect()),
        }
    }
}

impl From<&Value> for ParamDef {
    fn from(v: &Value) -> Self {
        match v {
            Value::Number(n) => ParamDef::Number(*n),
            Value::Text(s) => ParamDef::Text(s.clone()),
            Value::Array(a) => ParamDef::Array(a.clone()),
        }
    }
}

impl MachineDef {
    /// Validate and flatten into a [`MachineConfig`].
    pub fn into_config(self) -> ConfigResult<MachineConfig> {
        let sim_type = SimType::parse(&self.sim_type.ok_or(ConfigError::MissingSimType)?)?;
        let elements = self
            .elements
            .into_iter()
            .map(ElementDef::into_config)
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(MachineConfig::new(sim_type, elements))
    }

    pub fn from_config(config: &MachineConfig) -> Self {
        Self {
            sim_type: Some(config.sim_type.as_str().to_string()),
            elements: config.elements.iter().map(ElementDef::from_config).collect(),
        }
    }
}

impl ElementDef {
    pub fn into_config(self) -> ConfigResult<ElementConfig> {
        let params: Params = self
            .params
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect();
        ElementConfig::new(self.name, &self.type_name, params)
    }

    pub fn from_config(element: &ElementConfig) -> Self {
        Self {
            name: element.name.clone(),
            type_name: element.kind.as_str().to_string(),
            params: element
                .params
                .iter()
                .map(|(k, v)| (k.clone(), ParamDef::from(v)))
                .collect(),
        }
    }
}
