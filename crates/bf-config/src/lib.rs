//! bf-config: machine configuration loading and printing.
//!
//! A machine is described either in GLPS text or in a structured
//! YAML/JSON document. Both forms load into the same flat
//! [`MachineConfig`]: a simulation mode plus the expanded element list.

pub mod error;
pub mod glps;
pub mod model;
pub mod schema;

use std::path::Path;

use bf_lattice::Params;

pub use error::{ConfigError, ConfigResult, Pos};
pub use glps::{parse_glps, to_glps};
pub use model::{ElementConfig, MachineConfig, SIM_TYPE_KEY, SimType};
pub use schema::{ElementDef, MachineDef, ParamDef};

pub fn load_glps(source: &str) -> ConfigResult<MachineConfig> {
    parse_glps(source, &Params::new())
}

/// Load GLPS with caller-supplied variables visible to every statement.
pub fn load_glps_with(source: &str, extra: &Params) -> ConfigResult<MachineConfig> {
    parse_glps(source, extra)
}

pub fn load_yaml_str(content: &str) -> ConfigResult<MachineConfig> {
    let def: MachineDef = serde_yaml::from_str(content)?;
    def.into_config()
}

pub fn load_json_str(content: &str) -> ConfigResult<MachineConfig> {
    let def: MachineDef = serde_json::from_str(content)?;
    def.into_config()
}

pub fn load_yaml(path: &Path) -> ConfigResult<MachineConfig> {
    let content = std::fs::read_to_string(path)?;
    load_yaml_str(&content)
}

pub fn load_json(path: &Path) -> ConfigResult<MachineConfig> {
    let content = std::fs::read_to_string(path)?;
    load_json_str(&content)
}

/// Load by file extension: `.yaml`/`.yml`, `.json`, anything else is GLPS.
///
/// `extra` only applies to GLPS files.
pub fn load_path(path: &Path, extra: &Params) -> ConfigResult<MachineConfig> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("yaml") | Some("yml") => load_yaml(path),
        Some("json") => load_json(path),
        _ => {
            let content = std::fs::read_to_string(path)?;
            load_glps_with(&content, extra)
        }
    }
}

pub fn save_yaml(path: &Path, config: &MachineConfig) -> ConfigResult<()> {
    let content = serde_yaml::to_string(&MachineDef::from_config(config))?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn save_json(path: &Path, config: &MachineConfig) -> ConfigResult<()> {
    let content = serde_json::to_string_pretty(&MachineDef::from_config(config))?;
    std::fs::write(path, content)?;
    Ok(())
}
