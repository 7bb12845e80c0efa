//! Render a [`MachineConfig`] as GLPS text.
//!
//! The output assigns `sim_type`, defines every distinct element once with
//! all of its parameters spelled out, and ends with a single LINE listing the
//! elements in order. Consecutive repeats are folded into `name*n`.

use std::collections::BTreeMap;
use std::fmt::Write;

use bf_lattice::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ElementConfig, MachineConfig, SIM_TYPE_KEY};

const DEFAULT_LINE: &str = "default";
const RESERVED: &[&str] = &["USE"];

/// Render `config` as GLPS source.
pub fn to_glps(config: &MachineConfig) -> ConfigResult<String> {
    let mut out = String::new();
    let _ = writeln!(out, "{} = \"{}\";", SIM_TYPE_KEY, config.sim_type);
    out.push('\n');

    let mut defined: BTreeMap<&str, &ElementConfig> = BTreeMap::new();
    for element in &config.elements {
        match defined.get(element.name.as_str()) {
            Some(prev) if *prev == element => continue,
            Some(_) => {
                return Err(ConfigError::ConflictingElement {
                    name: element.name.clone(),
                });
            }
            None => {}
        }
        check_name(&element.name)?;
        out.push_str(&element_definition(element)?);
        out.push('\n');
        defined.insert(element.name.as_str(), element);
    }

    let mut line_name = DEFAULT_LINE.to_string();
    while defined.contains_key(line_name.as_str()) {
        line_name.push('_');
    }

    let items: Vec<String> = runs(&config.elements)
        .into_iter()
        .map(|(name, count)| match count {
            1 => name.to_string(),
            n => format!("{}*{}", name, n),
        })
        .collect();
    if !config.elements.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{}: LINE = ({});", line_name, items.join(", "));
    Ok(out)
}

fn element_definition(element: &ElementConfig) -> ConfigResult<String> {
    let mut def = format!("{}: {}", element.name, element.kind);
    for (key, value) in &element.params {
        if !is_identifier(key) {
            return Err(ConfigError::InvalidName { name: key.clone() });
        }
        let text = format_value(value).map_err(|reason| ConfigError::Unprintable {
            element: element.name.clone(),
            param: key.clone(),
            reason,
        })?;
        let _ = write!(def, ", {} = {}", key, text);
    }
    def.push(';');
    Ok(def)
}

fn runs(elements: &[ElementConfig]) -> Vec<(&str, usize)> {
    let mut runs: Vec<(&str, usize)> = Vec::new();
    for element in elements {
        match runs.last_mut() {
            Some((name, count)) if *name == element.name => *count += 1,
            _ => runs.push((element.name.as_str(), 1)),
        }
    }
    runs
}

fn check_name(name: &str) -> ConfigResult<()> {
    if is_identifier(name) && !RESERVED.contains(&name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn format_value(value: &Value) -> Result<String, &'static str> {
    match value {
        Value::Number(v) => format_number(*v),
        Value::Text(s) => {
            if s.contains('"') || s.contains('\n') {
                Err("string contains a quote or newline")
            } else {
                Ok(format!("\"{}\"", s))
            }
        }
        Value::Array(a) => {
            let items = a
                .iter()
                .map(|v| format_number(*v))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("[{}]", items.join(", ")))
        }
    }
}

/// Shortest text that reads back to the same `f64`.
fn format_number(v: f64) -> Result<String, &'static str> {
    if !v.is_finite() {
        return Err("number is not finite");
    }
    let mag = v.abs();
    if v == 0.0 || (1e-4..1e15).contains(&mag) {
        Ok(format!("{}", v))
    } else {
        Ok(format!("{:e}", v))
    }
}
