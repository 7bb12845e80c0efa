//! Sequential evaluation of parsed GLPS into a [`MachineConfig`].
//!
//! Statements run top to bottom against one global scope. An element
//! definition captures the variables assigned before it; later
//! assignments do not reach back into elements already defined.

use std::collections::{BTreeMap, HashSet};

use bf_lattice::{Params, Value};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult, Pos};
use crate::glps::ast::{Expr, LineItem, Stmt};
use crate::model::{ElementConfig, MachineConfig, SIM_TYPE_KEY, SimType};

/// Upper bound on the number of elements one LINE may expand to.
pub const MAX_LINE_ELEMENTS: usize = 1_000_000;

struct LineDef {
    items: Vec<LineItem>,
}

#[derive(Default)]
struct Evaluator {
    scope: Params,
    elements: BTreeMap<String, ElementConfig>,
    lines: BTreeMap<String, LineDef>,
    last_line: Option<String>,
    selected: Option<(String, Pos)>,
}

/// Evaluate `stmts` with `extra` pre-seeding the global scope.
pub fn evaluate(stmts: Vec<Stmt>, extra: &Params) -> ConfigResult<MachineConfig> {
    let mut ev = Evaluator {
        scope: extra.clone(),
        ..Evaluator::default()
    };
    for stmt in stmts {
        ev.statement(stmt)?;
    }
    ev.finish()
}

impl Evaluator {
    fn statement(&mut self, stmt: Stmt) -> ConfigResult<()> {
        match stmt {
            Stmt::Assign { name, value, pos } => {
                let value = self.resolve(value, pos)?;
                self.scope.insert(name, value);
            }
            Stmt::Element {
                name,
                kind,
                props,
                pos,
            } => {
                self.ensure_new(&name, pos)?;
                let mut params: Params = self
                    .scope
                    .iter()
                    .filter(|(k, _)| k.as_str() != SIM_TYPE_KEY)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                for (key, expr) in props {
                    let value = self.resolve(expr, pos)?;
                    params.insert(key, value);
                }
                let element = ElementConfig::new(name.clone(), &kind, params)?;
                self.elements.insert(name, element);
            }
            Stmt::Line { name, items, pos } => {
                self.ensure_new(&name, pos)?;
                self.last_line = Some(name.clone());
                self.lines.insert(name, LineDef { items });
            }
            Stmt::Use { name, pos } => {
                self.selected = Some((name, pos));
            }
        }
        Ok(())
    }

    fn resolve(&self, expr: Expr, pos: Pos) -> ConfigResult<Value> {
        Ok(match expr {
            Expr::Number(v) => Value::Number(v),
            Expr::Text(s) => Value::Text(s),
            Expr::Array(a) => Value::Array(a),
            Expr::Var(name) => match self.scope.get(&name) {
                Some(v) => v.clone(),
                None => {
                    return Err(ConfigError::UndefinedReference {
                        pos,
                        name,
                        what: "variable",
                    });
                }
            },
        })
    }

    fn ensure_new(&self, name: &str, pos: Pos) -> ConfigResult<()> {
        if self.elements.contains_key(name) || self.lines.contains_key(name) {
            return Err(ConfigError::Duplicate {
                pos,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn finish(self) -> ConfigResult<MachineConfig> {
        let sim_type = match self.scope.get(SIM_TYPE_KEY) {
            Some(Value::Text(s)) => SimType::parse(s)?,
            Some(other) => {
                return Err(ConfigError::InvalidSimType {
                    value: other.to_string(),
                });
            }
            None => return Err(ConfigError::MissingSimType),
        };

        let line = match &self.selected {
            Some((name, pos)) => {
                if !self.lines.contains_key(name) {
                    return Err(ConfigError::UndefinedReference {
                        pos: *pos,
                        name: name.clone(),
                        what: "LINE",
                    });
                }
                name.clone()
            }
            None => self.last_line.clone().ok_or(ConfigError::NoLine)?,
        };

        let mut elements = Vec::new();
        let mut active = HashSet::new();
        self.expand(&line, &mut active, &mut elements)?;
        debug!(line = %line, sim_type = %sim_type, elements = elements.len(), "GLPS evaluated");
        Ok(MachineConfig::new(sim_type, elements))
    }

    /// Append `line`, fully expanded, to `out`.
    fn expand(
        &self,
        line: &str,
        active: &mut HashSet<String>,
        out: &mut Vec<ElementConfig>,
    ) -> ConfigResult<()> {
        let Some(def) = self.lines.get(line) else {
            return Ok(());
        };
        active.insert(line.to_string());
        for item in &def.items {
            if let Some(element) = self.elements.get(&item.name) {
                let total = out.len().saturating_add(item.count);
                if total > MAX_LINE_ELEMENTS {
                    return Err(ConfigError::LineTooLong {
                        name: line.to_string(),
                        limit: MAX_LINE_ELEMENTS,
                    });
                }
                out.extend(std::iter::repeat_n(element, item.count).cloned());
            } else if self.lines.contains_key(&item.name) {
                if active.contains(&item.name) {
                    return Err(ConfigError::RecursiveLine {
                        name: item.name.clone(),
                    });
                }
                for _ in 0..item.count {
                    let before = out.len();
                    self.expand(&item.name, active, out)?;
                    // an empty line stays empty however often it repeats
                    if out.len() == before {
                        break;
                    }
                }
            } else {
                return Err(ConfigError::UndefinedReference {
                    pos: item.pos,
                    name: item.name.clone(),
                    what: "element or LINE",
                });
            }
        }
        active.remove(line);
        Ok(())
    }
}
