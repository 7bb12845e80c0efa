//! GLPS: the textual lattice language.
//!
//! ```text
//! sim_type = "Vector";
//! L = 2.0e-3;               # global, captured by later elements
//! d1: drift;                # L = 2.0e-3
//! q1: quadrupole, L = 0.1, K = 2.5;
//! cell: LINE = (d1, q1, d1);
//! ring: LINE = (4*cell);
//! USE: ring;
//! ```

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod print;

use bf_lattice::Params;

use crate::error::ConfigResult;
use crate::model::MachineConfig;

pub use print::to_glps;

/// Parse and evaluate GLPS `source`, with `extra` pre-seeding the globals.
pub fn parse_glps(source: &str, extra: &Params) -> ConfigResult<MachineConfig> {
    eval::evaluate(parser::parse(source)?, extra)
}
