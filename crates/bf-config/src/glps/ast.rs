//! Parsed GLPS statements.

use crate::error::Pos;

/// Right-hand side of an assignment or element property.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Array(Vec<f64>),
    /// Reference to a previously assigned variable.
    Var(String),
}

/// One entry of a LINE: a name repeated `count` times.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub count: usize,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `name = expr;`
    Assign { name: String, value: Expr, pos: Pos },
    /// `name: kind, key = expr, ...;`
    Element {
        name: String,
        kind: String,
        props: Vec<(String, Expr)>,
        pos: Pos,
    },
    /// `name: LINE = (item, ...);`
    Line {
        name: String,
        items: Vec<LineItem>,
        pos: Pos,
    },
    /// `USE: name;`
    Use { name: String, pos: Pos },
}
