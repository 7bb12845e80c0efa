//! Recursive-descent parser for GLPS statements.

use crate::error::{ConfigError, ConfigResult, Pos};
use crate::glps::ast::{Expr, LineItem, Stmt};
use crate::glps::lexer::{Token, TokenKind, tokenize};

const LINE_KEYWORD: &str = "LINE";
const USE_KEYWORD: &str = "USE";

/// Parse GLPS source into statements.
pub fn parse(source: &str) -> ConfigResult<Vec<Stmt>> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, at: 0 };
    let mut stmts = Vec::new();
    while !parser.at_end() {
        stmts.push(parser.statement()?);
    }
    Ok(stmts)
}

struct Parser {
    tokens: Vec<Token>,
    at: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.at >= self.tokens.len()
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.at).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.at + offset).map(|t| &t.kind)
    }

    /// Position of the next token, or just past the last one.
    fn pos(&self) -> Pos {
        match self.tokens.get(self.at) {
            Some(t) => t.pos,
            None => self
                .tokens
                .last()
                .map(|t| Pos {
                    line: t.pos.line,
                    col: t.pos.col + 1,
                })
                .unwrap_or(Pos { line: 1, col: 1 }),
        }
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.at).cloned();
        if t.is_some() {
            self.at += 1;
        }
        t
    }

    fn error<T>(&self, message: impl Into<String>) -> ConfigResult<T> {
        Err(ConfigError::Syntax {
            pos: self.pos(),
            message: message.into(),
        })
    }

    fn unexpected<T>(&self, expected: &str) -> ConfigResult<T> {
        match self.peek() {
            Some(found) => self.error(format!("expected {}, found {}", expected, found.describe())),
            None => self.error(format!("expected {}, found end of input", expected)),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ConfigResult<()> {
        if self.peek() == Some(&kind) {
            self.at += 1;
            Ok(())
        } else {
            self.unexpected(expected)
        }
    }

    fn ident(&mut self, expected: &str) -> ConfigResult<(String, Pos)> {
        match self.peek() {
            Some(TokenKind::Ident(_)) => match self.next() {
                Some(Token {
                    kind: TokenKind::Ident(name),
                    pos,
                }) => Ok((name, pos)),
                _ => self.unexpected(expected),
            },
            _ => self.unexpected(expected),
        }
    }

    fn statement(&mut self) -> ConfigResult<Stmt> {
        let (name, pos) = self.ident("a statement")?;
        match self.peek() {
            Some(TokenKind::Eq) => {
                self.at += 1;
                let value = self.expr()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(Stmt::Assign { name, value, pos })
            }
            Some(TokenKind::Colon) => {
                self.at += 1;
                if name == USE_KEYWORD {
                    let (line, _) = self.ident("a LINE name")?;
                    self.expect(TokenKind::Semi, "';'")?;
                    return Ok(Stmt::Use { name: line, pos });
                }
                let is_line = matches!(self.peek(), Some(TokenKind::Ident(k)) if k == LINE_KEYWORD)
                    && self.peek_at(1) == Some(&TokenKind::Eq);
                if is_line {
                    self.at += 2;
                    let items = self.line_items()?;
                    self.expect(TokenKind::Semi, "';'")?;
                    Ok(Stmt::Line { name, items, pos })
                } else {
                    let (kind, _) = self.ident("an element type")?;
                    let props = self.props()?;
                    Ok(Stmt::Element {
                        name,
                        kind,
                        props,
                        pos,
                    })
                }
            }
            _ => self.unexpected("'=' or ':'"),
        }
    }

    /// `(, key = expr)* ;`
    fn props(&mut self) -> ConfigResult<Vec<(String, Expr)>> {
        let mut props = Vec::new();
        loop {
            match self.peek() {
                Some(TokenKind::Semi) => {
                    self.at += 1;
                    return Ok(props);
                }
                Some(TokenKind::Comma) => {
                    self.at += 1;
                    let (key, _) = self.ident("a parameter name")?;
                    self.expect(TokenKind::Eq, "'='")?;
                    props.push((key, self.expr()?));
                }
                _ => return self.unexpected("',' or ';'"),
            }
        }
    }

    fn expr(&mut self) -> ConfigResult<Expr> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Number(v),
                ..
            }) => Ok(Expr::Number(v)),
            Some(Token {
                kind: TokenKind::Str(s),
                ..
            }) => Ok(Expr::Text(s)),
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(Expr::Var(name)),
            Some(Token {
                kind: TokenKind::LBracket,
                ..
            }) => self.array(),
            Some(_) => {
                self.at -= 1;
                self.unexpected("a value")
            }
            None => self.unexpected("a value"),
        }
    }

    /// After `[`: `number (, number)* ]` or `]`.
    fn array(&mut self) -> ConfigResult<Expr> {
        let mut values = Vec::new();
        if self.peek() == Some(&TokenKind::RBracket) {
            self.at += 1;
            return Ok(Expr::Array(values));
        }
        loop {
            match self.next() {
                Some(Token {
                    kind: TokenKind::Number(v),
                    ..
                }) => values.push(v),
                Some(_) => {
                    self.at -= 1;
                    return self.unexpected("a number");
                }
                None => return self.unexpected("a number"),
            }
            match self.peek() {
                Some(TokenKind::Comma) => self.at += 1,
                Some(TokenKind::RBracket) => {
                    self.at += 1;
                    return Ok(Expr::Array(values));
                }
                _ => return self.unexpected("',' or ']'"),
            }
        }
    }

    /// `( item (, item)* )`
    fn line_items(&mut self) -> ConfigResult<Vec<LineItem>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut items = Vec::new();
        if self.peek() == Some(&TokenKind::RParen) {
            self.at += 1;
            return Ok(items);
        }
        loop {
            items.push(self.line_item()?);
            match self.peek() {
                Some(TokenKind::Comma) => self.at += 1,
                Some(TokenKind::RParen) => {
                    self.at += 1;
                    return Ok(items);
                }
                _ => return self.unexpected("',' or ')'"),
            }
        }
    }

    /// `name`, `name*n`, or `n*name`.
    fn line_item(&mut self) -> ConfigResult<LineItem> {
        let pos = self.pos();
        if let Some(TokenKind::Number(n)) = self.peek() {
            let n = *n;
            self.at += 1;
            let count = self.repeat_count(n, pos)?;
            self.expect(TokenKind::Star, "'*'")?;
            let (name, _) = self.ident("an element or LINE name")?;
            return Ok(LineItem { name, count, pos });
        }

        let (name, pos) = self.ident("an element or LINE name")?;
        let mut count = 1;
        if self.peek() == Some(&TokenKind::Star) {
            self.at += 1;
            let n_pos = self.pos();
            match self.next() {
                Some(Token {
                    kind: TokenKind::Number(n),
                    ..
                }) => count = self.repeat_count(n, n_pos)?,
                _ => {
                    self.at -= 1;
                    return self.unexpected("a repeat count");
                }
            }
        }
        Ok(LineItem { name, count, pos })
    }

    fn repeat_count(&self, n: f64, pos: Pos) -> ConfigResult<usize> {
        if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
            Ok(n as usize)
        } else {
            Err(ConfigError::Syntax {
                pos,
                message: format!("repeat count must be a non-negative integer, got {}", n),
            })
        }
    }
}
