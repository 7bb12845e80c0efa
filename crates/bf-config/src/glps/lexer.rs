//! Tokenizer for the GLPS lattice language.

use crate::error::{ConfigError, ConfigResult, Pos};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    Eq,
    Colon,
    Comma,
    Semi,
    Star,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => format!("identifier '{}'", s),
            TokenKind::Number(v) => format!("number {}", v),
            TokenKind::Str(s) => format!("string \"{}\"", s),
            TokenKind::Eq => "'='".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Semi => "';'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    col: usize,
}

impl Cursor<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            col: self.col,
        }
    }

    fn take_while(&mut self, out: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Split `source` into tokens; `#` comments and whitespace are dropped.
pub fn tokenize(source: &str) -> ConfigResult<Vec<Token>> {
    let mut cur = Cursor {
        chars: source.chars().peekable(),
        line: 1,
        col: 1,
    };
    let mut tokens = Vec::new();

    while let Some(c) = cur.peek() {
        let pos = cur.pos();

        if c.is_whitespace() {
            cur.bump();
            continue;
        }
        if c == '#' {
            while let Some(c) = cur.bump() {
                if c == '\n' {
                    break;
                }
            }
            continue;
        }

        let kind = match c {
            '=' => single(&mut cur, TokenKind::Eq),
            ':' => single(&mut cur, TokenKind::Colon),
            ',' => single(&mut cur, TokenKind::Comma),
            ';' => single(&mut cur, TokenKind::Semi),
            '*' => single(&mut cur, TokenKind::Star),
            '(' => single(&mut cur, TokenKind::LParen),
            ')' => single(&mut cur, TokenKind::RParen),
            '[' => single(&mut cur, TokenKind::LBracket),
            ']' => single(&mut cur, TokenKind::RBracket),
            '"' => {
                cur.bump();
                let mut text = String::new();
                cur.take_while(&mut text, |c| c != '"' && c != '\n');
                if cur.bump() != Some('"') {
                    return Err(ConfigError::Syntax {
                        pos,
                        message: "unterminated string".to_string(),
                    });
                }
                TokenKind::Str(text)
            }
            c if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' => {
                TokenKind::Number(lex_number(&mut cur, pos)?)
            }
            c if is_ident_start(c) => {
                let mut ident = String::new();
                cur.take_while(&mut ident, is_ident_char);
                TokenKind::Ident(ident)
            }
            other => {
                return Err(ConfigError::Syntax {
                    pos,
                    message: format!("unexpected character '{}'", other),
                });
            }
        };
        tokens.push(Token { kind, pos });
    }

    Ok(tokens)
}

fn single(cur: &mut Cursor<'_>, kind: TokenKind) -> TokenKind {
    cur.bump();
    kind
}

fn lex_number(cur: &mut Cursor<'_>, pos: Pos) -> ConfigResult<f64> {
    let mut text = String::new();
    if let Some(sign @ ('-' | '+')) = cur.peek() {
        text.push(sign);
        cur.bump();
    }
    cur.take_while(&mut text, |c| c.is_ascii_digit() || c == '.');
    if let Some(e @ ('e' | 'E')) = cur.peek() {
        text.push(e);
        cur.bump();
        if let Some(sign @ ('-' | '+')) = cur.peek() {
            text.push(sign);
            cur.bump();
        }
        cur.take_while(&mut text, |c| c.is_ascii_digit());
    }
    text.parse::<f64>().map_err(|_| ConfigError::Syntax {
        pos,
        message: format!("malformed number '{}'", text),
    })
}
