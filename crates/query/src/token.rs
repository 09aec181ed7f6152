//! Tokenizer for filter and path expressions
//!
//! Every token carries the byte span it was read from, so callers can
//! rewrite individual tokens in the original text.

use std::fmt;

use catalogdb_core::Value;

use crate::error::QueryError;

/// Byte range of a token in its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First byte
    pub start: usize,
    /// One past the last byte
    pub end: usize,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `===`
    StrictEq,
    /// `==`
    Eq,
    /// `!==`
    StrictNe,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `^=` case-insensitive prefix
    StartsWith,
    /// `^==` case-sensitive prefix
    StartsWithCase,
    /// `$=` case-insensitive suffix
    EndsWith,
    /// `$==` case-sensitive suffix
    EndsWithCase,
    /// `*=` case-insensitive substring
    Contains,
    /// `*==` case-sensitive substring
    ContainsCase,
}

impl CmpOp {
    /// Operator text
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::StrictEq => "===",
            CmpOp::Eq => "==",
            CmpOp::StrictNe => "!==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::StartsWith => "^=",
            CmpOp::StartsWithCase => "^==",
            CmpOp::EndsWith => "$=",
            CmpOp::EndsWithCase => "$==",
            CmpOp::Contains => "*=",
            CmpOp::ContainsCase => "*==",
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `*`
    Star,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `:`
    Colon,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,
    /// Comparison operator
    Cmp(CmpOp),
    /// Bare word
    Ident(String),
    /// Quoted string, escapes resolved
    Str(String),
    /// Number literal (`Int` or `Float`)
    Number(Value),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Dot => f.write_str("."),
            TokenKind::DotDot => f.write_str(".."),
            TokenKind::Star => f.write_str("*"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::And => f.write_str("&&"),
            TokenKind::Or => f.write_str("||"),
            TokenKind::Not => f.write_str("!"),
            TokenKind::Cmp(op) => f.write_str(op.as_str()),
            TokenKind::Ident(s) => f.write_str(s),
            TokenKind::Str(s) => write!(f, "{:?}", s),
            TokenKind::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A token and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was read
    pub kind: TokenKind,
    /// Where it was read
    pub span: Span,
}

/// Split `src` into tokens
pub fn tokenize(src: &str) -> Result<Vec<Token>, QueryError> {
    Lexer::new(src).run()
}

/// Whether `c` may start a bare word
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Whether `c` may continue a bare word
pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

struct Lexer<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    i: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            chars: src.char_indices().collect(),
            i: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.i + n).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.i).map_or(self.src.len(), |&(p, _)| p)
    }

    /// Consume `s` if the input continues with it
    fn eat(&mut self, s: &str) -> bool {
        let matches = s
            .chars()
            .enumerate()
            .all(|(n, c)| self.peek_at(n) == Some(c));
        if matches {
            self.i += s.chars().count();
        }
        matches
    }

    fn run(mut self) -> Result<Vec<Token>, QueryError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.i += 1;
                continue;
            }

            let start = self.offset();
            let kind = match c {
                '.' => {
                    if self.eat("..") {
                        TokenKind::DotDot
                    } else {
                        self.i += 1;
                        TokenKind::Dot
                    }
                }
                '{' | '}' | '[' | ']' | '(' | ')' | ':' => {
                    self.i += 1;
                    match c {
                        '{' => TokenKind::LBrace,
                        '}' => TokenKind::RBrace,
                        '[' => TokenKind::LBracket,
                        ']' => TokenKind::RBracket,
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        _ => TokenKind::Colon,
                    }
                }
                '*' => {
                    if self.eat("*==") {
                        TokenKind::Cmp(CmpOp::ContainsCase)
                    } else if self.eat("*=") {
                        TokenKind::Cmp(CmpOp::Contains)
                    } else {
                        self.i += 1;
                        TokenKind::Star
                    }
                }
                '^' | '$' => {
                    let (case, plain) = if c == '^' {
                        (CmpOp::StartsWithCase, CmpOp::StartsWith)
                    } else {
                        (CmpOp::EndsWithCase, CmpOp::EndsWith)
                    };
                    self.i += 1;
                    if self.eat("==") {
                        TokenKind::Cmp(case)
                    } else if self.eat("=") {
                        TokenKind::Cmp(plain)
                    } else {
                        return Err(QueryError::UnexpectedChar(c, start));
                    }
                }
                '=' => {
                    if self.eat("===") {
                        TokenKind::Cmp(CmpOp::StrictEq)
                    } else if self.eat("==") {
                        TokenKind::Cmp(CmpOp::Eq)
                    } else {
                        return Err(QueryError::UnexpectedChar(c, start));
                    }
                }
                '!' => {
                    if self.eat("!==") {
                        TokenKind::Cmp(CmpOp::StrictNe)
                    } else if self.eat("!=") {
                        TokenKind::Cmp(CmpOp::Ne)
                    } else {
                        self.i += 1;
                        TokenKind::Not
                    }
                }
                '<' => {
                    if self.eat("<=") {
                        TokenKind::Cmp(CmpOp::Le)
                    } else {
                        self.i += 1;
                        TokenKind::Cmp(CmpOp::Lt)
                    }
                }
                '>' => {
                    if self.eat(">=") {
                        TokenKind::Cmp(CmpOp::Ge)
                    } else {
                        self.i += 1;
                        TokenKind::Cmp(CmpOp::Gt)
                    }
                }
                '&' => {
                    if !self.eat("&&") {
                        return Err(QueryError::UnexpectedChar(c, start));
                    }
                    TokenKind::And
                }
                '|' => {
                    if !self.eat("||") {
                        return Err(QueryError::UnexpectedChar(c, start));
                    }
                    TokenKind::Or
                }
                '"' | '\'' => self.string(c)?,
                '-' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.number()?,
                c if c.is_ascii_digit() => self.number()?,
                c if is_ident_start(c) => self.ident(),
                other => return Err(QueryError::UnexpectedChar(other, start)),
            };

            tokens.push(Token {
                kind,
                span: Span {
                    start,
                    end: self.offset(),
                },
            });
        }

        Ok(tokens)
    }

    fn ident(&mut self) -> TokenKind {
        let start = self.offset();
        while self.peek().is_some_and(is_ident_continue) {
            self.i += 1;
        }
        TokenKind::Ident(self.src[start..self.offset()].to_string())
    }

    fn number(&mut self) -> Result<TokenKind, QueryError> {
        let start = self.offset();
        let mut is_float = false;

        if self.peek() == Some('-') {
            self.i += 1;
        }
        self.digits();
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
            is_float = true;
            self.i += 1;
            self.digits();
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+') | Some('-')));
            if self.peek_at(1 + sign).is_some_and(|d| d.is_ascii_digit()) {
                is_float = true;
                self.i += 1 + sign;
                self.digits();
            }
        }

        let text = &self.src[start..self.offset()];
        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(TokenKind::Number(Value::Int(n)));
            }
        }
        text.parse::<f64>()
            .map(|f| TokenKind::Number(Value::Float(f)))
            .map_err(|_| QueryError::InvalidNumber(start, text.to_string()))
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|d| d.is_ascii_digit()) {
            self.i += 1;
        }
    }

    fn string(&mut self, quote: char) -> Result<TokenKind, QueryError> {
        let start = self.offset();
        self.i += 1;
        let mut out = String::new();

        loop {
            let Some(c) = self.peek() else {
                return Err(QueryError::UnterminatedString(start));
            };
            self.i += 1;
            if c == quote {
                return Ok(TokenKind::Str(out));
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let escape_at = self.offset();
            let Some(e) = self.peek() else {
                return Err(QueryError::UnterminatedString(start));
            };
            self.i += 1;
            match e {
                '"' | '\'' | '\\' | '/' => out.push(e),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'u' => {
                    let hex: String = (0..4).filter_map(|n| self.peek_at(n)).collect();
                    let code = (hex.len() == 4)
                        .then(|| u32::from_str_radix(&hex, 16).ok())
                        .flatten()
                        .and_then(char::from_u32)
                        .ok_or(QueryError::InvalidEscape(escape_at))?;
                    self.i += 4;
                    out.push(code);
                }
                _ => return Err(QueryError::InvalidEscape(escape_at)),
            }
        }
    }
}
