//! Path expression parser
//!
//! Grammar (a subset of JSPath):
//!
//! ```text
//! path     := step*                      (must start with '.' or '..' at top level)
//! step     := '.' key | '.' '*' | '.'    (bare dot: current node, for '.{...}')
//!           | '..' key | '..' '*'
//!           | '{' expr '}' | '[' expr ']'
//!           | '[' int ']' | '[' int? ':' int? ']'
//! key      := ident | string
//! expr     := and ('||' and)*
//! and      := unary ('&&' unary)*
//! unary    := '!' unary | compare
//! compare  := operand (cmp-op operand)?
//! operand  := literal | path | ident path-tail | '(' expr ')'
//! ```

use catalogdb_core::Value;

use crate::error::QueryError;
use crate::token::{tokenize, CmpOp, Token, TokenKind};

/// Default limit on expression nesting
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// A location path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    /// Steps applied left to right
    pub steps: Vec<Step>,
}

/// What a location step selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A named child
    Key(String),
    /// Every child
    Any,
}

/// One step of a path
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// `.key` or `.*`
    Child(Selector),
    /// `..key` or `..*`
    Descendant(Selector),
    /// `{expr}` or `[expr]`
    Filter(Expr),
    /// `[n]`, negative counts from the end
    Index(i64),
    /// `[a:b]`, half-open, negative bounds count from the end
    Slice(Option<i64>, Option<i64>),
}

/// Predicate expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `a || b`
    Or(Box<Expr>, Box<Expr>),
    /// `a && b`
    And(Box<Expr>, Box<Expr>),
    /// `!a`
    Not(Box<Expr>),
    /// `a op b`
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    /// Path relative to the node under test
    Path(Path),
    /// Constant
    Literal(Value),
}

/// Parse a top-level path with the default depth limit
pub fn parse(src: &str) -> Result<Path, QueryError> {
    parse_with_depth(src, DEFAULT_MAX_DEPTH)
}

/// Parse a top-level path, rejecting nesting deeper than `max_depth`
pub fn parse_with_depth(src: &str, max_depth: usize) -> Result<Path, QueryError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        max_depth,
    };

    match parser.peek() {
        Some(TokenKind::Dot) | Some(TokenKind::DotDot) => {}
        Some(_) => return Err(parser.unexpected()),
        None => return Err(QueryError::UnexpectedEnd("path")),
    }
    let path = parser.path()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected());
    }
    Ok(path)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn int_at(&self, n: usize) -> Option<i64> {
        match self.peek_at(n) {
            Some(TokenKind::Number(Value::Int(i))) => Some(*i),
            _ => None,
        }
    }

    fn unexpected(&self) -> QueryError {
        match self.tokens.get(self.pos) {
            Some(t) => QueryError::UnexpectedToken(t.span.start, t.kind.to_string()),
            None => QueryError::UnexpectedEnd("more input"),
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &'static str) -> Result<(), QueryError> {
        match self.peek() {
            Some(k) if *k == kind => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.unexpected()),
            None => Err(QueryError::UnexpectedEnd(what)),
        }
    }

    fn enter(&mut self) -> Result<(), QueryError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(QueryError::TooDeep(self.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn key(&mut self) -> Option<Selector> {
        let selector = match self.peek()? {
            TokenKind::Ident(k) | TokenKind::Str(k) => Selector::Key(k.clone()),
            TokenKind::Star => Selector::Any,
            _ => return None,
        };
        self.pos += 1;
        Some(selector)
    }

    fn path(&mut self) -> Result<Path, QueryError> {
        let mut steps = Vec::new();

        loop {
            match self.peek() {
                Some(TokenKind::Dot) => {
                    self.pos += 1;
                    if let Some(sel) = self.key() {
                        steps.push(Step::Child(sel));
                    }
                }
                Some(TokenKind::DotDot) => {
                    self.pos += 1;
                    match self.key() {
                        Some(sel) => steps.push(Step::Descendant(sel)),
                        None if self.peek().is_none() => {
                            return Err(QueryError::UnexpectedEnd("key after '..'"))
                        }
                        None => return Err(self.unexpected()),
                    }
                }
                Some(TokenKind::LBrace) => {
                    self.pos += 1;
                    self.enter()?;
                    let e = self.expr()?;
                    self.leave();
                    self.expect(TokenKind::RBrace, "'}'")?;
                    steps.push(Step::Filter(e));
                }
                Some(TokenKind::LBracket) => {
                    self.pos += 1;
                    self.enter()?;
                    let step = self.bracket()?;
                    self.leave();
                    self.expect(TokenKind::RBracket, "']'")?;
                    steps.push(step);
                }
                _ => break,
            }
        }

        Ok(Path { steps })
    }

    /// Contents of `[...]`: position, slice or predicate
    fn bracket(&mut self) -> Result<Step, QueryError> {
        match (self.peek(), self.peek_at(1)) {
            (Some(TokenKind::Colon), _) => {
                self.pos += 1;
                Ok(Step::Slice(None, self.slice_bound()))
            }
            (Some(TokenKind::Number(_)), Some(TokenKind::RBracket)) => {
                let Some(i) = self.int_at(0) else {
                    return Err(self.unexpected());
                };
                self.pos += 1;
                Ok(Step::Index(i))
            }
            (Some(TokenKind::Number(_)), Some(TokenKind::Colon)) => {
                let Some(start) = self.int_at(0) else {
                    return Err(self.unexpected());
                };
                self.pos += 2;
                let end = self.slice_bound();
                Ok(Step::Slice(Some(start), end))
            }
            _ => self.expr().map(Step::Filter),
        }
    }

    fn slice_bound(&mut self) -> Option<i64> {
        let bound = self.int_at(0)?;
        self.pos += 1;
        Some(bound)
    }

    fn expr(&mut self) -> Result<Expr, QueryError> {
        let mut lhs = self.and()?;
        while self.peek() == Some(&TokenKind::Or) {
            self.pos += 1;
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, QueryError> {
        let mut lhs = self.unary()?;
        while self.peek() == Some(&TokenKind::And) {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, QueryError> {
        if self.peek() == Some(&TokenKind::Not) {
            self.pos += 1;
            self.enter()?;
            let inner = self.unary()?;
            self.leave();
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.compare()
    }

    fn compare(&mut self) -> Result<Expr, QueryError> {
        let lhs = self.operand()?;
        if let Some(TokenKind::Cmp(op)) = self.peek() {
            self.pos += 1;
            let rhs = self.operand()?;
            return Ok(Expr::Compare(Box::new(lhs), *op, Box::new(rhs)));
        }
        Ok(lhs)
    }

    fn operand(&mut self) -> Result<Expr, QueryError> {
        let Some(kind) = self.peek() else {
            return Err(QueryError::UnexpectedEnd("operand"));
        };

        match kind {
            TokenKind::Str(s) => {
                self.pos += 1;
                Ok(Expr::Literal(Value::String(s.clone())))
            }
            TokenKind::Number(n) => {
                self.pos += 1;
                Ok(Expr::Literal(n.clone()))
            }
            TokenKind::Ident(word) => {
                self.pos += 1;
                match word.as_str() {
                    "true" => Ok(Expr::Literal(Value::Bool(true))),
                    "false" => Ok(Expr::Literal(Value::Bool(false))),
                    "null" => Ok(Expr::Literal(Value::Null)),
                    _ => {
                        let mut path = self.path()?;
                        path.steps
                            .insert(0, Step::Child(Selector::Key(word.clone())));
                        Ok(Expr::Path(path))
                    }
                }
            }
            TokenKind::Dot | TokenKind::DotDot => self.path().map(Expr::Path),
            TokenKind::LParen => {
                self.pos += 1;
                self.enter()?;
                let e = self.expr()?;
                self.leave();
                self.expect(TokenKind::RParen, "')'")?;
                Ok(e)
            }
            _ => Err(self.unexpected()),
        }
    }
}
