//! Path-query evaluation over a catalog store
//!
//! The root of every query is the whole store: `.people` selects the
//! records of catalog `people`. Node sets stay flat: selecting a key whose
//! value is an array yields the array's elements, and selecting a key on an
//! array maps over its elements.
//!
//! Comparisons are existential: `.tags === "x"` holds for a node if any of
//! its selected tags equals `"x"`.

use std::borrow::Cow;
use std::cmp::Ordering;

use catalogdb_core::{Map, Record, Value};
use catalogdb_storage::CatalogStore;

use crate::error::QueryError;
use crate::parser::{parse_with_depth, Expr, Path, Selector, Step, DEFAULT_MAX_DEPTH};
use crate::token::CmpOp;

/// Evaluates a path expression against the catalog store
pub trait PathEvaluator: Send + Sync {
    /// Run `expression` with `root` as the document root
    fn evaluate(&self, expression: &str, root: &CatalogStore) -> Result<Vec<Value>, QueryError>;
}

/// Built-in evaluator for the JSPath subset described in [`crate::parser`]
#[derive(Debug, Clone)]
pub struct JsPathEvaluator {
    max_depth: usize,
}

impl Default for JsPathEvaluator {
    fn default() -> Self {
        JsPathEvaluator {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl JsPathEvaluator {
    /// Create an evaluator with the default depth limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator that rejects deeper nesting
    pub fn with_max_depth(max_depth: usize) -> Self {
        JsPathEvaluator { max_depth }
    }
}

impl PathEvaluator for JsPathEvaluator {
    fn evaluate(&self, expression: &str, root: &CatalogStore) -> Result<Vec<Value>, QueryError> {
        let path = parse_with_depth(expression, self.max_depth)?;
        Ok(apply(&path, root))
    }
}

/// Evaluate a parsed path, cloning the matched values
pub fn apply(path: &Path, root: &CatalogStore) -> Vec<Value> {
    select(path, vec![Node::Store(root)])
        .into_iter()
        .map(|n| n.to_value().into_owned())
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Node<'a> {
    Store(&'a CatalogStore),
    Record(&'a Record),
    Value(&'a Value),
}

impl<'a> Node<'a> {
    fn fields(self) -> Option<&'a Map> {
        match self {
            Node::Record(r) => Some(r.fields()),
            Node::Value(Value::Object(m)) => Some(m),
            _ => None,
        }
    }

    fn is_truthy(self) -> bool {
        match self {
            Node::Value(v) => v.is_truthy(),
            Node::Store(_) | Node::Record(_) => true,
        }
    }

    fn to_value(self) -> Cow<'a, Value> {
        match self {
            Node::Value(v) => Cow::Borrowed(v),
            Node::Record(r) => Cow::Owned(r.clone().into_value()),
            Node::Store(s) => Cow::Owned(Value::Object(
                s.iter()
                    .map(|(name, c)| {
                        let records = c.records().iter().cloned().map(Value::from).collect();
                        (name.to_string(), Value::Array(records))
                    })
                    .collect(),
            )),
        }
    }
}

/// Push `v`, or its elements if it is an array
fn push_flat<'a>(v: &'a Value, out: &mut Vec<Node<'a>>) {
    match v {
        Value::Array(items) => out.extend(items.iter().map(Node::Value)),
        other => out.push(Node::Value(other)),
    }
}

fn select_key<'a>(node: Node<'a>, key: &str, out: &mut Vec<Node<'a>>) {
    match node {
        Node::Store(s) => {
            if let Some(records) = s.get_catalog(key) {
                out.extend(records.iter().map(Node::Record));
            }
        }
        Node::Value(Value::Array(items)) => {
            for item in items {
                select_key(Node::Value(item), key, out);
            }
        }
        _ => {
            if let Some(v) = node.fields().and_then(|f| f.get(key)) {
                push_flat(v, out);
            }
        }
    }
}

fn select_any<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    match node {
        Node::Store(s) => {
            for (_, catalog) in s.iter() {
                out.extend(catalog.records().iter().map(Node::Record));
            }
        }
        Node::Value(Value::Array(items)) => out.extend(items.iter().map(Node::Value)),
        _ => {
            if let Some(fields) = node.fields() {
                for v in fields.values() {
                    push_flat(v, out);
                }
            }
        }
    }
}

/// Children without array flattening, for recursive descent
fn raw_children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    match node {
        Node::Store(s) => s
            .iter()
            .flat_map(|(_, c)| c.records().iter().map(Node::Record))
            .collect(),
        Node::Value(Value::Array(items)) => items.iter().map(Node::Value).collect(),
        _ => node
            .fields()
            .map(|f| f.values().map(Node::Value).collect())
            .unwrap_or_default(),
    }
}

fn descend<'a>(node: Node<'a>, selector: &Selector, out: &mut Vec<Node<'a>>) {
    if !matches!(node, Node::Value(Value::Array(_))) {
        match selector {
            Selector::Key(k) => select_key(node, k, out),
            Selector::Any => select_any(node, out),
        }
    }
    for child in raw_children(node) {
        descend(child, selector, out);
    }
}

/// Resolve a possibly negative position against `len`
fn resolve(i: i64, len: usize) -> Option<usize> {
    if i < 0 {
        let back = usize::try_from(i.unsigned_abs()).ok()?;
        len.checked_sub(back)
    } else {
        usize::try_from(i).ok().filter(|&i| i < len)
    }
}

fn clamp(i: i64, len: usize) -> usize {
    if i < 0 {
        let back = usize::try_from(i.unsigned_abs()).unwrap_or(usize::MAX);
        len.saturating_sub(back)
    } else {
        usize::try_from(i).unwrap_or(usize::MAX).min(len)
    }
}

fn select<'a>(path: &'a Path, mut nodes: Vec<Node<'a>>) -> Vec<Node<'a>> {
    for step in &path.steps {
        nodes = match step {
            Step::Child(Selector::Key(k)) => {
                let mut out = Vec::new();
                for n in nodes {
                    select_key(n, k, &mut out);
                }
                out
            }
            Step::Child(Selector::Any) => {
                let mut out = Vec::new();
                for n in nodes {
                    select_any(n, &mut out);
                }
                out
            }
            Step::Descendant(sel) => {
                let mut out = Vec::new();
                for n in nodes {
                    descend(n, sel, &mut out);
                }
                out
            }
            Step::Filter(expr) => nodes.into_iter().filter(|n| test(expr, *n)).collect(),
            Step::Index(i) => resolve(*i, nodes.len())
                .map(|idx| vec![nodes[idx]])
                .unwrap_or_default(),
            Step::Slice(start, end) => {
                let len = nodes.len();
                let from = start.map_or(0, |s| clamp(s, len));
                let to = end.map_or(len, |e| clamp(e, len));
                if from < to {
                    nodes[from..to].to_vec()
                } else {
                    Vec::new()
                }
            }
        };
    }
    nodes
}

/// Evaluate a predicate for one node
fn test<'a>(expr: &'a Expr, ctx: Node<'a>) -> bool {
    match expr {
        Expr::Or(a, b) => test(a, ctx) || test(b, ctx),
        Expr::And(a, b) => test(a, ctx) && test(b, ctx),
        Expr::Not(e) => !test(e, ctx),
        Expr::Compare(lhs, op, rhs) => {
            let left = operand(lhs, ctx);
            let right = operand(rhs, ctx);
            left.iter()
                .any(|l| right.iter().any(|r| compare(l, *op, r)))
        }
        Expr::Path(p) => select(p, vec![ctx]).into_iter().any(Node::is_truthy),
        Expr::Literal(v) => v.is_truthy(),
    }
}

fn operand<'a>(expr: &'a Expr, ctx: Node<'a>) -> Vec<Cow<'a, Value>> {
    match expr {
        Expr::Path(p) => select(p, vec![ctx]).into_iter().map(Node::to_value).collect(),
        Expr::Literal(v) => vec![Cow::Borrowed(v)],
        other => vec![Cow::Owned(Value::Bool(test(other, ctx)))],
    }
}

fn compare(l: &Value, op: CmpOp, r: &Value) -> bool {
    match op {
        CmpOp::StrictEq => l == r,
        CmpOp::StrictNe => l != r,
        CmpOp::Eq => loose_eq(l, r),
        CmpOp::Ne => !loose_eq(l, r),
        CmpOp::Lt => l.partial_cmp_scalar(r) == Some(Ordering::Less),
        CmpOp::Le => matches!(
            l.partial_cmp_scalar(r),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CmpOp::Gt => l.partial_cmp_scalar(r) == Some(Ordering::Greater),
        CmpOp::Ge => matches!(
            l.partial_cmp_scalar(r),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CmpOp::StartsWith => text_match(l, r, false, |a, b| a.starts_with(b)),
        CmpOp::StartsWithCase => text_match(l, r, true, |a, b| a.starts_with(b)),
        CmpOp::EndsWith => text_match(l, r, false, |a, b| a.ends_with(b)),
        CmpOp::EndsWithCase => text_match(l, r, true, |a, b| a.ends_with(b)),
        CmpOp::Contains => text_match(l, r, false, |a, b| a.contains(b)),
        CmpOp::ContainsCase => text_match(l, r, true, |a, b| a.contains(b)),
    }
}

/// Equality with numeric-string and boolean coercion
fn loose_eq(l: &Value, r: &Value) -> bool {
    if l == r {
        return true;
    }
    match (numeric(l), numeric(r)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Int(_) | Value::Float(_) => v.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_match(l: &Value, r: &Value, case_sensitive: bool, f: fn(&str, &str) -> bool) -> bool {
    let (Some(a), Some(b)) = (l.as_str(), r.as_str()) else {
        return false;
    };
    if case_sensitive {
        f(a, b)
    } else {
        f(&a.to_lowercase(), &b.to_lowercase())
    }
}
