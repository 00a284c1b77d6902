//! # Evaluated Expression Forms
//!
//! The transform pipeline and terminal reducers evaluate expressions against
//! documents. Parsing and AST construction belong to the query layer; this
//! module holds only the evaluated forms handed down to the storage layer:
//!
//! - [`Term`] — a pure expression tree over documents
//! - [`Mapping`] — a one-argument function (`arg` bound to a document)
//! - [`Reduction`] — a two-argument fold step with a base expression
//! - [`Scope`] — the frame stack variables are bound in
//!
//! Evaluation is pure; binding pushes a frame for the duration of the body
//! and pops it on every exit path.

use eyre::{bail, Result};
use hashbrown::HashMap;
use serde_json::Value;

use super::Document;

/// A pure expression over documents.
#[derive(Clone, Debug)]
pub enum Term {
    Const(Document),
    Var(String),
    /// Attribute lookup on an object-valued subexpression.
    Attr(Box<Term>, String),
    Cmp(CmpOp, Box<Term>, Box<Term>),
    /// Numeric addition, string concatenation, or array concatenation.
    Add(Box<Term>, Box<Term>),
    MakeArray(Vec<Term>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Term {
    pub fn constant(value: Value) -> Term {
        Term::Const(Document::new(value))
    }

    pub fn var(name: impl Into<String>) -> Term {
        Term::Var(name.into())
    }

    pub fn attr(base: Term, name: impl Into<String>) -> Term {
        Term::Attr(Box::new(base), name.into())
    }

    pub fn cmp(op: CmpOp, lhs: Term, rhs: Term) -> Term {
        Term::Cmp(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn add(lhs: Term, rhs: Term) -> Term {
        Term::Add(Box::new(lhs), Box::new(rhs))
    }
}

/// A one-argument expression: the document under evaluation is bound to
/// `arg` while `body` runs.
#[derive(Clone, Debug)]
pub struct Mapping {
    pub arg: String,
    pub body: Term,
}

impl Mapping {
    pub fn new(arg: impl Into<String>, body: Term) -> Self {
        Self {
            arg: arg.into(),
            body,
        }
    }

    pub fn apply(&self, scope: &mut Scope, doc: &Document) -> Result<Document> {
        scope.push();
        scope.put(&self.arg, doc.clone());
        let result = eval(&self.body, scope);
        scope.pop();
        result
    }
}

/// A two-argument fold step. `base` supplies the accumulator for groups seen
/// for the first time; `body` runs with `var1` bound to the accumulator and
/// `var2` to the incoming value.
#[derive(Clone, Debug)]
pub struct Reduction {
    pub base: Term,
    pub var1: String,
    pub var2: String,
    pub body: Term,
}

impl Reduction {
    pub fn new(
        base: Term,
        var1: impl Into<String>,
        var2: impl Into<String>,
        body: Term,
    ) -> Self {
        Self {
            base,
            var1: var1.into(),
            var2: var2.into(),
            body,
        }
    }

    pub fn apply(&self, scope: &mut Scope, acc: Document, value: Document) -> Result<Document> {
        scope.push();
        scope.put(&self.var1, acc);
        scope.put(&self.var2, value);
        let result = eval(&self.body, scope);
        scope.pop();
        result
    }
}

/// A stack of binding frames. Lookup searches innermost-first.
#[derive(Debug, Default)]
pub struct Scope {
    frames: Vec<HashMap<String, Document>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn put(&mut self, name: &str, value: Document) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_owned(), value);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Document> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}

/// Evaluates a term against the current scope.
pub fn eval(term: &Term, scope: &Scope) -> Result<Document> {
    match term {
        Term::Const(doc) => Ok(doc.clone()),
        Term::Var(name) => match scope.lookup(name) {
            Some(doc) => Ok(doc.clone()),
            None => bail!("unbound variable `{name}`"),
        },
        Term::Attr(base, name) => {
            let base = eval(base, scope)?;
            match base.attr(name) {
                Some(value) => Ok(Document::new(value.clone())),
                None => Ok(Document::null()),
            }
        }
        Term::Cmp(op, lhs, rhs) => {
            let lhs = eval(lhs, scope)?;
            let rhs = eval(rhs, scope)?;
            Ok(Document::new(Value::Bool(compare(
                *op,
                lhs.value(),
                rhs.value(),
            )?)))
        }
        Term::Add(lhs, rhs) => {
            let lhs = eval(lhs, scope)?;
            let rhs = eval(rhs, scope)?;
            add(lhs.value(), rhs.value())
        }
        Term::MakeArray(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval(item, scope)?.value().clone());
            }
            Ok(Document::new(Value::Array(out)))
        }
    }
}

fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> Result<bool> {
    match op {
        CmpOp::Eq => return Ok(lhs == rhs),
        CmpOp::Ne => return Ok(lhs != rhs),
        _ => {}
    }
    let ordering = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (as_f64(a)?, as_f64(b)?);
            match a.partial_cmp(&b) {
                Some(ord) => ord,
                None => bail!("cannot order {a} against {b}"),
            }
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => bail!("cannot order {lhs} against {rhs}"),
    };
    Ok(match op {
        CmpOp::Lt => ordering.is_lt(),
        CmpOp::Le => ordering.is_le(),
        CmpOp::Gt => ordering.is_gt(),
        CmpOp::Ge => ordering.is_ge(),
        CmpOp::Eq | CmpOp::Ne => unreachable!("handled above"),
    })
}

fn add(lhs: &Value, rhs: &Value) -> Result<Document> {
    let value = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            // Overflowing integer sums degrade to double arithmetic rather
            // than faulting.
            (Some(a), Some(b)) => match a.checked_add(b) {
                Some(sum) => Value::from(sum),
                None => Value::from(a as f64 + b as f64),
            },
            _ => Value::from(as_f64(a)? + as_f64(b)?),
        },
        (Value::String(a), Value::String(b)) => Value::String(format!("{a}{b}")),
        (Value::Array(a), Value::Array(b)) => {
            Value::Array(a.iter().chain(b.iter()).cloned().collect())
        }
        _ => bail!("cannot add {lhs} and {rhs}"),
    };
    Ok(Document::new(value))
}

fn as_f64(n: &serde_json::Number) -> Result<f64> {
    match n.as_f64() {
        Some(f) => Ok(f),
        None => bail!("number {n} is not representable as f64"),
    }
}
